//! Brandscout client implementation.

use crate::error::{Result, SdkError};
use crate::types::{
    JobHandle, JobIdRequest, JobIndexRow, RegistryListRequest, RegistryRecentRequest,
    RegistrySearchRequest, ResultsSnapshot, ResumeRequest, SearchArtifact, StartRequest,
    StatusSnapshot, StreamSnapshot,
};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use std::time::Duration;

/// brandscout daemon client.
///
/// Provides a high-level interface to interact with the brandscout daemon's JSON-RPC surface.
///
/// # Example
///
/// ```no_run
/// use brandscout_sdk::BrandscoutClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = BrandscoutClient::connect("http://127.0.0.1:8177").await?;
/// # Ok(())
/// # }
/// ```
pub struct BrandscoutClient {
    client: HttpClient,
}

impl BrandscoutClient {
    /// Connect to a brandscout daemon.
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:8177`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .build(url)
            .map_err(|e| SdkError::Connection(format!("failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    /// Start a search under a caller-supplied job id (`search.start`).
    pub async fn start(&self, request: StartRequest) -> Result<JobHandle> {
        let params = rpc_params![request];
        let response: JobHandle = self.client.request("search.start", params).await?;
        Ok(response)
    }

    /// Start a search and let the daemon allocate the job id (`registry.search`).
    pub async fn registry_search(&self, request: RegistrySearchRequest) -> Result<JobHandle> {
        let params = rpc_params![request];
        let response: JobHandle = self.client.request("registry.search", params).await?;
        Ok(response)
    }

    /// Fetch status counters for a job (`search.status`).
    pub async fn status(&self, job_id: impl Into<String>) -> Result<StatusSnapshot> {
        let request = JobIdRequest { job_id: job_id.into() };
        let params = rpc_params![request];
        let response: StatusSnapshot = self.client.request("search.status", params).await?;
        Ok(response)
    }

    /// Fetch ranked results for a job (`search.results`).
    pub async fn results(&self, job_id: impl Into<String>) -> Result<ResultsSnapshot> {
        let request = JobIdRequest { job_id: job_id.into() };
        let params = rpc_params![request];
        let response: ResultsSnapshot = self.client.request("search.results", params).await?;
        Ok(response)
    }

    /// Fetch the latest follow-up quiz artifact for a job (`search.followup`).
    pub async fn followup(&self, job_id: impl Into<String>) -> Result<SearchArtifact> {
        let request = JobIdRequest { job_id: job_id.into() };
        let params = rpc_params![request];
        let response: SearchArtifact = self.client.request("search.followup", params).await?;
        Ok(response)
    }

    /// Resume a job out of `needs_followup` (`search.resume`).
    pub async fn resume(&self, request: ResumeRequest) -> Result<JobHandle> {
        let params = rpc_params![request];
        let response: JobHandle = self.client.request("search.resume", params).await?;
        Ok(response)
    }

    /// Cancel a job (`search.cancel`).
    pub async fn cancel(&self, job_id: impl Into<String>) -> Result<JobHandle> {
        let request = JobIdRequest { job_id: job_id.into() };
        let params = rpc_params![request];
        let response: JobHandle = self.client.request("search.cancel", params).await?;
        Ok(response)
    }

    /// Fetch a lightweight live-view snapshot of a job (`search.stream`).
    pub async fn stream(&self, job_id: impl Into<String>) -> Result<StreamSnapshot> {
        let request = JobIdRequest { job_id: job_id.into() };
        let params = rpc_params![request];
        let response: StreamSnapshot = self.client.request("search.stream", params).await?;
        Ok(response)
    }

    /// List jobs from the process-wide registry (`registry.list`).
    pub async fn registry_list(&self, request: RegistryListRequest) -> Result<Vec<JobIndexRow>> {
        let params = rpc_params![request];
        let response: Vec<JobIndexRow> = self.client.request("registry.list", params).await?;
        Ok(response)
    }

    /// The `limit` most recently created jobs (`registry.recent`).
    pub async fn registry_recent(&self, limit: i64) -> Result<Vec<JobIndexRow>> {
        let request = RegistryRecentRequest { limit };
        let params = rpc_params![request];
        let response: Vec<JobIndexRow> = self.client.request("registry.recent", params).await?;
        Ok(response)
    }
}
