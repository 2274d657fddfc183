//! RPC Method Handlers
//!
//! Implements the business logic for each JSON-RPC method.

use crate::error::to_rpc_error;
use crate::rate_limiter::RateLimiter;
use crate::types::{
    JobIdRequest, JobMutationResponse, RegistryBackfillRequest, RegistryBackfillResponse,
    RegistryListRequest, RegistryRecentRequest, RegistrySearchRequest, RegistrySearchResponse,
    ResumeRequest, StartRequest, StartResponse,
};
use brandscout_core::application::controller::{
    JobController, ResultsSnapshot, StatusSnapshot, StreamSnapshot,
};
use brandscout_core::domain::SearchArtifact;
use brandscout_core::port::{EmailNotifier, IdProvider, JobIndex, JobIndexRow, JobStoreOpener, TimeProvider};
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;

fn throttled() -> ErrorObjectOwned {
    jsonrpsee::types::error::ErrorObject::owned(
        4003, // THROTTLED
        "Rate limit exceeded. Please slow down.",
        None::<()>,
    )
}

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    job_store_opener: Arc<dyn JobStoreOpener>,
    job_index: Arc<dyn JobIndex>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    email: Arc<dyn EmailNotifier>,
    rate_limiter: Arc<RateLimiter>,
}

impl RpcHandler {
    pub fn new(
        job_store_opener: Arc<dyn JobStoreOpener>,
        job_index: Arc<dyn JobIndex>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        email: Arc<dyn EmailNotifier>,
    ) -> Self {
        // Default: 200 burst, 100 req/sec (configurable via env)
        let max_burst: u32 = std::env::var("BRANDSCOUT_RATE_LIMIT_BURST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(200);

        let rate_per_sec: u32 = std::env::var("BRANDSCOUT_RATE_LIMIT_RATE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(100);

        Self {
            job_store_opener,
            job_index,
            id_provider,
            time_provider,
            email,
            rate_limiter: Arc::new(RateLimiter::new(max_burst, rate_per_sec)),
        }
    }

    async fn controller_for(&self, job_id: &str) -> Result<JobController, ErrorObjectOwned> {
        let store = self
            .job_store_opener
            .open(&job_id.to_string())
            .await
            .map_err(to_rpc_error)?;
        Ok(JobController::new(
            store,
            self.time_provider.clone(),
            self.id_provider.clone(),
            self.email.clone(),
        ))
    }

    async fn sync_index(&self, job_id: &str) -> Result<(), ErrorObjectOwned> {
        let controller = self.controller_for(job_id).await?;
        let status = controller
            .status(&job_id.to_string())
            .await
            .map_err(to_rpc_error)?;
        let existing = self
            .job_index
            .find(&job_id.to_string())
            .await
            .map_err(to_rpc_error)?;

        let (client_id, business_name, created_at) = match existing {
            Some(row) => (row.client_id, row.business_name, row.created_at),
            None => (String::new(), String::new(), self.time_provider.now_millis()),
        };

        let row = JobIndexRow {
            job_id: job_id.to_string(),
            client_id,
            status: status.status,
            business_name,
            batch_num: status.batch_num,
            domains_checked: status.domains_checked,
            good_results: status.good_results,
            created_at,
            updated_at: self.time_provider.now_millis(),
        };
        self.job_index.upsert(&row).await.map_err(to_rpc_error)
    }

    /// search.start
    pub async fn start(&self, params: StartRequest) -> Result<StartResponse, ErrorObjectOwned> {
        if !self.rate_limiter.check().await {
            return Err(throttled());
        }

        let controller = self.controller_for(&params.job_id).await?;
        let job = controller
            .start(
                params.job_id.clone(),
                params.client_id.clone(),
                params.quiz_responses.clone(),
                params.driver_provider,
                params.swarm_provider,
            )
            .await
            .map_err(to_rpc_error)?;

        let now = self.time_provider.now_millis();
        let row = JobIndexRow {
            job_id: job.id.clone(),
            client_id: params.client_id,
            status: job.status,
            business_name: params.quiz_responses.business_name,
            batch_num: job.batch_num,
            domains_checked: 0,
            good_results: 0,
            created_at: now,
            updated_at: now,
        };
        self.job_index.upsert(&row).await.map_err(to_rpc_error)?;

        Ok(StartResponse {
            job_id: job.id,
            status: job.status,
        })
    }

    /// search.status
    pub async fn status(&self, params: JobIdRequest) -> Result<StatusSnapshot, ErrorObjectOwned> {
        if !self.rate_limiter.check().await {
            return Err(throttled());
        }
        let controller = self.controller_for(&params.job_id).await?;
        controller
            .status(&params.job_id)
            .await
            .map_err(to_rpc_error)
    }

    /// search.results
    pub async fn results(
        &self,
        params: JobIdRequest,
    ) -> Result<ResultsSnapshot, ErrorObjectOwned> {
        if !self.rate_limiter.check().await {
            return Err(throttled());
        }
        let controller = self.controller_for(&params.job_id).await?;
        controller
            .results(&params.job_id)
            .await
            .map_err(to_rpc_error)
    }

    /// search.followup
    pub async fn followup(
        &self,
        params: JobIdRequest,
    ) -> Result<SearchArtifact, ErrorObjectOwned> {
        if !self.rate_limiter.check().await {
            return Err(throttled());
        }
        let controller = self.controller_for(&params.job_id).await?;
        controller
            .followup(&params.job_id)
            .await
            .map_err(to_rpc_error)
    }

    /// search.resume
    pub async fn resume(
        &self,
        params: ResumeRequest,
    ) -> Result<JobMutationResponse, ErrorObjectOwned> {
        if !self.rate_limiter.check().await {
            return Err(throttled());
        }
        let controller = self.controller_for(&params.job_id).await?;
        let job = controller
            .resume(&params.job_id, params.followup_responses)
            .await
            .map_err(to_rpc_error)?;
        self.sync_index(&job.id).await?;
        Ok(JobMutationResponse {
            job_id: job.id,
            status: job.status,
        })
    }

    /// search.cancel
    pub async fn cancel(
        &self,
        params: JobIdRequest,
    ) -> Result<JobMutationResponse, ErrorObjectOwned> {
        if !self.rate_limiter.check().await {
            return Err(throttled());
        }
        let controller = self.controller_for(&params.job_id).await?;
        let job = controller.cancel(&params.job_id).await.map_err(to_rpc_error)?;
        self.sync_index(&job.id).await?;
        Ok(JobMutationResponse {
            job_id: job.id,
            status: job.status,
        })
    }

    /// search.stream
    pub async fn stream(&self, params: JobIdRequest) -> Result<StreamSnapshot, ErrorObjectOwned> {
        if !self.rate_limiter.check().await {
            return Err(throttled());
        }
        let controller = self.controller_for(&params.job_id).await?;
        controller
            .stream(&params.job_id)
            .await
            .map_err(to_rpc_error)
    }

    /// registry.search - allocate a job id, then start it
    pub async fn registry_search(
        &self,
        params: RegistrySearchRequest,
    ) -> Result<RegistrySearchResponse, ErrorObjectOwned> {
        if !self.rate_limiter.check().await {
            return Err(throttled());
        }

        let job_id = self.id_provider.generate_id();
        let controller = self.controller_for(&job_id).await?;
        let job = controller
            .start(
                job_id.clone(),
                params.client_id.clone(),
                params.quiz_responses.clone(),
                params.driver_provider,
                params.swarm_provider,
            )
            .await
            .map_err(to_rpc_error)?;

        let now = self.time_provider.now_millis();
        let row = JobIndexRow {
            job_id: job.id.clone(),
            client_id: params.client_id,
            status: job.status,
            business_name: params.quiz_responses.business_name,
            batch_num: job.batch_num,
            domains_checked: 0,
            good_results: 0,
            created_at: now,
            updated_at: now,
        };
        self.job_index.upsert(&row).await.map_err(to_rpc_error)?;

        Ok(RegistrySearchResponse {
            job_id: job.id,
            status: job.status,
        })
    }

    /// registry.list
    pub async fn registry_list(
        &self,
        params: RegistryListRequest,
    ) -> Result<Vec<JobIndexRow>, ErrorObjectOwned> {
        self.job_index
            .list(params.limit, params.offset, params.status)
            .await
            .map_err(to_rpc_error)
    }

    /// registry.recent
    pub async fn registry_recent(
        &self,
        params: RegistryRecentRequest,
    ) -> Result<Vec<JobIndexRow>, ErrorObjectOwned> {
        self.job_index.recent(params.limit).await.map_err(to_rpc_error)
    }

    /// registry.backfill - rebuild index rows by polling each job's own store
    pub async fn registry_backfill(
        &self,
        params: RegistryBackfillRequest,
    ) -> Result<RegistryBackfillResponse, ErrorObjectOwned> {
        let mut rebuilt = 0i64;
        let mut failed = Vec::new();
        for job_id in &params.job_ids {
            match self.sync_index(job_id).await {
                Ok(()) => rebuilt += 1,
                Err(_) => failed.push(job_id.clone()),
            }
        }
        Ok(RegistryBackfillResponse { rebuilt, failed })
    }
}
