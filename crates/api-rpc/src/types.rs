//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results (§6).

use brandscout_core::domain::{FollowupResponses, JobStatus, ProviderKind, QuizResponses};
use serde::{Deserialize, Serialize};

/// `search.start` - create a job and arm it for immediate execution
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub job_id: String,
    pub client_id: String,
    pub quiz_responses: QuizResponses,
    #[serde(default)]
    pub driver_provider: Option<ProviderKind>,
    #[serde(default)]
    pub swarm_provider: Option<ProviderKind>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartResponse {
    pub job_id: String,
    pub status: JobStatus,
}

/// `search.status` / `search.results` / `search.followup` / `search.cancel` / `search.stream`
/// all key off a single job id.
#[derive(Debug, Deserialize)]
pub struct JobIdRequest {
    pub job_id: String,
}

/// `search.resume`
#[derive(Debug, Deserialize)]
pub struct ResumeRequest {
    pub job_id: String,
    pub followup_responses: FollowupResponses,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobMutationResponse {
    pub job_id: String,
    pub status: JobStatus,
}

/// `registry.search` - allocate a job id in the global index, then forward to `search.start`
#[derive(Debug, Deserialize)]
pub struct RegistrySearchRequest {
    pub client_id: String,
    pub quiz_responses: QuizResponses,
    #[serde(default)]
    pub driver_provider: Option<ProviderKind>,
    #[serde(default)]
    pub swarm_provider: Option<ProviderKind>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrySearchResponse {
    pub job_id: String,
    pub status: JobStatus,
}

/// `registry.list`
#[derive(Debug, Deserialize)]
pub struct RegistryListRequest {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub status: Option<JobStatus>,
}

fn default_limit() -> i64 {
    50
}

/// `registry.recent`
#[derive(Debug, Deserialize)]
pub struct RegistryRecentRequest {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// `registry.backfill` - rebuild index rows by polling each job's status
#[derive(Debug, Deserialize)]
pub struct RegistryBackfillRequest {
    pub job_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistryBackfillResponse {
    pub rebuilt: i64,
    pub failed: Vec<String>,
}
