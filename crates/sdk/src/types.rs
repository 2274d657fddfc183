//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC types from the api-rpc crate.

use serde::{Deserialize, Serialize};

/// The questionnaire answers supplied at job creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResponses {
    pub business_name: String,
    pub tld_preferences: Vec<String>,
    pub vibe: String,
    #[serde(default)]
    pub domain_idea: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
}

/// Answers supplied when resuming a job out of `needs_followup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowupResponses {
    pub direction: String,
    pub length: String,
    pub keywords: String,
}

/// Request to start a search under a caller-supplied job id.
#[derive(Debug, Clone, Serialize)]
pub struct StartRequest {
    pub job_id: String,
    pub client_id: String,
    pub quiz_responses: QuizResponses,
    #[serde(default)]
    pub driver_provider: Option<String>,
    #[serde(default)]
    pub swarm_provider: Option<String>,
}

/// Request to start a search and let the daemon allocate the job id.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySearchRequest {
    pub client_id: String,
    pub quiz_responses: QuizResponses,
    #[serde(default)]
    pub driver_provider: Option<String>,
    #[serde(default)]
    pub swarm_provider: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobHandle {
    pub job_id: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobIdRequest {
    pub job_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeRequest {
    pub job_id: String,
    pub followup_responses: FollowupResponses,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusSnapshot {
    pub job_id: String,
    pub status: String,
    pub batch_num: i64,
    pub domains_checked: i64,
    pub domains_available: i64,
    pub good_results: i64,
    pub total_input_tokens: i64,
    pub total_output_tokens: i64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankedDomain {
    pub domain: String,
    pub score: f64,
    pub price_cents: Option<i64>,
    pub pricing_category: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultsSnapshot {
    pub domains: Vec<RankedDomain>,
    pub pricing_histogram: std::collections::HashMap<String, i64>,
    pub total_input_tokens: i64,
    pub total_output_tokens: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamSnapshot {
    pub status: String,
    pub recent_available: Vec<RankedDomain>,
    pub domain_idea_status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchArtifact {
    pub batch_num: i64,
    pub artifact_type: String,
    pub content: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistryListRequest {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub status: Option<String>,
}

#[allow(dead_code)] // Used by serde via #[serde(default)]
fn default_limit() -> i64 {
    50
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistryRecentRequest {
    pub limit: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobIndexRow {
    pub job_id: String,
    pub client_id: String,
    pub status: String,
    pub business_name: String,
    pub batch_num: i64,
    pub domains_checked: i64,
    pub good_results: i64,
    pub created_at: i64,
    pub updated_at: i64,
}
