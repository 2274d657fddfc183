// Job Store Port — the per-job private embedded SQL store (§3, §6).

use crate::domain::{DomainResult, Job, JobId, SearchArtifact};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence for a single job's own state: the job row itself, its checked domains, and its
/// artifacts. One instance of this port is bound to exactly one job id (§9 "singleton-per-job
/// SQL store as state").
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a brand-new job row. Errors with `Conflict` if the job already exists.
    async fn insert_job(&self, job: &Job) -> Result<()>;

    /// Load the job row, if it exists.
    async fn find_job(&self, id: &JobId) -> Result<Option<Job>>;

    /// Persist the full job row (status, batch_num, token counters, wake_at, ...).
    async fn update_job(&self, job: &Job) -> Result<()>;

    /// Insert-or-replace a domain result row, keyed by `domain` (invariant 1 of §3).
    async fn upsert_domain_result(&self, job_id: &JobId, result: &DomainResult) -> Result<()>;

    /// All checked domains (any status) in lowercase, for dedup against new candidates.
    async fn checked_domains(&self, job_id: &JobId) -> Result<Vec<String>>;

    /// Domain results with `status = available`, ordered by `score DESC, price_cents ASC NULLS LAST`.
    async fn available_results(&self, job_id: &JobId, limit: i64) -> Result<Vec<DomainResult>>;

    /// All domain results for a job (used by `/status` aggregate counts).
    async fn all_results(&self, job_id: &JobId) -> Result<Vec<DomainResult>>;

    /// Append a search artifact.
    async fn insert_artifact(&self, job_id: &JobId, artifact: &SearchArtifact) -> Result<()>;

    /// Most recent artifact of the given type, if any.
    async fn latest_artifact(
        &self,
        job_id: &JobId,
        artifact_type: crate::domain::ArtifactType,
    ) -> Result<Option<SearchArtifact>>;
}
