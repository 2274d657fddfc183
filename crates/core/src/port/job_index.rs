// Job Index Port — the process-wide registry used by the global RPC surface (§6).

use crate::domain::{ClientId, JobId, JobStatus};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One row of the process-wide `job_index` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobIndexRow {
    pub job_id: JobId,
    pub client_id: ClientId,
    pub status: JobStatus,
    pub business_name: String,
    pub batch_num: i64,
    pub domains_checked: i64,
    pub good_results: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Persistence for the single, process-wide job registry. Distinct from `JobStore`: this index
/// exists so `/api/jobs/list`, `/api/jobs/recent`, and `/api/backfill` don't need to open every
/// job's private store to answer a listing query.
#[async_trait]
pub trait JobIndex: Send + Sync {
    /// Insert or replace the index row for a job.
    async fn upsert(&self, row: &JobIndexRow) -> Result<()>;

    async fn find(&self, job_id: &JobId) -> Result<Option<JobIndexRow>>;

    /// Paginated listing, optionally filtered by status, newest first.
    async fn list(
        &self,
        limit: i64,
        offset: i64,
        status: Option<JobStatus>,
    ) -> Result<Vec<JobIndexRow>>;

    /// The `limit` most recently created jobs.
    async fn recent(&self, limit: i64) -> Result<Vec<JobIndexRow>>;
}
