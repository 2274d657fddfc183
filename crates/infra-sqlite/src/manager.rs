// Per-job store manager — opens (and caches) one SQLite file per job id under a base directory.

use crate::{create_pool, run_job_store_migrations, SqliteJobStore};
use async_trait::async_trait;
use brandscout_core::domain::JobId;
use brandscout_core::error::{AppError, Result};
use brandscout_core::port::{JobStore, JobStoreOpener};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Caches one `SqliteJobStore` per job id so the daemon doesn't reopen a pool on every poll.
pub struct JobStoreManager {
    base_dir: PathBuf,
    stores: Mutex<HashMap<JobId, Arc<dyn JobStore>>>,
}

impl JobStoreManager {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// Open (creating on first use) the private store for `job_id`.
    pub async fn open(&self, job_id: &JobId) -> Result<Arc<dyn JobStore>> {
        let mut stores = self.stores.lock().await;
        if let Some(store) = stores.get(job_id) {
            return Ok(Arc::clone(store));
        }

        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(AppError::Io)?;

        let db_path = self.base_dir.join(format!("{job_id}.sqlite"));
        let database_url = format!("sqlite://{}", db_path.display());

        let pool = create_pool(&database_url)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        run_job_store_migrations(&pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let store: Arc<dyn JobStore> = Arc::new(SqliteJobStore::new(pool));
        stores.insert(job_id.clone(), Arc::clone(&store));
        Ok(store)
    }
}

/// Lets the RPC layer reach per-job stores through the port instead of this concrete type.
#[async_trait]
impl JobStoreOpener for JobStoreManager {
    async fn open(&self, job_id: &JobId) -> Result<Arc<dyn JobStore>> {
        self.open(job_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_is_idempotent_per_job() {
        let dir = tempfile_dir();
        let manager = JobStoreManager::new(dir.clone());

        let a = manager.open(&"job-1".to_string()).await.unwrap();
        let b = manager.open(&"job-1".to_string()).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        tokio::fs::remove_dir_all(dir).await.ok();
    }

    #[tokio::test]
    async fn distinct_jobs_get_distinct_files() {
        let dir = tempfile_dir();
        let manager = JobStoreManager::new(dir.clone());

        manager.open(&"job-a".to_string()).await.unwrap();
        manager.open(&"job-b".to_string()).await.unwrap();

        assert!(dir.join("job-a.sqlite").exists());
        assert!(dir.join("job-b.sqlite").exists());

        tokio::fs::remove_dir_all(dir).await.ok();
    }

    fn tempfile_dir() -> PathBuf {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("brandscout-test-{}-{n}", std::process::id()))
    }
}
