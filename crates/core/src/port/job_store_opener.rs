// Job Store Opener Port (ambient — added) — bridges the RPC layer to the per-job private
// store (§9 "singleton-per-job SQL store as state") without depending on a concrete database
// adapter, the same way every other capability here is reached through a trait rather than a
// concrete type.

use crate::domain::JobId;
use crate::error::Result;
use crate::port::JobStore;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait JobStoreOpener: Send + Sync {
    /// Open (creating on first use) the private store for `job_id`.
    async fn open(&self, job_id: &JobId) -> Result<Arc<dyn JobStore>>;
}

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    pub struct MockJobStoreOpener {
        stores: Mutex<HashMap<JobId, Arc<dyn JobStore>>>,
    }

    impl MockJobStoreOpener {
        pub fn new() -> Self {
            Self {
                stores: Mutex::new(HashMap::new()),
            }
        }

        pub fn register(&self, job_id: impl Into<JobId>, store: Arc<dyn JobStore>) {
            self.stores.lock().unwrap().insert(job_id.into(), store);
        }
    }

    impl Default for MockJobStoreOpener {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl JobStoreOpener for MockJobStoreOpener {
        async fn open(&self, job_id: &JobId) -> Result<Arc<dyn JobStore>> {
            self.stores.lock().unwrap().get(job_id).cloned().ok_or_else(|| {
                crate::error::AppError::NotFound(format!("no store registered for job {job_id}"))
            })
        }
    }
}
