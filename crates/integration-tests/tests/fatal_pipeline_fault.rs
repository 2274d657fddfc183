//! Scenario 6 (spec §8): a fatal, non-recoverable pipeline fault fails the job.
//!
//! Generator/evaluator/availability/pricing failures are all documented recoverable paths
//! (§7 ProviderDegraded / LookupUnknown) and never escape `run_batch`. The only channel left
//! for an "unhandled exception inside the pipeline" is the job's own persistence layer, so
//! this scenario is grounded on a store write failing outright (disk full, corruption) rather
//! than a provider error.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use brandscout_core::domain::{AvailabilityStatus, DomainResult, Job, JobId, JobStatus, SearchArtifact};
use brandscout_core::error::{AppError, Result};
use brandscout_core::port::JobStore;
use common::{
    domains, evaluations_json, new_job_store, quiz, AvailabilityMock, EvaluatorMock, GeneratorMock,
    PricingMock,
};

/// Wraps a real job store but fails every domain-result write, simulating an unrecoverable
/// storage fault partway through step 9 of the batch pipeline.
struct FailingStore {
    inner: Arc<dyn JobStore>,
}

#[async_trait]
impl JobStore for FailingStore {
    async fn insert_job(&self, job: &Job) -> Result<()> {
        self.inner.insert_job(job).await
    }

    async fn find_job(&self, id: &JobId) -> Result<Option<Job>> {
        self.inner.find_job(id).await
    }

    async fn update_job(&self, job: &Job) -> Result<()> {
        self.inner.update_job(job).await
    }

    async fn upsert_domain_result(&self, _job_id: &JobId, _result: &DomainResult) -> Result<()> {
        Err(AppError::Database("disk write failed".to_string()))
    }

    async fn checked_domains(&self, job_id: &JobId) -> Result<Vec<String>> {
        self.inner.checked_domains(job_id).await
    }

    async fn available_results(&self, job_id: &JobId, limit: i64) -> Result<Vec<DomainResult>> {
        self.inner.available_results(job_id, limit).await
    }

    async fn all_results(&self, job_id: &JobId) -> Result<Vec<DomainResult>> {
        self.inner.all_results(job_id).await
    }

    async fn insert_artifact(&self, job_id: &JobId, artifact: &SearchArtifact) -> Result<()> {
        self.inner.insert_artifact(job_id, artifact).await
    }

    async fn latest_artifact(
        &self,
        job_id: &JobId,
        artifact_type: brandscout_core::domain::ArtifactType,
    ) -> Result<Option<SearchArtifact>> {
        self.inner.latest_artifact(job_id, artifact_type).await
    }
}

#[tokio::test]
async fn unrecoverable_store_failure_fails_the_job_with_no_retry() {
    let real_store = new_job_store().await;
    let controller = common::new_controller(real_store.clone());

    let job_id = "sunrise-bakery-6".to_string();
    controller
        .start(
            job_id.clone(),
            "client-1".to_string(),
            quiz("Sunrise Bakery", &["com"], "creative"),
            None,
            None,
        )
        .await
        .unwrap();

    let failing_store: Arc<dyn JobStore> = Arc::new(FailingStore {
        inner: real_store.clone(),
    });

    let candidates = domains("sunrisebakery", "com", 10);
    let generator = Arc::new(GeneratorMock::new(
        brandscout_core::port::generator::mocks::MockBehavior::ToolReply(candidates.clone()),
        true,
    ));
    let evaluator = Arc::new(EvaluatorMock::new(
        brandscout_core::port::evaluator::mocks::MockBehavior::JsonReply(evaluations_json(
            &candidates, 0.9, true,
        )),
    ));
    let availability = Arc::new(AvailabilityMock::new(AvailabilityStatus::Available));
    let pricing = Arc::new(PricingMock::new());

    let job = common::run_one_batch(
        &failing_store,
        &job_id,
        generator,
        evaluator,
        availability,
        pricing,
    )
    .await
    .unwrap();

    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.is_some());
    assert!(job.wake_at.is_none());

    // No further batches are scheduled: the real store, read directly, still shows the
    // job as failed with no domain results persisted.
    let reloaded = real_store.find_job(&job_id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, JobStatus::Failed);
}
