// Job Controller (C1, §4.1) — lifecycle RPC operations against a single job's store.

use crate::application::constants::MAX_RESULTS_RETURNED;
use crate::application::termination::good_result_count;
use crate::domain::{
    ArtifactType, AvailabilityStatus, DomainResult, FollowupResponses, Job, JobId, JobStatus,
    PricingCategory, QuizResponses, SearchArtifact,
};
use crate::error::{AppError, Result};
use crate::port::{EmailNotifier, IdProvider, JobStore, NotificationKind, TimeProvider};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub job_id: JobId,
    pub status: JobStatus,
    pub batch_num: i64,
    pub domains_checked: i64,
    pub domains_available: i64,
    pub good_results: i64,
    pub total_input_tokens: i64,
    pub total_output_tokens: i64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedDomain {
    pub domain: String,
    pub score: f64,
    pub price_cents: Option<i64>,
    pub pricing_category: PricingCategory,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsSnapshot {
    pub domains: Vec<RankedDomain>,
    pub pricing_histogram: HashMap<String, i64>,
    pub total_input_tokens: i64,
    pub total_output_tokens: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamSnapshot {
    pub status: JobStatus,
    pub recent_available: Vec<RankedDomain>,
    pub domain_idea_status: Option<AvailabilityStatus>,
}

/// The five C1 operations against one job's own store, plus the RPC-facing lifecycle ops.
pub struct JobController {
    job_store: Arc<dyn JobStore>,
    time_provider: Arc<dyn TimeProvider>,
    id_provider: Arc<dyn IdProvider>,
    email: Arc<dyn EmailNotifier>,
}

impl JobController {
    pub fn new(
        job_store: Arc<dyn JobStore>,
        time_provider: Arc<dyn TimeProvider>,
        id_provider: Arc<dyn IdProvider>,
        email: Arc<dyn EmailNotifier>,
    ) -> Self {
        Self {
            job_store,
            time_provider,
            id_provider,
            email,
        }
    }

    /// Create a job and arm it for immediate execution. `job_id` is caller-supplied (the
    /// global registry allocates it) so index and store agree on identity.
    pub async fn start(
        &self,
        job_id: JobId,
        client_id: String,
        quiz_responses: QuizResponses,
        driver_provider: Option<crate::domain::ProviderKind>,
        swarm_provider: Option<crate::domain::ProviderKind>,
    ) -> Result<Job> {
        if self.job_store.find_job(&job_id).await?.is_some() {
            return Err(AppError::Conflict(format!("job already exists: {job_id}")));
        }

        let now = self.time_provider.now_millis();
        let mut job = Job::new(job_id, client_id, now, quiz_responses, driver_provider, swarm_provider);
        job.start(now).map_err(AppError::Domain)?;
        self.job_store.insert_job(&job).await?;
        info!(job_id = %job.id, "job started");
        Ok(job)
    }

    pub async fn status(&self, job_id: &JobId) -> Result<StatusSnapshot> {
        let job = self.require_job(job_id).await?;
        let results = self.job_store.all_results(job_id).await?;
        let available = results
            .iter()
            .filter(|r| r.status == AvailabilityStatus::Available)
            .count() as i64;

        Ok(StatusSnapshot {
            job_id: job.id.clone(),
            status: job.status,
            batch_num: job.batch_num,
            domains_checked: results.len() as i64,
            domains_available: available,
            good_results: good_result_count(&results) as i64,
            total_input_tokens: job.total_input_tokens,
            total_output_tokens: job.total_output_tokens,
            error: job.error.clone(),
        })
    }

    pub async fn results(&self, job_id: &JobId) -> Result<ResultsSnapshot> {
        let job = self.require_job(job_id).await?;
        let available = self
            .job_store
            .available_results(job_id, MAX_RESULTS_RETURNED)
            .await?;

        let mut histogram: HashMap<String, i64> = HashMap::new();
        let domains: Vec<RankedDomain> = available
            .into_iter()
            .map(|r| {
                let category = r.pricing_category();
                *histogram.entry(format!("{category:?}").to_lowercase()).or_insert(0) += 1;
                RankedDomain {
                    domain: r.domain,
                    score: r.score,
                    price_cents: r.price_cents,
                    pricing_category: category,
                }
            })
            .collect();

        Ok(ResultsSnapshot {
            domains,
            pricing_histogram: histogram,
            total_input_tokens: job.total_input_tokens,
            total_output_tokens: job.total_output_tokens,
        })
    }

    pub async fn followup(&self, job_id: &JobId) -> Result<SearchArtifact> {
        self.require_job(job_id).await?;
        self.job_store
            .latest_artifact(job_id, ArtifactType::FollowupQuiz)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no follow-up quiz for job {job_id}")))
    }

    pub async fn resume(
        &self,
        job_id: &JobId,
        followup_responses: FollowupResponses,
    ) -> Result<Job> {
        let mut job = self.require_job(job_id).await?;
        let now = self.time_provider.now_millis();
        job.resume(followup_responses, now).map_err(AppError::Domain)?;
        self.job_store.update_job(&job).await?;
        info!(job_id = %job.id, "job resumed");
        Ok(job)
    }

    pub async fn cancel(&self, job_id: &JobId) -> Result<Job> {
        let mut job = self.require_job(job_id).await?;
        let now = self.time_provider.now_millis();
        job.cancel(now).map_err(AppError::Domain)?;
        self.job_store.update_job(&job).await?;
        info!(job_id = %job.id, "job cancelled");
        Ok(job)
    }

    pub async fn stream(&self, job_id: &JobId) -> Result<StreamSnapshot> {
        let job = self.require_job(job_id).await?;
        let recent_available = self.job_store.available_results(job_id, 10).await?;
        let domain_idea_status = if let Some(idea) = &job.quiz_responses.domain_idea {
            self.job_store
                .all_results(job_id)
                .await?
                .into_iter()
                .find(|r| &r.domain == idea)
                .map(|r| r.status)
        } else {
            None
        };

        Ok(StreamSnapshot {
            status: job.status,
            recent_available: recent_available
                .into_iter()
                .map(|r| RankedDomain {
                    domain: r.domain,
                    score: r.score,
                    price_cents: r.price_cents,
                    pricing_category: r.pricing_category(),
                })
                .collect(),
            domain_idea_status,
        })
    }

    /// Trigger the configured email notification, swallowing failures (§7 EmailUnavailable).
    pub async fn notify(&self, job: &Job, kind: NotificationKind) {
        let Some(recipient) = job.quiz_responses.client_email.as_deref() else {
            return;
        };
        if let Err(e) = self.email.notify(&job.id, recipient, kind).await {
            warn!(job_id = %job.id, error = %e, "email notification failed");
        }
    }

    pub fn generate_job_id(&self) -> JobId {
        self.id_provider.generate_id()
    }

    async fn require_job(&self, job_id: &JobId) -> Result<Job> {
        self.job_store
            .find_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("job not found: {job_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedTimeProvider(i64);
    impl TimeProvider for FixedTimeProvider {
        fn now_millis(&self) -> i64 {
            self.0
        }
    }

    struct SequentialIdProvider(Mutex<u64>);
    impl IdProvider for SequentialIdProvider {
        fn generate_id(&self) -> String {
            let mut guard = self.0.lock().unwrap();
            *guard += 1;
            format!("job-{}", *guard)
        }
    }

    struct InMemoryJobStore {
        jobs: Mutex<HashMap<JobId, Job>>,
        results: Mutex<HashMap<JobId, Vec<DomainResult>>>,
        artifacts: Mutex<HashMap<JobId, Vec<SearchArtifact>>>,
    }

    impl InMemoryJobStore {
        fn new() -> Self {
            Self {
                jobs: Mutex::new(HashMap::new()),
                results: Mutex::new(HashMap::new()),
                artifacts: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl JobStore for InMemoryJobStore {
        async fn insert_job(&self, job: &Job) -> Result<()> {
            self.jobs.lock().unwrap().insert(job.id.clone(), job.clone());
            Ok(())
        }
        async fn find_job(&self, id: &JobId) -> Result<Option<Job>> {
            Ok(self.jobs.lock().unwrap().get(id).cloned())
        }
        async fn update_job(&self, job: &Job) -> Result<()> {
            self.jobs.lock().unwrap().insert(job.id.clone(), job.clone());
            Ok(())
        }
        async fn upsert_domain_result(&self, job_id: &JobId, result: &DomainResult) -> Result<()> {
            let mut results = self.results.lock().unwrap();
            let entry = results.entry(job_id.clone()).or_default();
            entry.retain(|r| r.domain != result.domain);
            entry.push(result.clone());
            Ok(())
        }
        async fn checked_domains(&self, job_id: &JobId) -> Result<Vec<String>> {
            Ok(self
                .results
                .lock()
                .unwrap()
                .get(job_id)
                .map(|rs| rs.iter().map(|r| r.domain.clone()).collect())
                .unwrap_or_default())
        }
        async fn available_results(&self, job_id: &JobId, limit: i64) -> Result<Vec<DomainResult>> {
            let mut results = self
                .results
                .lock()
                .unwrap()
                .get(job_id)
                .map(|rs| {
                    rs.iter()
                        .filter(|r| r.status == AvailabilityStatus::Available)
                        .cloned()
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
            results.truncate(limit as usize);
            Ok(results)
        }
        async fn all_results(&self, job_id: &JobId) -> Result<Vec<DomainResult>> {
            Ok(self.results.lock().unwrap().get(job_id).cloned().unwrap_or_default())
        }
        async fn insert_artifact(&self, job_id: &JobId, artifact: &SearchArtifact) -> Result<()> {
            self.artifacts
                .lock()
                .unwrap()
                .entry(job_id.clone())
                .or_default()
                .push(artifact.clone());
            Ok(())
        }
        async fn latest_artifact(
            &self,
            job_id: &JobId,
            artifact_type: ArtifactType,
        ) -> Result<Option<SearchArtifact>> {
            Ok(self
                .artifacts
                .lock()
                .unwrap()
                .get(job_id)
                .and_then(|arts| arts.iter().rev().find(|a| a.artifact_type == artifact_type).cloned()))
        }
    }

    fn quiz() -> QuizResponses {
        QuizResponses {
            business_name: "Sunrise Bakery".to_string(),
            tld_preferences: vec!["com".to_string()],
            vibe: "creative".to_string(),
            domain_idea: None,
            keywords: None,
            client_email: Some("owner@example.com".to_string()),
        }
    }

    fn controller() -> JobController {
        JobController::new(
            Arc::new(InMemoryJobStore::new()),
            Arc::new(FixedTimeProvider(1000)),
            Arc::new(SequentialIdProvider(Mutex::new(0))),
            Arc::new(crate::port::NoopEmailNotifier),
        )
    }

    #[tokio::test]
    async fn start_then_conflict() {
        let controller = controller();
        controller
            .start("job-1".to_string(), "client-1".to_string(), quiz(), None, None)
            .await
            .unwrap();

        let err = controller
            .start("job-1".to_string(), "client-1".to_string(), quiz(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn status_on_unknown_job_is_not_found() {
        let controller = controller();
        let err = controller.status(&"nope".to_string()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn cancel_then_cancel_again_fails() {
        let controller = controller();
        controller
            .start("job-1".to_string(), "client-1".to_string(), quiz(), None, None)
            .await
            .unwrap();
        controller.cancel(&"job-1".to_string()).await.unwrap();
        let err = controller.cancel(&"job-1".to_string()).await.unwrap_err();
        assert!(matches!(err, AppError::Domain(_)));
    }

    #[tokio::test]
    async fn followup_without_artifact_is_not_found() {
        let controller = controller();
        controller
            .start("job-1".to_string(), "client-1".to_string(), quiz(), None, None)
            .await
            .unwrap();
        let err = controller.followup(&"job-1".to_string()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
