//! Ticker — polls the job index for due timers and runs one batch per due job.
//!
//! One job is never run twice concurrently: each job id gets its own `tokio::sync::Mutex<()>`
//! guard, acquired with `try_lock` so a job whose previous batch is still running is simply
//! skipped this tick rather than queued up behind it.

use brandscout_core::application::constants::{DEFAULT_MAX_BATCHES, DEFAULT_TARGET_RESULTS};
use brandscout_core::application::termination::{self, TerminationDecision};
use brandscout_core::application::{shutdown::ShutdownToken, BatchPipeline};
use brandscout_core::domain::{ArtifactType, JobId, JobStatus, ProviderKind, SearchArtifact};
use brandscout_core::port::{
    AvailabilityLookup, EmailNotifier, Evaluator, Generator, IdProvider, JobIndex, JobIndexRow,
    JobStore, JobStoreOpener, NotificationKind, PricingLookup, TimeProvider,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

pub struct TickerConfig {
    pub tick_interval_ms: u64,
    pub max_batches: i64,
    pub target_results: i64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
            max_batches: DEFAULT_MAX_BATCHES,
            target_results: DEFAULT_TARGET_RESULTS,
        }
    }
}

/// Holds one concrete `Generator`+`Evaluator` pair per provider kind, selected per job by
/// `driver_provider`/`swarm_provider`.
pub struct ProviderRegistry {
    generators: HashMap<ProviderKind, Arc<dyn Generator>>,
    evaluators: HashMap<ProviderKind, Arc<dyn Evaluator>>,
    default_driver: ProviderKind,
    default_swarm: ProviderKind,
}

impl ProviderRegistry {
    pub fn new(default_driver: ProviderKind, default_swarm: ProviderKind) -> Self {
        Self {
            generators: HashMap::new(),
            evaluators: HashMap::new(),
            default_driver,
            default_swarm,
        }
    }

    pub fn register(
        &mut self,
        kind: ProviderKind,
        generator: Arc<dyn Generator>,
        evaluator: Arc<dyn Evaluator>,
    ) {
        self.generators.insert(kind, generator);
        self.evaluators.insert(kind, evaluator);
    }

    fn generator_for(&self, kind: Option<ProviderKind>) -> Option<Arc<dyn Generator>> {
        self.generators
            .get(&kind.unwrap_or(self.default_driver))
            .cloned()
    }

    fn evaluator_for(&self, kind: Option<ProviderKind>) -> Option<Arc<dyn Evaluator>> {
        self.evaluators
            .get(&kind.unwrap_or(self.default_swarm))
            .cloned()
    }
}

pub struct Ticker {
    job_store_opener: Arc<dyn JobStoreOpener>,
    job_index: Arc<dyn JobIndex>,
    providers: Arc<ProviderRegistry>,
    availability: Arc<dyn AvailabilityLookup>,
    pricing: Arc<dyn PricingLookup>,
    time_provider: Arc<dyn TimeProvider>,
    id_provider: Arc<dyn IdProvider>,
    email: Arc<dyn EmailNotifier>,
    config: TickerConfig,
    guards: Mutex<HashMap<JobId, Arc<Mutex<()>>>>,
}

impl Ticker {
    pub fn new(
        job_store_opener: Arc<dyn JobStoreOpener>,
        job_index: Arc<dyn JobIndex>,
        providers: Arc<ProviderRegistry>,
        availability: Arc<dyn AvailabilityLookup>,
        pricing: Arc<dyn PricingLookup>,
        time_provider: Arc<dyn TimeProvider>,
        id_provider: Arc<dyn IdProvider>,
        email: Arc<dyn EmailNotifier>,
        config: TickerConfig,
    ) -> Self {
        Self {
            job_store_opener,
            job_index,
            providers,
            availability,
            pricing,
            time_provider,
            id_provider,
            email,
            config,
            guards: Mutex::new(HashMap::new()),
        }
    }

    pub async fn run(self: Arc<Self>, mut shutdown: ShutdownToken) {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_millis(self.config.tick_interval_ms));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                _ = shutdown.wait() => {
                    info!("ticker shutting down");
                    break;
                }
            }
        }
    }

    async fn tick(&self) {
        let running = match self.job_index.list(500, 0, Some(JobStatus::Running)).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, "failed to list running jobs for ticker sweep");
                return;
            }
        };

        for row in running {
            self.try_run_job(row).await;
        }
    }

    async fn try_run_job(&self, row: JobIndexRow) {
        let guard = {
            let mut guards = self.guards.lock().await;
            guards
                .entry(row.job_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        let Ok(_permit) = guard.try_lock() else {
            return;
        };

        if let Err(e) = self.run_due_batch(&row.job_id).await {
            error!(job_id = %row.job_id, error = %e, "batch run failed");
        }
    }

    async fn run_due_batch(&self, job_id: &JobId) -> brandscout_core::error::Result<()> {
        let store = self.job_store_opener.open(job_id).await?;
        let Some(mut job) = store.find_job(job_id).await? else {
            return Ok(());
        };

        if job.status != JobStatus::Running {
            return Ok(());
        }

        let now = self.time_provider.now_millis();
        let Some(wake_at) = job.wake_at else {
            return Ok(());
        };
        if wake_at > now {
            return Ok(());
        }

        let generator = self.providers.generator_for(job.driver_provider);
        let evaluator = self.providers.evaluator_for(job.swarm_provider);
        let (Some(generator), Some(evaluator)) = (generator, evaluator) else {
            warn!(job_id = %job_id, "no provider configured for job, failing it");
            job.fail("no provider configured", now);
            store.update_job(&job).await?;
            return Ok(());
        };

        let pipeline = BatchPipeline::new(
            store.clone(),
            generator,
            evaluator,
            self.availability.clone(),
            self.pricing.clone(),
            self.time_provider.clone(),
        );

        match pipeline.run_batch(&mut job, self.config.max_batches).await {
            Ok(_) => {
                let results = store.all_results(job_id).await?;
                let decision = termination::decide(
                    &results,
                    self.config.target_results,
                    job.batch_num,
                    self.config.max_batches,
                );
                self.apply_decision(store.as_ref(), &mut job, decision, now)
                    .await;
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "batch pipeline error, failing job");
                job.fail(e.to_string(), now);
            }
        }

        store.update_job(&job).await?;
        self.sync_index(&job).await;

        if job.is_terminal() || job.status == JobStatus::NeedsFollowup {
            self.guards.lock().await.remove(job_id);
            let kind = match job.status {
                JobStatus::Complete => Some(NotificationKind::ResultsReady),
                JobStatus::NeedsFollowup => Some(NotificationKind::FollowupNeeded),
                _ => None,
            };
            if let (Some(kind), Some(recipient)) =
                (kind, job.quiz_responses.client_email.clone())
            {
                if let Err(e) = self.email.notify(&job.id, &recipient, kind).await {
                    warn!(job_id = %job.id, error = %e, "email notification failed");
                }
            }
        }

        Ok(())
    }

    async fn apply_decision(
        &self,
        store: &dyn JobStore,
        job: &mut brandscout_core::domain::Job,
        decision: TerminationDecision,
        now: i64,
    ) {
        match decision {
            TerminationDecision::Complete => {
                if job.complete(now).is_err() {
                    warn!(job_id = %job.id, "complete() rejected from non-running state");
                }
            }
            TerminationDecision::NeedsFollowup => {
                let artifact = SearchArtifact {
                    batch_num: job.batch_num,
                    artifact_type: ArtifactType::FollowupQuiz,
                    content: followup_quiz_content(),
                    created_at: now,
                };
                if let Err(e) = store.insert_artifact(&job.id, &artifact).await {
                    error!(job_id = %job.id, error = %e, "failed to persist followup quiz artifact");
                }
                if job.request_followup(now).is_err() {
                    warn!(job_id = %job.id, "request_followup() rejected from non-running state");
                }
            }
            TerminationDecision::Continue => {
                job.rearm(now, termination::rearm_delay_ms());
            }
        }
    }

    async fn sync_index(&self, job: &brandscout_core::domain::Job) {
        let existing = self.job_index.find(&job.id).await.ok().flatten();
        let (client_id, business_name, created_at) = match existing {
            Some(row) => (row.client_id, row.business_name, row.created_at),
            None => (
                job.client_id.clone(),
                job.quiz_responses.business_name.clone(),
                job.created_at,
            ),
        };

        let store = match self.job_store_opener.open(&job.id).await {
            Ok(store) => store,
            Err(e) => {
                error!(job_id = %job.id, error = %e, "failed to reopen store while syncing index");
                return;
            }
        };
        let results = store.all_results(&job.id).await.unwrap_or_default();
        let good_results = termination::good_result_count(&results) as i64;

        let row = JobIndexRow {
            job_id: job.id.clone(),
            client_id,
            status: job.status,
            business_name,
            batch_num: job.batch_num,
            domains_checked: results.len() as i64,
            good_results,
            created_at,
            updated_at: self.time_provider.now_millis(),
        };
        if let Err(e) = self.job_index.upsert(&row).await {
            error!(job_id = %job.id, error = %e, "failed to sync job index");
        }
    }

    /// Exposed so `RpcHandler`-triggered `start`/`resume` can allocate a fresh id without the
    /// ticker needing its own `IdProvider` wiring duplicated in the daemon's composition root.
    pub fn id_provider(&self) -> Arc<dyn IdProvider> {
        self.id_provider.clone()
    }
}

/// The three-question follow-up quiz presented when a job exhausts its batch budget
/// without reaching the target count (direction, length, keywords).
fn followup_quiz_content() -> String {
    serde_json::json!({
        "questions": [
            {
                "id": "direction",
                "prompt": "Want to try a different direction, or keep refining this one?",
            },
            {
                "id": "length",
                "prompt": "Are longer domain names acceptable, or should we stay short?",
            },
            {
                "id": "keywords",
                "prompt": "Any new keywords or themes we should weave in?",
            },
        ],
    })
    .to_string()
}
