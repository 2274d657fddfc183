//! Shared scaffolding for the end-to-end scenarios (spec §8). Each test wires a real
//! in-memory `brandscout-infra-sqlite` store plus port-layer mocks and drives the batch
//! loop the same way `brandscout-daemon`'s ticker does, one `run_batch` + `termination::decide`
//! step at a time, without depending on the daemon binary crate.

use std::sync::Arc;

use brandscout_core::application::termination::{self, TerminationDecision};
use brandscout_core::application::{BatchPipeline, JobController};
use brandscout_core::domain::{ArtifactType, Job, JobId, QuizResponses, SearchArtifact};
use brandscout_core::error::Result;
use brandscout_core::port::availability::mocks::MockAvailabilityLookup;
use brandscout_core::port::email::NoopEmailNotifier;
use brandscout_core::port::evaluator::mocks::MockEvaluator;
use brandscout_core::port::generator::mocks::MockGenerator;
use brandscout_core::port::id_provider::UuidProvider;
use brandscout_core::port::pricing::mocks::MockPricingLookup;
use brandscout_core::port::time_provider::SystemTimeProvider;
use brandscout_core::port::{
    AvailabilityLookup, Evaluator, Generator, JobStore, PricingLookup, TimeProvider,
};
use brandscout_infra_sqlite::{create_pool, run_job_store_migrations, SqliteJobStore};

pub const MAX_BATCHES: i64 = 6;
pub const TARGET_RESULTS: i64 = 25;

pub fn quiz(business_name: &str, tlds: &[&str], vibe: &str) -> QuizResponses {
    QuizResponses {
        business_name: business_name.to_string(),
        tld_preferences: tlds.iter().map(|s| s.to_string()).collect(),
        vibe: vibe.to_string(),
        domain_idea: None,
        keywords: None,
        client_email: None,
    }
}

pub async fn new_job_store() -> Arc<dyn JobStore> {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_job_store_migrations(&pool).await.unwrap();
    Arc::new(SqliteJobStore::new(pool))
}

pub fn new_controller(store: Arc<dyn JobStore>) -> JobController {
    JobController::new(
        store,
        Arc::new(SystemTimeProvider),
        Arc::new(UuidProvider),
        Arc::new(NoopEmailNotifier),
    )
}

/// Runs one batch end to end and applies the controller's re-arm decision (§4.2 step 11),
/// mirroring what the daemon's ticker does for a single due job. Returns the job's status
/// after the decision has been applied and persisted.
pub async fn run_one_batch(
    store: &Arc<dyn JobStore>,
    job_id: &JobId,
    generator: Arc<dyn Generator>,
    evaluator: Arc<dyn Evaluator>,
    availability: Arc<dyn AvailabilityLookup>,
    pricing: Arc<dyn PricingLookup>,
) -> Result<Job> {
    let mut job = store.find_job(job_id).await?.expect("job must exist");
    let now = SystemTimeProvider.now_millis();

    let pipeline = BatchPipeline::new(
        store.clone(),
        generator,
        evaluator,
        availability,
        pricing,
        Arc::new(SystemTimeProvider),
    );

    match pipeline.run_batch(&mut job, MAX_BATCHES).await {
        Ok(_) => {
            let results = store.all_results(job_id).await?;
            let decision = termination::decide(&results, TARGET_RESULTS, job.batch_num, MAX_BATCHES);
            match decision {
                TerminationDecision::Complete => {
                    job.complete(now).ok();
                }
                TerminationDecision::NeedsFollowup => {
                    let artifact = SearchArtifact {
                        batch_num: job.batch_num,
                        artifact_type: ArtifactType::FollowupQuiz,
                        content: serde_json::json!({
                            "questions": [
                                {"id": "direction", "prompt": "Different direction or keep refining?"},
                                {"id": "length", "prompt": "Are longer names acceptable?"},
                                {"id": "keywords", "prompt": "Any new keywords to weave in?"},
                            ],
                        })
                        .to_string(),
                        created_at: now,
                    };
                    store.insert_artifact(job_id, &artifact).await?;
                    job.request_followup(now).ok();
                }
                TerminationDecision::Continue => {
                    job.rearm(now, termination::rearm_delay_ms());
                }
            }
        }
        Err(e) => {
            job.fail(e.to_string(), now);
        }
    }

    store.update_job(&job).await?;
    Ok(job)
}

pub fn domains(business_slug: &str, tld: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("{business_slug}{i}.{tld}"))
        .collect()
}

pub fn evaluations_json(domains: &[String], score: f64, worth_checking: bool) -> serde_json::Value {
    serde_json::json!({
        "evaluations": domains
            .iter()
            .map(|d| serde_json::json!({
                "domain": d,
                "score": score,
                "worth_checking": worth_checking,
                "pronounceable": true,
                "memorable": true,
                "brand_fit": true,
                "email_friendly": true,
                "flags": [],
                "note": "stub evaluation",
            }))
            .collect::<Vec<_>>(),
    })
}

pub use MockAvailabilityLookup as AvailabilityMock;
pub use MockEvaluator as EvaluatorMock;
pub use MockGenerator as GeneratorMock;
pub use MockPricingLookup as PricingMock;
