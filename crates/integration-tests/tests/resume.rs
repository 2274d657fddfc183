//! Scenario 3 (spec §8): resume from needs_followup.

mod common;

use std::sync::Arc;

use brandscout_core::domain::{AvailabilityStatus, FollowupResponses, JobStatus};
use brandscout_core::port::availability::AvailabilityRecord;
use common::{
    domains, evaluations_json, new_controller, new_job_store, quiz, run_one_batch, AvailabilityMock,
    EvaluatorMock, GeneratorMock, PricingMock, MAX_BATCHES,
};

async fn exhaust_into_followup(
    store: &std::sync::Arc<dyn brandscout_core::port::JobStore>,
    job_id: &str,
) {
    for batch in 0..MAX_BATCHES {
        let candidates = domains(&format!("sunrisebakery{batch}"), "com", 50);
        let generator = Arc::new(GeneratorMock::new(
            brandscout_core::port::generator::mocks::MockBehavior::ToolReply(candidates.clone()),
            true,
        ));
        let evaluator = Arc::new(EvaluatorMock::new(
            brandscout_core::port::evaluator::mocks::MockBehavior::JsonReply(evaluations_json(
                &candidates, 0.9, true,
            )),
        ));
        let availability = Arc::new(AvailabilityMock::new(AvailabilityStatus::Registered));
        let pricing = Arc::new(PricingMock::new());

        let job = run_one_batch(
            store,
            &job_id.to_string(),
            generator,
            evaluator,
            availability,
            pricing,
        )
        .await
        .unwrap();
        if job.status != JobStatus::Running {
            break;
        }
    }
}

#[tokio::test]
async fn resume_returns_to_running_and_advances_batch() {
    let store = new_job_store().await;
    let controller = new_controller(store.clone());

    let job_id = "sunrise-bakery-3".to_string();
    controller
        .start(
            job_id.clone(),
            "client-1".to_string(),
            quiz("Sunrise Bakery", &["com", "co", "io"], "creative"),
            None,
            None,
        )
        .await
        .unwrap();

    exhaust_into_followup(&store, &job_id).await;

    let before = controller.status(&job_id).await.unwrap();
    assert_eq!(before.status, JobStatus::NeedsFollowup);
    let batch_before = before.batch_num;

    controller
        .resume(
            &job_id,
            FollowupResponses {
                direction: "different_tld".to_string(),
                length: "longer_ok".to_string(),
                keywords: "local".to_string(),
            },
        )
        .await
        .unwrap();

    let resumed = controller.status(&job_id).await.unwrap();
    assert_eq!(resumed.status, JobStatus::Running);

    let candidates = domains("sunrisebakeryresumed", "io", 50);
    let generator = Arc::new(GeneratorMock::new(
        brandscout_core::port::generator::mocks::MockBehavior::ToolReply(candidates.clone()),
        true,
    ));
    let evaluator = Arc::new(EvaluatorMock::new(
        brandscout_core::port::evaluator::mocks::MockBehavior::JsonReply(evaluations_json(
            &candidates, 0.9, true,
        )),
    ));
    let availability = Arc::new(AvailabilityMock::new(AvailabilityStatus::Registered));
    let pricing = Arc::new(PricingMock::new());

    let job = run_one_batch(&store, &job_id, generator, evaluator, availability, pricing)
        .await
        .unwrap();

    assert!(job.batch_num > batch_before);
}
