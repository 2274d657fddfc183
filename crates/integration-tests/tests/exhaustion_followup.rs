//! Scenario 2 (spec §8): exhaustion -> follow-up.

mod common;

use std::sync::Arc;

use brandscout_core::domain::{ArtifactType, AvailabilityStatus, JobStatus};
use brandscout_core::port::availability::AvailabilityRecord;
use common::{
    domains, evaluations_json, new_controller, new_job_store, quiz, run_one_batch, AvailabilityMock,
    EvaluatorMock, GeneratorMock, PricingMock, MAX_BATCHES,
};

#[tokio::test]
async fn runs_out_batches_and_requests_followup() {
    let store = new_job_store().await;
    let controller = new_controller(store.clone());

    let job_id = "sunrise-bakery-2".to_string();
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

    let mut final_status = JobStatus::Running;
    for batch in 0..MAX_BATCHES {
        let candidates = domains(&format!("sunrisebakery{batch}"), "com", 50);

        let generator = Arc::new(brandscout_core::port::generator::mocks::MockGenerator::new(
            brandscout_core::port::generator::mocks::MockBehavior::ToolReply(candidates.clone()),
            true,
        ));
        let evaluator = Arc::new(EvaluatorMock::new(
            brandscout_core::port::evaluator::mocks::MockBehavior::JsonReply(evaluations_json(
                &candidates, 0.9, true,
            )),
        ));

        let availability = Arc::new(AvailabilityMock::new(AvailabilityStatus::Registered));
        for domain in candidates.iter().take(2) {
            availability.set(
                domain,
                AvailabilityRecord {
                    status: AvailabilityStatus::Available,
                    registrar: None,
                    expiration: None,
                },
            );
        }

        let pricing = Arc::new(PricingMock::new());

        let job = run_one_batch(&store, &job_id, generator, evaluator, availability, pricing)
            .await
            .unwrap();
        final_status = job.status;
        if job.status != JobStatus::Running {
            break;
        }
    }

    assert_eq!(final_status, JobStatus::NeedsFollowup);

    let artifact = controller.followup(&job_id).await.unwrap();
    assert_eq!(artifact.artifact_type, ArtifactType::FollowupQuiz);
    let parsed: serde_json::Value = serde_json::from_str(&artifact.content).unwrap();
    let questions = parsed["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
}
