//! Scenario 1 (spec §8): happy path, single batch.

mod common;

use std::sync::Arc;

use brandscout_core::domain::JobStatus;
use brandscout_core::port::availability::AvailabilityRecord;
use brandscout_core::domain::AvailabilityStatus;
use common::{
    domains, evaluations_json, new_controller, new_job_store, quiz, run_one_batch, AvailabilityMock,
    EvaluatorMock, GeneratorMock, PricingMock,
};

#[tokio::test]
async fn single_batch_reaches_target_and_completes() {
    let store = new_job_store().await;
    let controller = new_controller(store.clone());

    let job_id = "sunrise-bakery-1".to_string();
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

    let candidates = domains("sunrisebakery", "com", 50);

    let generator = Arc::new(GeneratorMock::new(
        brandscout_core::port::generator::mocks::MockBehavior::ToolReply(candidates.clone()),
        true,
    ));
    let evaluator = Arc::new(EvaluatorMock::new(
        brandscout_core::port::evaluator::mocks::MockBehavior::JsonReply(evaluations_json(
            &candidates, 0.9, true,
        )),
    ));

    let availability = Arc::new(AvailabilityMock::new(AvailabilityStatus::Unknown));
    for (i, domain) in candidates.iter().enumerate() {
        let status = if i < 30 {
            AvailabilityStatus::Available
        } else {
            AvailabilityStatus::Registered
        };
        availability.set(
            domain,
            AvailabilityRecord {
                status,
                registrar: Some("Example Registrar".to_string()),
                expiration: None,
            },
        );
    }

    let pricing = Arc::new(PricingMock::new());
    for domain in &candidates {
        pricing.set(domain, 1_200);
    }

    let job = run_one_batch(&store, &job_id, generator, evaluator, availability, pricing)
        .await
        .unwrap();

    assert_eq!(job.status, JobStatus::Complete);
    assert_eq!(job.batch_num, 1);

    let results = controller.results(&job_id).await.unwrap();
    assert!(results.domains.len() <= 50);
    assert!(results
        .domains
        .windows(2)
        .all(|w| w[0].score >= w[1].score));

    let status = controller.status(&job_id).await.unwrap();
    assert!(status.good_results >= 25);
}
