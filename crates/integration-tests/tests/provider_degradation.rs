//! Scenario 5 (spec §8): provider degradation on one batch does not fail the job.

mod common;

use std::sync::Arc;

use brandscout_core::domain::{AvailabilityStatus, JobStatus};
use common::{
    domains, evaluations_json, new_controller, new_job_store, quiz, run_one_batch, AvailabilityMock,
    EvaluatorMock, GeneratorMock, PricingMock,
};

#[tokio::test]
async fn generator_failure_yields_zero_work_batch_and_stays_running() {
    let store = new_job_store().await;
    let controller = new_controller(store.clone());

    let job_id = "sunrise-bakery-5".to_string();
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

    // Batches 1 and 2: healthy generator, a couple of available results each but nowhere
    // near the target, so the job would normally continue.
    for batch in 0..2 {
        let candidates = domains(&format!("sunrisebakery{batch}"), "com", 10);
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
        assert_eq!(job.status, JobStatus::Running);
    }

    // Batch 3: the generator raises. The pipeline must absorb it and still advance the
    // batch counter with a zero-work report (§4.3, §7 ProviderDegraded).
    let failing_generator = Arc::new(GeneratorMock::new(
        brandscout_core::port::generator::mocks::MockBehavior::Fail("upstream 503".to_string()),
        true,
    ));
    let evaluator = Arc::new(EvaluatorMock::new(
        brandscout_core::port::evaluator::mocks::MockBehavior::JsonReply(evaluations_json(
            &[], 0.9, true,
        )),
    ));
    let availability = Arc::new(AvailabilityMock::new(AvailabilityStatus::Registered));
    let pricing = Arc::new(PricingMock::new());

    let batch_before = controller.status(&job_id).await.unwrap().batch_num;

    let job = run_one_batch(
        &store,
        &job_id,
        failing_generator,
        evaluator,
        availability,
        pricing,
    )
    .await
    .unwrap();

    assert_eq!(job.status, JobStatus::Running, "one degraded batch must not fail the job");
    assert_eq!(job.batch_num, batch_before + 1, "batch counter still consumes a slot");

    // Batch 4 is still schedulable — the job is not stuck.
    let candidates = domains("sunrisebakeryrecovered", "com", 10);
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
    assert_eq!(job.batch_num, batch_before + 2);
}
