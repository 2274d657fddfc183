//! Scenario 4 (spec §8): cancel mid-flight.

mod common;

use brandscout_core::domain::JobStatus;
use brandscout_core::port::JobStore;
use common::{new_controller, new_job_store, quiz};

#[tokio::test]
async fn cancel_before_batch_completes_is_terminal_and_quiet() {
    let store = new_job_store().await;
    let controller = new_controller(store.clone());

    let job_id = "sunrise-bakery-4".to_string();
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

    let job = controller.cancel(&job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Cancelled);
    assert!(job.wake_at.is_none());

    let results_before = store.all_results(&job_id).await.unwrap();
    assert!(results_before.is_empty());

    // A subsequent timer firing observes the terminal state and must be a silent no-op —
    // no new rows, no panics.
    let reloaded = store.find_job(&job_id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, JobStatus::Cancelled);

    let results_after = store.all_results(&job_id).await.unwrap();
    assert!(results_after.is_empty());
}
