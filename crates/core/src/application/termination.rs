// Termination decision (§4.2 step 11) — what the controller does after a batch returns.

use crate::application::constants::{BATCH_REARM_DELAY_MS, GOOD_RESULT_SCORE_THRESHOLD};
use crate::domain::{AvailabilityStatus, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationDecision {
    /// Re-arm the timer and run another batch after `BATCH_REARM_DELAY_MS`.
    Continue,
    /// `good_count >= target`.
    Complete,
    /// `batch_num >= max_batches` without reaching the target.
    NeedsFollowup,
}

pub fn good_result_count(results: &[DomainResult]) -> usize {
    results
        .iter()
        .filter(|r| r.status == AvailabilityStatus::Available && r.score >= GOOD_RESULT_SCORE_THRESHOLD)
        .count()
}

pub fn decide(
    results: &[DomainResult],
    target_count: i64,
    batch_num: i64,
    max_batches: i64,
) -> TerminationDecision {
    let good = good_result_count(results) as i64;
    if good >= target_count {
        TerminationDecision::Complete
    } else if batch_num >= max_batches {
        TerminationDecision::NeedsFollowup
    } else {
        TerminationDecision::Continue
    }
}

pub fn rearm_delay_ms() -> i64 {
    BATCH_REARM_DELAY_MS
}
