// Email Notifier Port (§4.2 step 11 "trigger results/followup email if configured")
// The real email rendering/sending surface is out of scope (§1); this port only needs to exist
// so the controller can call it and have failures swallowed (§7 EmailUnavailable).

use crate::domain::JobId;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    ResultsReady,
    FollowupNeeded,
}

#[async_trait]
pub trait EmailNotifier: Send + Sync {
    /// Failures must never mutate job status; callers log and continue (§7 EmailUnavailable).
    async fn notify(
        &self,
        job_id: &JobId,
        recipient: &str,
        kind: NotificationKind,
    ) -> Result<(), String>;
}

/// Logs and does nothing else. The default in deployments that have not configured an email
/// backend.
pub struct NoopEmailNotifier;

#[async_trait]
impl EmailNotifier for NoopEmailNotifier {
    async fn notify(
        &self,
        job_id: &JobId,
        recipient: &str,
        kind: NotificationKind,
    ) -> Result<(), String> {
        tracing::info!(job_id = %job_id, recipient, ?kind, "email notification (noop)");
        Ok(())
    }
}
