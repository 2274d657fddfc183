// Job Domain Model

use serde::{Deserialize, Serialize};

/// Job ID (opaque string, typically a UUID v4)
pub type JobId = String;

/// Client ID (opaque string identifying the caller on whose behalf a job runs)
pub type ClientId = String;

/// Job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Running,
    Complete,
    NeedsFollowup,
    Failed,
    Cancelled,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "PENDING"),
            JobStatus::Running => write!(f, "RUNNING"),
            JobStatus::Complete => write!(f, "COMPLETE"),
            JobStatus::NeedsFollowup => write!(f, "NEEDS_FOLLOWUP"),
            JobStatus::Failed => write!(f, "FAILED"),
            JobStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Which generative-model backend drives a pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Claude,
    Deepseek,
    Kimi,
    Cloudflare,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Claude => write!(f, "claude"),
            ProviderKind::Deepseek => write!(f, "deepseek"),
            ProviderKind::Kimi => write!(f, "kimi"),
            ProviderKind::Cloudflare => write!(f, "cloudflare"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = crate::domain::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claude" => Ok(ProviderKind::Claude),
            "deepseek" => Ok(ProviderKind::Deepseek),
            "kimi" => Ok(ProviderKind::Kimi),
            "cloudflare" => Ok(ProviderKind::Cloudflare),
            other => Err(crate::domain::error::DomainError::ValidationError(format!(
                "unknown provider: {other}"
            ))),
        }
    }
}

/// The questionnaire answers supplied at job creation. Immutable for the life of the job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResponses {
    pub business_name: String,
    pub tld_preferences: Vec<String>,
    pub vibe: String,
    pub domain_idea: Option<String>,
    pub keywords: Option<String>,
    pub client_email: Option<String>,
}

/// Answers supplied when resuming a job out of `NeedsFollowup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowupResponses {
    pub direction: String,
    pub length: String,
    pub keywords: String,
}

/// Job Entity — a singleton unit of search state keyed by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub client_id: ClientId,
    pub status: JobStatus,
    pub batch_num: i64,

    pub quiz_responses: QuizResponses,
    pub followup_responses: Option<FollowupResponses>,

    pub driver_provider: Option<ProviderKind>,
    pub swarm_provider: Option<ProviderKind>,

    pub total_input_tokens: i64,
    pub total_output_tokens: i64,

    pub created_at: i64,
    pub updated_at: i64,
    pub error: Option<String>,

    /// Epoch-millisecond timestamp of the next armed wake-up, or `None` if no timer is armed.
    pub wake_at: Option<i64>,
}

impl Job {
    /// Create a new job in `Pending`, to be immediately transitioned to `Running` by `start`.
    pub fn new(
        id: impl Into<String>,
        client_id: impl Into<String>,
        created_at: i64,
        quiz_responses: QuizResponses,
        driver_provider: Option<ProviderKind>,
        swarm_provider: Option<ProviderKind>,
    ) -> Self {
        Self {
            id: id.into(),
            client_id: client_id.into(),
            status: JobStatus::Pending,
            batch_num: 0,
            quiz_responses,
            followup_responses: None,
            driver_provider,
            swarm_provider,
            total_input_tokens: 0,
            total_output_tokens: 0,
            created_at,
            updated_at: created_at,
            error: None,
            wake_at: None,
        }
    }

    /// `Pending` -> `Running`, arming an immediate wake-up.
    pub fn start(&mut self, now_millis: i64) -> crate::domain::error::Result<()> {
        if self.status != JobStatus::Pending {
            return Err(crate::domain::error::DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: JobStatus::Running.to_string(),
            });
        }
        self.status = JobStatus::Running;
        self.updated_at = now_millis;
        self.wake_at = Some(now_millis);
        Ok(())
    }

    /// `Running` -> `Complete`. Clears the timer.
    pub fn complete(&mut self, now_millis: i64) -> crate::domain::error::Result<()> {
        if self.status != JobStatus::Running {
            return Err(crate::domain::error::DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: JobStatus::Complete.to_string(),
            });
        }
        self.status = JobStatus::Complete;
        self.updated_at = now_millis;
        self.wake_at = None;
        Ok(())
    }

    /// `Running` -> `NeedsFollowup`. Clears the timer until `resume` is called.
    pub fn request_followup(&mut self, now_millis: i64) -> crate::domain::error::Result<()> {
        if self.status != JobStatus::Running {
            return Err(crate::domain::error::DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: JobStatus::NeedsFollowup.to_string(),
            });
        }
        self.status = JobStatus::NeedsFollowup;
        self.updated_at = now_millis;
        self.wake_at = None;
        Ok(())
    }

    /// `NeedsFollowup` -> `Running`, recording the answers and arming an immediate wake-up.
    pub fn resume(
        &mut self,
        followup_responses: FollowupResponses,
        now_millis: i64,
    ) -> crate::domain::error::Result<()> {
        if self.status != JobStatus::NeedsFollowup {
            return Err(crate::domain::error::DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: JobStatus::Running.to_string(),
            });
        }
        self.followup_responses = Some(followup_responses);
        self.status = JobStatus::Running;
        self.updated_at = now_millis;
        self.wake_at = Some(now_millis);
        Ok(())
    }

    /// `Pending` or `Running` -> `Cancelled`. Terminal; a later timer firing is a no-op.
    pub fn cancel(&mut self, now_millis: i64) -> crate::domain::error::Result<()> {
        if !matches!(self.status, JobStatus::Pending | JobStatus::Running) {
            return Err(crate::domain::error::DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: JobStatus::Cancelled.to_string(),
            });
        }
        self.status = JobStatus::Cancelled;
        self.updated_at = now_millis;
        self.wake_at = None;
        Ok(())
    }

    /// Any state -> `Failed`. Never rejected: a fatal pipeline fault always wins.
    pub fn fail(&mut self, error: impl Into<String>, now_millis: i64) {
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        self.updated_at = now_millis;
        self.wake_at = None;
    }

    /// Re-arm the timer for the next batch, `delay_ms` from now.
    pub fn rearm(&mut self, now_millis: i64, delay_ms: i64) {
        self.wake_at = Some(now_millis + delay_ms);
        self.updated_at = now_millis;
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            JobStatus::Complete | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    pub fn add_tokens(&mut self, input_tokens: i64, output_tokens: i64) {
        self.total_input_tokens += input_tokens;
        self.total_output_tokens += output_tokens;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> QuizResponses {
        QuizResponses {
            business_name: "Sunrise Bakery".to_string(),
            tld_preferences: vec!["com".to_string(), "co".to_string()],
            vibe: "creative".to_string(),
            domain_idea: None,
            keywords: None,
            client_email: None,
        }
    }

    #[test]
    fn new_job_is_pending() {
        let job = Job::new("job-1", "client-1", 1000, quiz(), None, None);
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.batch_num, 0);
        assert!(job.wake_at.is_none());
    }

    #[test]
    fn start_arms_immediate_timer() {
        let mut job = Job::new("job-1", "client-1", 1000, quiz(), None, None);
        job.start(1000).unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.wake_at, Some(1000));
    }

    #[test]
    fn cannot_start_twice() {
        let mut job = Job::new("job-1", "client-1", 1000, quiz(), None, None);
        job.start(1000).unwrap();
        assert!(job.start(2000).is_err());
    }

    #[test]
    fn cannot_complete_without_running() {
        let mut job = Job::new("job-1", "client-1", 1000, quiz(), None, None);
        assert!(job.complete(2000).is_err());
    }

    #[test]
    fn followup_round_trip() {
        let mut job = Job::new("job-1", "client-1", 1000, quiz(), None, None);
        job.start(1000).unwrap();
        job.request_followup(2000).unwrap();
        assert_eq!(job.status, JobStatus::NeedsFollowup);
        assert!(job.wake_at.is_none());

        job.resume(
            FollowupResponses {
                direction: "different_tld".to_string(),
                length: "longer_ok".to_string(),
                keywords: "local".to_string(),
            },
            3000,
        )
        .unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.wake_at, Some(3000));
    }

    #[test]
    fn cancel_from_running_is_terminal() {
        let mut job = Job::new("job-1", "client-1", 1000, quiz(), None, None);
        job.start(1000).unwrap();
        job.cancel(2000).unwrap();
        assert!(job.is_terminal());
        assert!(job.cancel(3000).is_err());
    }

    #[test]
    fn fail_always_succeeds() {
        let mut job = Job::new("job-1", "client-1", 1000, quiz(), None, None);
        job.fail("registry lookup crashed", 2000);
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("registry lookup crashed"));
    }

    #[test]
    fn tokens_never_decrease() {
        let mut job = Job::new("job-1", "client-1", 1000, quiz(), None, None);
        job.add_tokens(100, 50);
        job.add_tokens(200, 80);
        assert_eq!(job.total_input_tokens, 300);
        assert_eq!(job.total_output_tokens, 130);
    }
}
