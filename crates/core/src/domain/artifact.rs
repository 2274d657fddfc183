// SearchArtifact Domain Model — batch reports, strategy notes, and follow-up quizzes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    BatchReport,
    StrategyNotes,
    FollowupQuiz,
}

impl std::fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactType::BatchReport => write!(f, "batch_report"),
            ArtifactType::StrategyNotes => write!(f, "strategy_notes"),
            ArtifactType::FollowupQuiz => write!(f, "followup_quiz"),
        }
    }
}

impl std::str::FromStr for ArtifactType {
    type Err = crate::domain::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "batch_report" => Ok(ArtifactType::BatchReport),
            "strategy_notes" => Ok(ArtifactType::StrategyNotes),
            "followup_quiz" => Ok(ArtifactType::FollowupQuiz),
            other => Err(crate::domain::error::DomainError::ValidationError(format!(
                "unknown artifact type: {other}"
            ))),
        }
    }
}

/// An opaque text artifact produced while processing a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchArtifact {
    pub batch_num: i64,
    pub artifact_type: ArtifactType,
    pub content: String,
    pub created_at: i64,
}
