// Domain Layer - Pure business logic and entities

pub mod artifact;
pub mod domain_result;
pub mod error;
pub mod job;

// Re-exports
pub use artifact::{ArtifactType, SearchArtifact};
pub use domain_result::{AvailabilityStatus, DomainResult, PricingCategory};
pub use error::DomainError;
pub use job::{ClientId, FollowupResponses, Job, JobId, JobStatus, ProviderKind, QuizResponses};
