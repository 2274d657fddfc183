//! Brandscout SDK - Rust Client Library
//!
//! Provides a convenient client for interacting with the brandscout daemon.
//!
//! # Example
//!
//! ```no_run
//! use brandscout_sdk::{BrandscoutClient, QuizResponses, RegistrySearchRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BrandscoutClient::connect("http://127.0.0.1:8177").await?;
//!
//!     let handle = client
//!         .registry_search(RegistrySearchRequest {
//!             client_id: "example".to_string(),
//!             quiz_responses: QuizResponses {
//!                 business_name: "Acme Robotics".to_string(),
//!                 tld_preferences: vec!["com".to_string(), "io".to_string()],
//!                 vibe: "playful".to_string(),
//!                 domain_idea: None,
//!                 keywords: None,
//!                 client_email: None,
//!             },
//!             driver_provider: None,
//!             swarm_provider: None,
//!         })
//!         .await?;
//!
//!     println!("Job started: {}", handle.job_id);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::BrandscoutClient;
pub use error::{Result, SdkError};
pub use types::{
    FollowupResponses, JobHandle, JobIdRequest, JobIndexRow, QuizResponses, RankedDomain,
    RegistryListRequest, RegistryRecentRequest, RegistrySearchRequest, ResultsSnapshot,
    ResumeRequest, SearchArtifact, StartRequest, StatusSnapshot, StreamSnapshot,
};
