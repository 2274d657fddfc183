// Application Layer - Use Cases and Business Logic

pub mod constants;
pub mod controller;
pub mod evaluator_adapter;
pub mod generator_adapter;
pub mod json_scan;
pub mod panic_guard;
pub mod pipeline;
pub mod shutdown;
pub mod termination;

// Re-exports
pub use controller::JobController;
pub use pipeline::{BatchOutcome, BatchPipeline};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use termination::TerminationDecision;
