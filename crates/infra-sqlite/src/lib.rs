// Brandscout Infrastructure - SQLite Adapter
// Implements: JobStore (per-job private store), JobIndex (process-wide registry)

mod connection;
mod job_index_impl;
mod job_store_impl;
mod manager;
mod migration;

pub use connection::create_pool;
pub use job_index_impl::SqliteJobIndex;
pub use job_store_impl::SqliteJobStore;
pub use manager::JobStoreManager;
pub use migration::{run_job_index_migrations, run_job_store_migrations};

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
