// Panic isolation for batch execution safety.

use std::panic::catch_unwind;
use tracing::error;

/// Result of a panic-guarded execution
#[derive(Debug)]
pub enum PanicGuardResult<T> {
    /// Execution completed successfully
    Success(T),
    /// Execution panicked
    Panicked(String),
}

/// Execute a closure with panic isolation.
///
/// If the closure panics, the panic is caught and returned as `PanicGuardResult::Panicked`
/// instead of unwinding into the ticker loop.
pub fn execute_guarded<F, T>(f: F) -> PanicGuardResult<T>
where
    F: FnOnce() -> T + std::panic::UnwindSafe,
{
    match catch_unwind(f) {
        Ok(result) => PanicGuardResult::Success(result),
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };

            error!(panic_msg = %panic_msg, "batch execution panicked");
            PanicGuardResult::Panicked(panic_msg)
        }
    }
}
