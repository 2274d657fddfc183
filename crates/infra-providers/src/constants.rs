// Shared tuning constants for the HTTP-backed provider adapters.

/// Per-request timeout applied to every outbound provider call (generator, evaluator,
/// availability, pricing). A provider that does not answer within this window is treated as
/// a `ProviderError::Timeout`, never as a hard failure of the batch.
pub const PROVIDER_TIMEOUT_MS: u64 = 30_000;

/// Default anthropic-version header sent with every Claude Messages API call.
pub const CLAUDE_API_VERSION: &str = "2023-06-01";
