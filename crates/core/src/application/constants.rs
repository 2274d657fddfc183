// Pipeline constants (no magic values)

/// Batch budget before the controller forces a follow-up (§2, §4.2, §6).
pub const DEFAULT_MAX_BATCHES: i64 = 6;

/// Target number of good results before the controller marks a job complete (§4.2).
pub const DEFAULT_TARGET_RESULTS: i64 = 25;

/// Admission threshold into the availability check (§4.2 step 6, §9). Independent of
/// `GOOD_RESULT_SCORE_THRESHOLD` below — the two must never be conflated.
pub const AVAILABILITY_ADMISSION_SCORE_THRESHOLD: f64 = 0.4;

/// Threshold for counting a result as "good" toward termination (§4.2 step 11, §8 P4).
pub const GOOD_RESULT_SCORE_THRESHOLD: f64 = 0.8;

/// Approximate number of new candidates requested from the generator each batch (§4.2 step 3).
pub const GENERATION_TARGET_COUNT: usize = 50;

/// Evaluator chunk size (§4.2 step 5).
pub const EVALUATOR_CHUNK_SIZE: usize = 10;

/// Evaluator concurrency ceiling (§4.2 step 5, §5).
pub const EVALUATOR_CONCURRENCY: usize = 12;

/// Availability-check worker pool size (§4.2 step 7, §5).
pub const AVAILABILITY_CONCURRENCY: usize = 5;

/// Availability-check per-slot interval in milliseconds (§4.2 step 7, §5).
pub const AVAILABILITY_SLOT_INTERVAL_MS: u64 = 500;

/// Delay before the next batch when more work remains (§4.2 step 11).
pub const BATCH_REARM_DELAY_MS: i64 = 10_000;

/// Maximum results returned by `/results` (§4.1).
pub const MAX_RESULTS_RETURNED: i64 = 50;

/// Generator sampling temperature (§4.3).
pub const GENERATOR_TEMPERATURE: f32 = 0.8;

/// Generator max output tokens (§4.3).
pub const GENERATOR_MAX_TOKENS: u32 = 4096;

/// Evaluator sampling temperature (§4.4).
pub const EVALUATOR_TEMPERATURE: f32 = 0.3;

/// Evaluator max output tokens per chunk call.
pub const EVALUATOR_MAX_TOKENS: u32 = 2048;

/// Pricing category cutoffs, in cents (§4.1, §9 Open Question decision).
pub const PRICING_BUNDLED_MAX_CENTS: i64 = 3000;
pub const PRICING_RECOMMENDED_MAX_CENTS: i64 = 5000;

/// Bound on how much prior-batch history is summarized back into the generation prompt (§9
/// "learning between batches").
pub const CONTEXT_CHECKED_LIMIT: usize = 50;
pub const CONTEXT_AVAILABLE_LIMIT: usize = 20;
pub const CONTEXT_TAKEN_TLD_LIMIT: usize = 3;
