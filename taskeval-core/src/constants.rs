//! Service constants for taskeval.
//!
//! Defaults for the cache, the single-flight tracker, and the model client
//! live here so every crate agrees on them. All durations are plain
//! milliseconds; conversion to `Duration` happens at the edges.

// ═══════════════════════════════════════════════════════════════════════════════
// RESULT CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum number of entries the evaluation cache holds before evicting.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 100;

/// Time-to-live for cached evaluation results (5 minutes).
pub const DEFAULT_CACHE_TTL_MS: u64 = 5 * 60 * 1000;

// ═══════════════════════════════════════════════════════════════════════════════
// EVALUATION PROCESSING
// ═══════════════════════════════════════════════════════════════════════════════

/// Wall-clock bound on a single evaluation attempt (30 seconds).
/// Work that has not settled by then is reported as a timeout and the
/// identifier is released for a future attempt.
pub const DEFAULT_PROCESS_TIMEOUT_MS: u64 = 30_000;

// ═══════════════════════════════════════════════════════════════════════════════
// SCORING
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum score a report can carry; model output is clamped into 0..=MAX_SCORE.
pub const MAX_SCORE: u8 = 100;

// ═══════════════════════════════════════════════════════════════════════════════
// TASK LIMITS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum accepted snippet size in bytes (64 KiB).
pub const MAX_CODE_BYTES: usize = 64 * 1024;

/// Maximum task title length in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Maximum language identifier length in characters.
pub const MAX_LANGUAGE_CHARS: usize = 40;

// ═══════════════════════════════════════════════════════════════════════════════
// MODEL CLIENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Default chat-completions endpoint (OpenAI-compatible).
pub const DEFAULT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default model used for evaluations.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Default sampling temperature for the evaluation call.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default completion token budget for the evaluation call.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Default HTTP timeout for the model client, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

// ═══════════════════════════════════════════════════════════════════════════════
// API PAGINATION & LIMITS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default page size for task listings.
pub const DEFAULT_PAGE_LIMIT: u64 = 100;

/// Hard cap on a single listing page.
pub const MAX_PAGE_LIMIT: u64 = 1000;

/// Per-user request budget for the stats endpoint, per minute.
pub const DEFAULT_STATS_RATE_PER_MINUTE: u32 = 60;
