//! Bounded TTL cache for taskeval evaluation results.
//!
//! In-memory cache with configurable capacity, time-based expiration, and
//! insertion-order eviction.

mod cache;

pub use cache::{CacheConfig, CacheStats, EvaluationCache, TtlCache};
