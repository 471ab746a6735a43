//! App state: store, caches, flight tracker, evaluator, config.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::warn;
use uuid::Uuid;

use taskeval_cache::{CacheConfig, EvaluationCache, TtlCache};
use taskeval_core::constants::DEFAULT_STATS_RATE_PER_MINUTE;
use taskeval_core::traits::Evaluator;
use taskeval_evaluator::{LlmEvaluator, OfflineEvaluator};
use taskeval_flight::{FlightConfig, FlightTracker};
use taskeval_store::MemoryStore;

use crate::dto::StatsResponse;

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub cache: CacheConfig,
    pub flight: FlightConfig,
    pub stats_rate_per_minute: u32,
    pub offline: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            flight: FlightConfig::default(),
            stats_rate_per_minute: DEFAULT_STATS_RATE_PER_MINUTE,
            offline: true,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        if let Ok(max_entries) = std::env::var("TASKEVAL_CACHE_MAX_ENTRIES") {
            if let Ok(n) = max_entries.parse() {
                config.cache.max_entries = n;
            }
        }
        if let Ok(ttl_ms) = std::env::var("TASKEVAL_CACHE_TTL_MS") {
            if let Ok(n) = ttl_ms.parse() {
                config.cache.ttl_ms = n;
            }
        }
        if let Ok(timeout_ms) = std::env::var("TASKEVAL_TIMEOUT_MS") {
            if let Ok(n) = timeout_ms.parse() {
                config.flight.timeout_ms = n;
            }
        }
        if let Ok(rate) = std::env::var("TASKEVAL_STATS_RATE") {
            if let Ok(n) = rate.parse() {
                config.stats_rate_per_minute = n;
            }
        }

        // Live evaluation requires a key; everything else stays local
        config.offline = std::env::var("TASKEVAL_API_KEY")
            .map(|k| k.is_empty())
            .unwrap_or(true);

        config
    }
}

pub struct AppState {
    pub config: ApiConfig,
    pub store: MemoryStore,
    pub cache: EvaluationCache,
    pub stats_cache: TtlCache<StatsResponse>,
    pub tracker: FlightTracker,
    pub evaluator: Arc<dyn Evaluator>,
    pub stats_limiter: DefaultKeyedRateLimiter<Uuid>,
}

impl AppState {
    pub fn new(config: ApiConfig) -> Self {
        let evaluator: Arc<dyn Evaluator> = if config.offline {
            Arc::new(OfflineEvaluator::new())
        } else {
            match LlmEvaluator::from_env() {
                Ok(evaluator) => Arc::new(evaluator),
                Err(e) => {
                    warn!(error = %e, "Falling back to the offline evaluator");
                    Arc::new(OfflineEvaluator::new())
                }
            }
        };

        Self::with_evaluator(config, evaluator)
    }

    /// Builds state around an injected evaluator (used by tests and the CLI).
    pub fn with_evaluator(config: ApiConfig, evaluator: Arc<dyn Evaluator>) -> Self {
        let rate = NonZeroU32::new(config.stats_rate_per_minute).unwrap_or(NonZeroU32::MIN);

        Self {
            store: MemoryStore::new(),
            cache: EvaluationCache::with_config(config.cache.clone()),
            stats_cache: TtlCache::with_config(config.cache.clone()),
            tracker: FlightTracker::with_config(config.flight.clone()),
            evaluator,
            stats_limiter: RateLimiter::keyed(Quota::per_minute(rate)),
            config,
        }
    }
}
