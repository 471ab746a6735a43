//! In-memory TTL cache for evaluation results.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use taskeval_core::constants::{DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL_MS};
use taskeval_core::types::Evaluation;

/// Cache entry with its insertion time.
#[derive(Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() > ttl
    }
}

/// Cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries before eviction
    pub max_entries: usize,
    /// Entry lifetime in milliseconds
    pub ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            ttl_ms: DEFAULT_CACHE_TTL_MS,
        }
    }
}

impl CacheConfig {
    fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

/// In-memory cache with bounded capacity and per-entry expiry.
///
/// Keys are opaque strings; values are immutable snapshots cloned out on
/// read. Expired entries are removed lazily, on the read that finds them
/// or during the prune that precedes every insert — there is no
/// background sweeper. When the cache is full the entry with the earliest
/// insertion time is evicted; reads never reorder entries, so a hot key
/// is not protected from eviction (insertion-order, not LRU).
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    config: CacheConfig,
}

/// Cache of evaluation results keyed by task id.
pub type EvaluationCache = TtlCache<Evaluation>;

impl<V: Clone> TtlCache<V> {
    /// Creates a new cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache with custom configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(config.max_entries)),
            config,
        }
    }

    /// Gets a cached value by key.
    ///
    /// An entry past its TTL is deleted here and reported as a miss.
    /// Reading does not refresh the entry's age.
    pub fn get(&self, key: &str) -> Option<V> {
        let ttl = self.config.ttl();
        let mut entries = self.entries.write();

        match entries.get(key) {
            Some(e) if !e.is_expired(ttl) => return Some(e.value.clone()),
            Some(_) => {}
            None => return None,
        }

        entries.remove(key);
        None
    }

    /// Inserts or replaces an entry. Never fails.
    ///
    /// Expired entries are pruned first; if the cache is still at
    /// capacity, the earliest-inserted survivor is evicted. Replacing an
    /// existing key resets its insertion time.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        let ttl = self.config.ttl();
        let mut entries = self.entries.write();

        entries.retain(|_, e| !e.is_expired(ttl));

        if entries.len() >= self.config.max_entries {
            if let Some(oldest_key) = entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest_key);
            }
        }

        entries.insert(
            key.into(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Removes a cached entry.
    pub fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }

    /// Clears all cached entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Removes all expired entries.
    pub fn prune_expired(&self) {
        let ttl = self.config.ttl();
        self.entries.write().retain(|_, e| !e.is_expired(ttl));
    }

    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let ttl = self.config.ttl();
        let entries = self.entries.read();
        let expired = entries.values().filter(|e| e.is_expired(ttl)).count();
        CacheStats {
            total_entries: entries.len(),
            expired_entries: expired,
            valid_entries: entries.len().saturating_sub(expired),
            capacity: self.config.max_entries,
        }
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Clone, Debug)]
pub struct CacheStats {
    /// Entries currently stored, expired ones included
    pub total_entries: usize,
    /// Stored entries past their TTL, awaiting lazy removal
    pub expired_entries: usize,
    /// Stored entries still servable
    pub valid_entries: usize,
    /// Configured capacity
    pub capacity: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn small_cache(max_entries: usize, ttl_ms: u64) -> TtlCache<String> {
        TtlCache::with_config(CacheConfig { max_entries, ttl_ms })
    }

    #[test]
    fn test_cache_insert_get() {
        let cache: TtlCache<String> = TtlCache::new();
        cache.insert("task-1", "report".to_string());
        assert_eq!(cache.get("task-1").as_deref(), Some("report"));
    }

    #[test]
    fn test_cache_miss() {
        let cache: TtlCache<String> = TtlCache::new();
        assert!(cache.get("nonexistent").is_none());
    }

    #[test]
    fn test_cache_remove() {
        let cache: TtlCache<String> = TtlCache::new();
        cache.insert("task-1", "report".to_string());
        cache.remove("task-1");
        assert!(cache.get("task-1").is_none());
    }

    #[test]
    fn test_cache_clear() {
        let cache: TtlCache<String> = TtlCache::new();
        cache.insert("a", "1".to_string());
        cache.insert("b", "2".to_string());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_ttl_expiration() {
        let cache = small_cache(100, 10);
        cache.insert("task-1", "report".to_string());
        std::thread::sleep(Duration::from_millis(50));
        assert!(cache.get("task-1").is_none());
    }

    #[test]
    fn test_expired_read_removes_entry() {
        let cache = small_cache(100, 10);
        cache.insert("task-1", "report".to_string());
        std::thread::sleep(Duration::from_millis(50));

        assert_eq!(cache.len(), 1);
        assert!(cache.get("task-1").is_none());
        // The miss physically deleted the entry
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_capacity_eviction_is_insertion_ordered() {
        let cache = small_cache(2, 60_000);
        cache.insert("k1", "1".to_string());
        cache.insert("k2", "2".to_string());
        cache.insert("k3", "3".to_string());

        assert_eq!(cache.len(), 2);
        // Earliest-inserted entry goes first
        assert!(cache.get("k1").is_none());
        assert!(cache.get("k2").is_some());
        assert!(cache.get("k3").is_some());
    }

    #[test]
    fn test_reads_do_not_protect_from_eviction() {
        let cache = small_cache(2, 60_000);
        cache.insert("hot", "1".to_string());
        cache.insert("cold", "2".to_string());

        for _ in 0..10 {
            assert!(cache.get("hot").is_some());
        }

        cache.insert("new", "3".to_string());
        // "hot" was inserted first, so it is evicted despite the reads
        assert!(cache.get("hot").is_none());
        assert!(cache.get("cold").is_some());
    }

    #[test]
    fn test_replacement_resets_age() {
        let cache = small_cache(100, 120);
        cache.insert("k", "v1".to_string());
        std::thread::sleep(Duration::from_millis(80));

        cache.insert("k", "v2".to_string());
        std::thread::sleep(Duration::from_millis(80));

        // 160ms after the first insert but only 80ms after the replacement
        assert_eq!(cache.get("k").as_deref(), Some("v2"));
    }

    #[test]
    fn test_replacement_resets_eviction_order() {
        let cache = small_cache(2, 60_000);
        cache.insert("a", "1".to_string());
        cache.insert("b", "2".to_string());
        cache.insert("a", "1-again".to_string());

        cache.insert("c", "3".to_string());
        // "b" now holds the earliest insertion time
        assert!(cache.get("b").is_none());
        assert_eq!(cache.get("a").as_deref(), Some("1-again"));
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_insert_prunes_expired_before_evicting() {
        let cache = small_cache(2, 10);
        cache.insert("a", "1".to_string());
        cache.insert("b", "2".to_string());
        std::thread::sleep(Duration::from_millis(50));

        cache.insert("c", "3".to_string());
        // Both stale entries were pruned; no live entry was evicted
        assert_eq!(cache.len(), 1);
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_empty_key_is_a_valid_key() {
        let cache: TtlCache<String> = TtlCache::new();
        cache.insert("", "anonymous".to_string());
        assert_eq!(cache.get("").as_deref(), Some("anonymous"));
    }

    #[test]
    fn test_cache_stats() {
        let cache = small_cache(10, 60_000);
        cache.insert("a", "1".to_string());
        cache.insert("b", "2".to_string());

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.valid_entries, 2);
        assert_eq!(stats.expired_entries, 0);
        assert_eq!(stats.capacity, 10);
    }

    #[test]
    fn test_prune_expired() {
        let cache = small_cache(100, 10);
        cache.insert("a", "1".to_string());
        std::thread::sleep(Duration::from_millis(50));
        cache.insert("b", "2".to_string());

        cache.prune_expired();
        assert_eq!(cache.len(), 1);
        assert!(cache.get("b").is_some());
    }

    proptest! {
        /// However many keys are inserted, in whatever order, the entry
        /// count never exceeds the configured capacity.
        #[test]
        fn prop_size_never_exceeds_capacity(keys in prop::collection::vec("[a-z0-9]{1,8}", 0..200)) {
            let cache = small_cache(5, 60_000);
            for (i, key) in keys.iter().enumerate() {
                cache.insert(key.clone(), i.to_string());
                prop_assert!(cache.len() <= 5);
            }
        }
    }
}
