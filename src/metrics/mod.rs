//! Cache Metrics System
//!
//! Provides a metrics system for the cache using BTreeMap-based reporting.
//! Counters common to any cache live in [`CoreCacheMetrics`]; the LRU cache
//! extends them with statistics about its open-addressed index.
//!
//! # Why BTreeMap over HashMap?
//!
//! BTreeMap is used instead of HashMap for several reasons:
//! - **Deterministic ordering**: Metrics always appear in consistent order
//! - **Reproducible output**: Essential for testing and simulation comparisons
//! - **Stable serialization**: CSV exports have predictable key ordering
//!
//! The performance difference (O(log n) vs O(1)) is negligible with ~15 metric keys.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

pub mod lru;

pub use lru::LruCacheMetrics;

/// Common metrics tracked by the cache
#[derive(Debug, Default, Clone)]
pub struct CoreCacheMetrics {
    /// Total number of lookups (gets) made to the cache
    pub requests: u64,

    /// Number of lookups that found their key
    pub cache_hits: u64,

    /// Number of new keys linked into the cache
    pub insertions: u64,

    /// Number of puts that overwrote the value of a present key
    pub updates: u64,

    /// Number of entries evicted due to capacity constraints
    pub evictions: u64,

    /// Number of entries removed explicitly
    pub removals: u64,
}

impl CoreCacheMetrics {
    /// Creates a zeroed metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a lookup that found its key
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records a lookup that did not find its key
    ///
    /// Cache misses are calculated as (requests - cache_hits).
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    /// Records a new key being linked into the cache
    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    /// Records an overwrite of a present key
    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    /// Records an eviction of the least recently used entry
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Records an explicit removal
    pub fn record_removal(&mut self) {
        self.removals += 1;
    }

    /// Number of lookups that missed
    pub fn cache_misses(&self) -> u64 {
        self.requests - self.cache_hits
    }

    /// Calculates the cache hit rate
    ///
    /// # Returns
    /// A value between 0.0 and 1.0, or 0.0 if no requests have been made
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Calculates the cache miss rate
    ///
    /// # Returns
    /// A value between 0.0 and 1.0, or 0.0 if no requests have been made
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_misses() as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Convert core metrics to BTreeMap for reporting
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        // Counters
        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert("cache_misses".to_string(), self.cache_misses() as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("removals".to_string(), self.removals as f64);
        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("updates".to_string(), self.updates as f64);

        // Rates (0.0 to 1.0)
        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        if self.insertions > 0 {
            metrics.insert(
                "eviction_rate".to_string(),
                self.evictions as f64 / self.insertions as f64,
            );
        }

        metrics
    }
}

/// Trait for reporting cache metrics
///
/// The trait uses BTreeMap to ensure deterministic ordering of metrics, which is essential
/// for reproducible simulations and consistent test results.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Algorithm name for identification
    fn algorithm_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_metrics_rates() {
        let mut m = CoreCacheMetrics::new();
        assert_eq!(m.hit_rate(), 0.0);
        assert_eq!(m.miss_rate(), 0.0);
        m.record_hit();
        m.record_hit();
        m.record_hit();
        m.record_miss();
        assert_eq!(m.requests, 4);
        assert_eq!(m.cache_misses(), 1);
        assert_eq!(m.hit_rate(), 0.75);
        assert_eq!(m.miss_rate(), 0.25);
    }

    #[test]
    fn test_core_metrics_btreemap() {
        let mut m = CoreCacheMetrics::new();
        m.record_insertion();
        m.record_insertion();
        m.record_eviction();
        m.record_update();
        m.record_removal();
        let map = m.to_btreemap();
        assert_eq!(map.get("insertions"), Some(&2.0));
        assert_eq!(map.get("evictions"), Some(&1.0));
        assert_eq!(map.get("updates"), Some(&1.0));
        assert_eq!(map.get("removals"), Some(&1.0));
        assert_eq!(map.get("eviction_rate"), Some(&0.5));
        let keys: alloc::vec::Vec<_> = map.keys().cloned().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }
}
