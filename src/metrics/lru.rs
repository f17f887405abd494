//! LRU Cache Metrics
//!
//! Metrics specific to the LRU cache: on top of the core counters it tracks
//! how far lookups had to probe in the open-addressed index and how often the
//! index was compacted to shed tombstones.

extern crate alloc;

use super::{CacheMetrics, CoreCacheMetrics};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// LRU-specific metrics (extends CoreCacheMetrics)
#[derive(Debug, Default, Clone)]
pub struct LruCacheMetrics {
    /// Core metrics common to all caches
    pub core: CoreCacheMetrics,

    /// Number of index probes performed (one per put, get or get_mut lookup)
    pub probes: u64,

    /// Sum of probe distances past the home slot
    pub total_probe_distance: u64,

    /// Longest probe distance observed
    pub max_probe_distance: u64,

    /// Number of in-place index compactions
    pub compactions: u64,
}

impl LruCacheMetrics {
    /// Creates a zeroed metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one index probe that stepped `distance` slots past home
    pub fn record_probe(&mut self, distance: usize) {
        let distance = distance as u64;
        self.probes += 1;
        self.total_probe_distance += distance;
        self.max_probe_distance = self.max_probe_distance.max(distance);
    }

    /// Mean probe distance, or 0.0 before the first probe
    pub fn avg_probe_distance(&self) -> f64 {
        if self.probes > 0 {
            self.total_probe_distance as f64 / self.probes as f64
        } else {
            0.0
        }
    }

    /// Converts LRU metrics to a BTreeMap for reporting
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();
        metrics.insert("avg_probe_distance".to_string(), self.avg_probe_distance());
        metrics.insert(
            "max_probe_distance".to_string(),
            self.max_probe_distance as f64,
        );
        metrics.insert("probes".to_string(), self.probes as f64);
        metrics.insert("compactions".to_string(), self.compactions as f64);
        metrics
    }
}

impl CacheMetrics for LruCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LRU"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_statistics() {
        let mut m = LruCacheMetrics::new();
        assert_eq!(m.avg_probe_distance(), 0.0);
        m.record_probe(0);
        m.record_probe(3);
        m.record_probe(1);
        assert_eq!(m.probes, 3);
        assert_eq!(m.max_probe_distance, 3);
        assert!((m.avg_probe_distance() - 4.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lru_metrics_include_core() {
        let mut m = LruCacheMetrics::new();
        m.core.record_hit();
        m.compactions = 2;
        let map = m.metrics();
        assert_eq!(map.get("cache_hits"), Some(&1.0));
        assert_eq!(map.get("compactions"), Some(&2.0));
        assert!(map.contains_key("avg_probe_distance"));
        assert_eq!(m.algorithm_name(), "LRU");
    }
}
