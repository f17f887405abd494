// Data models for cache simulation

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Cache key type used by scripts
pub type Key = u32;

/// Cache value type used by scripts
pub type Value = i64;

/// A single scripted cache operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Insert or update a key
    Put { key: Key, value: Value },
    /// Look a key up, refreshing it on a hit
    Get { key: Key },
    /// Remove a key
    Remove { key: Key },
}

impl Op {
    pub fn key(&self) -> Key {
        match *self {
            Op::Put { key, .. } | Op::Get { key } | Op::Remove { key } => key,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Put { key, value } => write!(f, "put,{key},{value}"),
            Op::Get { key } => write!(f, "get,{key}"),
            Op::Remove { key } => write!(f, "remove,{key}"),
        }
    }
}

/// Configuration for a simulation run
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    /// Cache capacity in number of entries
    pub capacity: usize,
    /// Number of index slots; `None` uses twice the capacity
    pub table_size: Option<usize>,
    /// Use the scrambling hasher instead of `key mod table_size`
    pub scrambled: bool,
}

/// Results of a simulation run
#[derive(Debug, Default, Clone)]
pub struct SimulationResult {
    /// Cache capacity used
    pub capacity: usize,
    /// Slot table size used
    pub table_size: usize,
    /// Total number of operations processed
    pub total_ops: usize,
    /// Number of get operations that hit
    pub hits: usize,
    /// Number of get operations that missed
    pub misses: usize,
    /// Entries evicted on insert
    pub evictions: usize,
    /// Operations whose outcome differed from the reference cache
    pub divergences: usize,
    /// Entries live at the end of the run
    pub final_len: usize,
    /// Mean index probe distance
    pub avg_probe_distance: f64,
    /// Longest index probe distance
    pub max_probe_distance: u64,
    /// Index compactions performed
    pub compactions: u64,
    /// Wall-clock duration of the run
    pub duration: Duration,
    /// Latency statistics for cache operations (excludes I/O)
    pub latency: LatencyStats,
}

impl SimulationResult {
    /// Hit rate as a percentage of gets
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            (self.hits as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Latency statistics for a single operation type
#[derive(Debug, Clone, Default)]
pub struct OpLatencyStats {
    /// Total time spent (nanoseconds)
    pub total_ns: u64,
    /// Number of operations
    pub count: u64,
    /// Minimum latency (nanoseconds)
    pub min_ns: u64,
    /// Maximum latency (nanoseconds)
    pub max_ns: u64,
    /// Latency percentiles
    pub percentiles: LatencyPercentiles,
}

impl OpLatencyStats {
    /// Calculate average latency in nanoseconds
    pub fn avg_ns(&self) -> f64 {
        if self.count > 0 {
            self.total_ns as f64 / self.count as f64
        } else {
            0.0
        }
    }

    /// Calculate throughput in operations per second
    pub fn ops_per_sec(&self) -> f64 {
        if self.total_ns > 0 {
            (self.count as f64 * 1_000_000_000.0) / self.total_ns as f64
        } else {
            0.0
        }
    }
}

/// Latency statistics for all cache operations
#[derive(Debug, Clone, Default)]
pub struct LatencyStats {
    /// Get operation stats
    pub get_stats: OpLatencyStats,
    /// Put operation stats
    pub put_stats: OpLatencyStats,
    /// Remove operation stats
    pub remove_stats: OpLatencyStats,
}

impl LatencyStats {
    /// Total operations across all kinds
    pub fn count(&self) -> u64 {
        self.get_stats.count + self.put_stats.count + self.remove_stats.count
    }

    /// Calculate average latency in nanoseconds (across all operations)
    pub fn avg_ns(&self) -> f64 {
        let total_ns =
            self.get_stats.total_ns + self.put_stats.total_ns + self.remove_stats.total_ns;
        let count = self.count();
        if count > 0 {
            total_ns as f64 / count as f64
        } else {
            0.0
        }
    }
}

/// Latency percentiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencyPercentiles {
    pub p50_ns: u64,
    pub p90_ns: u64,
    pub p99_ns: u64,
}

/// CSV export row for simulation results
#[derive(Debug, Serialize)]
pub struct CsvResultRow {
    pub capacity: usize,
    pub table_size: usize,
    pub total_ops: usize,
    pub hits: usize,
    pub misses: usize,
    pub hit_rate: f64,
    pub evictions: usize,
    pub divergences: usize,
    pub final_len: usize,
    pub avg_probe_distance: f64,
    pub max_probe_distance: u64,
    pub compactions: u64,
    pub duration_ms: u128,
    pub avg_latency_ns: f64,
    // Get operation stats
    pub get_ops: u64,
    pub get_ops_per_sec: f64,
    pub get_avg_ns: f64,
    pub get_min_ns: u64,
    pub get_max_ns: u64,
    pub get_p50_ns: u64,
    pub get_p99_ns: u64,
    // Put operation stats
    pub put_ops: u64,
    pub put_ops_per_sec: f64,
    pub put_avg_ns: f64,
    pub put_min_ns: u64,
    pub put_max_ns: u64,
    pub put_p50_ns: u64,
    pub put_p99_ns: u64,
    // Remove operation stats
    pub remove_ops: u64,
    pub remove_avg_ns: f64,
    pub remove_p99_ns: u64,
}

impl From<&SimulationResult> for CsvResultRow {
    fn from(result: &SimulationResult) -> Self {
        let get = &result.latency.get_stats;
        let put = &result.latency.put_stats;
        let remove = &result.latency.remove_stats;
        CsvResultRow {
            capacity: result.capacity,
            table_size: result.table_size,
            total_ops: result.total_ops,
            hits: result.hits,
            misses: result.misses,
            hit_rate: result.hit_rate(),
            evictions: result.evictions,
            divergences: result.divergences,
            final_len: result.final_len,
            avg_probe_distance: result.avg_probe_distance,
            max_probe_distance: result.max_probe_distance,
            compactions: result.compactions,
            duration_ms: result.duration.as_millis(),
            avg_latency_ns: result.latency.avg_ns(),
            get_ops: get.count,
            get_ops_per_sec: get.ops_per_sec(),
            get_avg_ns: get.avg_ns(),
            get_min_ns: get.min_ns,
            get_max_ns: get.max_ns,
            get_p50_ns: get.percentiles.p50_ns,
            get_p99_ns: get.percentiles.p99_ns,
            put_ops: put.count,
            put_ops_per_sec: put.ops_per_sec(),
            put_avg_ns: put.avg_ns(),
            put_min_ns: put.min_ns,
            put_max_ns: put.max_ns,
            put_p50_ns: put.percentiles.p50_ns,
            put_p99_ns: put.percentiles.p99_ns,
            remove_ops: remove.count,
            remove_avg_ns: remove.avg_ns(),
            remove_p99_ns: remove.percentiles.p99_ns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_display_matches_script_syntax() {
        assert_eq!(Op::Put { key: 1, value: -1 }.to_string(), "put,1,-1");
        assert_eq!(Op::Get { key: 7 }.to_string(), "get,7");
        assert_eq!(Op::Remove { key: 3 }.to_string(), "remove,3");
        assert_eq!(Op::Remove { key: 3 }.key(), 3);
    }

    #[test]
    fn test_hit_rate() {
        let result = SimulationResult {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert_eq!(result.hit_rate(), 75.0);
        assert_eq!(SimulationResult::default().hit_rate(), 0.0);
    }
}
