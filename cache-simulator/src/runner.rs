//! Simulation runner
//!
//! Replays a stream of operations against `probe_lru::LruCache` and, in
//! lockstep, against the `lru` crate's cache as a reference model. Every
//! result (eviction victims, hit values, removed values) is compared, and
//! the final recency orders must match too. Latency is measured around the
//! probe-lru call only, excluding I/O and the reference model.

use std::io::Write;
use std::num::NonZeroUsize;
use std::time::Instant;

use probe_lru::config::LruCacheConfig;
use probe_lru::{CacheError, LruCache, LruCacheMetrics, ScrambledState};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::input::ScriptError;
use crate::models::{
    Key, LatencyPercentiles, LatencyStats, Op, OpLatencyStats, SimulationConfig,
    SimulationResult, Value,
};

/// Reference implementation used to cross-check results
type ReferenceCache = lru::LruCache<Key, Value>;

/// Errors that stop a simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("cache capacity must be at least 1")]
    ZeroCapacity,

    #[error("cache construction failed: {0}")]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("failed to write trace: {0}")]
    Trace(#[from] std::io::Error),
}

/// Result of a single operation as observed on the cache under test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A put; carries the evicted pair if one was pushed out
    Stored(Option<(Key, Value)>),
    /// A get that found its key
    Hit(Value),
    /// A get that did not
    Miss,
    /// A remove; carries the removed value if the key was present
    Removed(Option<Value>),
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Stored(None) => write!(f, "stored"),
            Outcome::Stored(Some((k, v))) => write!(f, "stored, evicted ({k}:{v})"),
            Outcome::Hit(v) => write!(f, "hit {v}"),
            Outcome::Miss => write!(f, "miss"),
            Outcome::Removed(Some(v)) => write!(f, "removed {v}"),
            Outcome::Removed(None) => write!(f, "not present"),
        }
    }
}

/// Formats entries as `Cache state (MRU to LRU): (k:v) (k:v) ...`
pub fn format_state<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a Key, &'a Value)>,
{
    let mut line = String::from("Cache state (MRU to LRU):");
    for (k, v) in entries {
        line.push_str(&format!(" ({k}:{v})"));
    }
    line
}

/// Wrapper over the hasher variants of the cache under test
enum CacheWrapper {
    Identity(LruCache<Key, Value>),
    Scrambled(LruCache<Key, Value, ScrambledState>),
}

impl CacheWrapper {
    fn apply(&mut self, op: Op) -> Outcome {
        match self {
            CacheWrapper::Identity(cache) => apply_op(cache, op),
            CacheWrapper::Scrambled(cache) => apply_op(cache, op),
        }
    }

    fn state(&self) -> String {
        match self {
            CacheWrapper::Identity(cache) => format_state(cache),
            CacheWrapper::Scrambled(cache) => format_state(cache),
        }
    }

    fn entries(&self) -> Vec<(Key, Value)> {
        match self {
            CacheWrapper::Identity(cache) => cache.iter().map(|(k, v)| (*k, *v)).collect(),
            CacheWrapper::Scrambled(cache) => cache.iter().map(|(k, v)| (*k, *v)).collect(),
        }
    }

    fn len(&self) -> usize {
        match self {
            CacheWrapper::Identity(cache) => cache.len(),
            CacheWrapper::Scrambled(cache) => cache.len(),
        }
    }

    fn table_size(&self) -> usize {
        match self {
            CacheWrapper::Identity(cache) => cache.table_size(),
            CacheWrapper::Scrambled(cache) => cache.table_size(),
        }
    }

    fn metrics(&self) -> &LruCacheMetrics {
        match self {
            CacheWrapper::Identity(cache) => cache.lru_metrics(),
            CacheWrapper::Scrambled(cache) => cache.lru_metrics(),
        }
    }
}

fn apply_op<S: std::hash::BuildHasher>(cache: &mut LruCache<Key, Value, S>, op: Op) -> Outcome {
    match op {
        Op::Put { key, value } => Outcome::Stored(cache.put(key, value)),
        Op::Get { key } => match cache.get(&key) {
            Some(v) => Outcome::Hit(*v),
            None => Outcome::Miss,
        },
        Op::Remove { key } => Outcome::Removed(cache.remove(&key)),
    }
}

fn apply_reference(reference: &mut ReferenceCache, op: Op) -> Outcome {
    match op {
        Op::Put { key, value } => {
            if reference.contains(&key) {
                reference.put(key, value);
                Outcome::Stored(None)
            } else {
                Outcome::Stored(reference.push(key, value))
            }
        }
        Op::Get { key } => match reference.get(&key) {
            Some(v) => Outcome::Hit(*v),
            None => Outcome::Miss,
        },
        Op::Remove { key } => Outcome::Removed(reference.pop(&key)),
    }
}

/// Tracks latency for a single operation type
#[derive(Debug)]
struct OpLatencyTracker {
    /// Total time spent (nanoseconds)
    total_ns: u64,
    /// Number of operations
    count: u64,
    /// Minimum latency (nanoseconds)
    min_ns: u64,
    /// Maximum latency (nanoseconds)
    max_ns: u64,
    /// Sample reservoir for percentile calculation
    samples: Vec<u64>,
    /// Maximum samples to keep
    max_samples: usize,
}

impl OpLatencyTracker {
    fn new() -> Self {
        Self {
            total_ns: 0,
            count: 0,
            min_ns: u64::MAX,
            max_ns: 0,
            samples: Vec::with_capacity(5000),
            max_samples: 5000,
        }
    }

    #[inline]
    fn record(&mut self, latency_ns: u64) {
        self.total_ns += latency_ns;
        self.count += 1;
        self.min_ns = self.min_ns.min(latency_ns);
        self.max_ns = self.max_ns.max(latency_ns);

        // Reservoir sampling for percentiles
        if self.samples.len() < self.max_samples {
            self.samples.push(latency_ns);
        } else {
            let idx = rand::random::<usize>() % (self.count as usize);
            if idx < self.max_samples {
                self.samples[idx] = latency_ns;
            }
        }
    }

    fn percentiles(&mut self) -> LatencyPercentiles {
        if self.samples.is_empty() {
            return LatencyPercentiles::default();
        }

        self.samples.sort_unstable();
        let len = self.samples.len();

        LatencyPercentiles {
            p50_ns: self.samples[len * 50 / 100],
            p90_ns: self.samples[len * 90 / 100],
            p99_ns: self.samples[len * 99 / 100],
        }
    }

    fn finalize(&mut self) -> OpLatencyStats {
        OpLatencyStats {
            total_ns: self.total_ns,
            count: self.count,
            min_ns: if self.min_ns == u64::MAX {
                0
            } else {
                self.min_ns
            },
            max_ns: self.max_ns,
            percentiles: self.percentiles(),
        }
    }
}

/// Tracks latency of cache operations excluding I/O time
#[derive(Debug)]
struct LatencyTracker {
    get_tracker: OpLatencyTracker,
    put_tracker: OpLatencyTracker,
    remove_tracker: OpLatencyTracker,
}

impl LatencyTracker {
    fn new() -> Self {
        Self {
            get_tracker: OpLatencyTracker::new(),
            put_tracker: OpLatencyTracker::new(),
            remove_tracker: OpLatencyTracker::new(),
        }
    }

    #[inline]
    fn record(&mut self, op: &Op, latency_ns: u64) {
        match op {
            Op::Put { .. } => self.put_tracker.record(latency_ns),
            Op::Get { .. } => self.get_tracker.record(latency_ns),
            Op::Remove { .. } => self.remove_tracker.record(latency_ns),
        }
    }

    fn finalize(&mut self) -> LatencyStats {
        LatencyStats {
            get_stats: self.get_tracker.finalize(),
            put_stats: self.put_tracker.finalize(),
            remove_stats: self.remove_tracker.finalize(),
        }
    }
}

/// Runs operation streams through the cache and the reference model
pub struct SimulationRunner {
    config: SimulationConfig,
}

impl SimulationRunner {
    /// Create a new simulation runner
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    fn build(&self) -> Result<(CacheWrapper, ReferenceCache), SimulationError> {
        let capacity =
            NonZeroUsize::new(self.config.capacity).ok_or(SimulationError::ZeroCapacity)?;
        let mut config = LruCacheConfig::for_capacity(capacity);
        if let Some(table_size) = self.config.table_size.and_then(NonZeroUsize::new) {
            config.table_size = table_size;
        }

        let cache = if self.config.scrambled {
            CacheWrapper::Scrambled(LruCache::init(config, None)?)
        } else {
            CacheWrapper::Identity(LruCache::init(config, None)?)
        };
        debug!(?config, scrambled = self.config.scrambled, "built caches");
        Ok((cache, ReferenceCache::new(capacity)))
    }

    /// Run the operations and cross-check every result
    pub fn run<I>(&self, ops: I) -> Result<SimulationResult, SimulationError>
    where
        I: IntoIterator<Item = Result<Op, ScriptError>>,
    {
        self.run_traced(ops, None)
    }

    /// Like [`run`](Self::run), writing each operation, its outcome and the
    /// resulting cache state to `trace`
    pub fn run_traced<I>(
        &self,
        ops: I,
        mut trace: Option<&mut dyn Write>,
    ) -> Result<SimulationResult, SimulationError>
    where
        I: IntoIterator<Item = Result<Op, ScriptError>>,
    {
        let (mut cache, mut reference) = self.build()?;
        let mut latency = LatencyTracker::new();
        let mut result = SimulationResult {
            capacity: self.config.capacity,
            table_size: cache.table_size(),
            ..Default::default()
        };
        let start = Instant::now();

        for op in ops {
            let op = op?;

            let op_start = Instant::now();
            let outcome = cache.apply(op);
            latency.record(&op, op_start.elapsed().as_nanos() as u64);

            let expected = apply_reference(&mut reference, op);
            result.total_ops += 1;
            match outcome {
                Outcome::Hit(_) => result.hits += 1,
                Outcome::Miss => result.misses += 1,
                Outcome::Stored(Some(_)) => result.evictions += 1,
                Outcome::Stored(None) | Outcome::Removed(_) => {}
            }
            if outcome != expected {
                result.divergences += 1;
                warn!(
                    step = result.total_ops,
                    %op,
                    %outcome,
                    %expected,
                    "result differs from reference cache"
                );
            }

            if let Some(out) = trace.as_mut() {
                writeln!(out, "{op} -> {outcome}")?;
                writeln!(out, "{}", cache.state())?;
            }
        }

        let theirs: Vec<(Key, Value)> = reference.iter().map(|(k, v)| (*k, *v)).collect();
        if cache.entries() != theirs {
            result.divergences += 1;
            warn!("final recency order differs from reference cache");
        }

        let metrics = cache.metrics();
        result.final_len = cache.len();
        result.avg_probe_distance = metrics.avg_probe_distance();
        result.max_probe_distance = metrics.max_probe_distance;
        result.compactions = metrics.compactions;
        result.duration = start.elapsed();
        result.latency = latency.finalize();

        info!(
            ops = result.total_ops,
            hits = result.hits,
            evictions = result.evictions,
            divergences = result.divergences,
            "simulation finished"
        );
        Ok(result)
    }
}

/// Runs the classic walkthrough on a 4-entry cache over 8 slots
pub fn run_demo<W: Write>(out: &mut W) -> Result<(), SimulationError> {
    let config = LruCacheConfig::for_capacity(NonZeroUsize::MIN.saturating_add(3));
    let mut cache: LruCache<Key, Value> = LruCache::init(config, None)?;

    for k in 1..=4 {
        cache.put(k, Value::from(k) * 10);
    }
    writeln!(out, "{}", format_state(&cache))?;

    cache.get(&2);
    writeln!(out, "{}", format_state(&cache))?;

    // Evicts key 1
    cache.put(5, 50);
    writeln!(out, "{}", format_state(&cache))?;

    match cache.get(&3) {
        Some(v) => writeln!(out, "Get key 3: {v}")?,
        None => writeln!(out, "Get key 3: miss")?,
    }
    writeln!(out, "{}", format_state(&cache))?;

    match cache.get(&1) {
        Some(v) => writeln!(out, "Get key 1: {v}")?,
        None => writeln!(out, "Get key 1: miss")?,
    }
    Ok(())
}
