//! Allocation Tests
//!
//! All storage is reserved when the cache is built. This binary installs a
//! counting global allocator and checks that a long mixed workload (inserts,
//! evictions, removals, compactions, clears) performs no heap allocation at
//! all once construction has returned.
//!
//! Kept to a single test so no concurrently running test can allocate inside
//! the measured region.

use probe_lru::config::LruCacheConfig;
use probe_lru::{CacheMetrics, LruCache};
use stats_alloc::{Region, StatsAlloc, INSTRUMENTED_SYSTEM};
use std::alloc::System;
use std::hint::black_box;
use std::num::NonZeroUsize;

#[global_allocator]
static GLOBAL: &StatsAlloc<System> = &INSTRUMENTED_SYSTEM;

/// Mixed workload; multiples of 16 cluster on five home slots.
fn churn(cache: &mut LruCache<u64, u64>, steps: u64, mut state: u64) {
    for step in 0..steps {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let key = (state % 200) * 16;
        match state % 7 {
            0 => {
                black_box(cache.remove(&key));
            }
            1..=3 => {
                black_box(cache.get(&key));
            }
            _ => {
                black_box(cache.put(key, step));
            }
        }
        if step % 25_000 == 0 {
            cache.clear();
        }
    }
}

#[test]
fn test_no_allocation_after_construction() {
    let config = LruCacheConfig {
        capacity: NonZeroUsize::new(64).unwrap(),
        table_size: NonZeroUsize::new(80).unwrap(),
    };
    let mut cache: LruCache<u64, u64> = LruCache::init(config, None).unwrap();

    // Warm-up registers every log callsite before measuring.
    churn(&mut cache, 10_000, 0x9E37_79B9_7F4A_7C15);

    let region = Region::new(GLOBAL);
    churn(&mut cache, 100_000, 0x2545_F491_4F6C_DD1D);
    let change = region.change();

    assert_eq!(change.allocations, 0, "allocations: {:?}", change);
    assert_eq!(change.reallocations, 0, "reallocations: {:?}", change);
    assert!(cache.len() <= 64);
    assert!(cache.lru_metrics().probes > 0);
    assert!(cache.metrics()["evictions"] > 0.0);
}
