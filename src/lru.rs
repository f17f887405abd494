//! Least Recently Used (LRU) Cache Implementation
//!
//! A fixed-capacity LRU cache for integer keys built from two structures that
//! are always updated together:
//!
//! - an open-addressed, linearly probed **slot index** mapping each key to its
//!   entry, and
//! - an index-linked **recency list** stored in a fixed arena, ordered from
//!   most recently used (head) to least recently used (tail).
//!
//! # Algorithm
//!
//! Every `put` and `get` probes the slot index first, then moves the entry to
//! the head of the recency list. A `put` of a new key that takes the cache
//! past its capacity evicts the tail entry from both structures before it
//! returns. Deleted index slots become tombstones so that probe chains stay
//! intact; the index compacts itself in place when tombstones accumulate.
//!
//! # Performance Characteristics
//!
//! - **Time Complexity** (expected, at load factors ≤ 0.5):
//!   - Get: O(1)
//!   - Put: O(1)
//!   - Remove: O(1)
//!   - Compaction: O(table_size), amortised over at least `table_size / 4` removals
//!
//! - **Space Complexity**:
//!   - O(capacity + table_size), reserved entirely at construction
//!   - No operation allocates after the cache is built
//!
//! # Thread Safety
//!
//! This implementation is not thread-safe and takes `&mut self` even for
//! lookups, since a hit reorders the recency list.

use crate::config::LruCacheConfig;
use crate::entry::{Entry, EntryId};
use crate::error::CacheError;
use crate::index::{Probe, SlotIndex};
use crate::key::{CacheKey, IdentityState};
use crate::list::{Iter, RecencyList};
use crate::metrics::{CacheMetrics, LruCacheMetrics};
use core::fmt;
use core::hash::BuildHasher;
use core::num::NonZeroUsize;
use tracing::{debug, trace};

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;

/// A fixed-capacity Least Recently Used cache.
///
/// Keys are fixed-width integers ([`CacheKey`]); values are any `Copy` type.
/// When a new key is inserted into a full cache, the least recently used
/// entry is evicted and handed back to the caller.
///
/// # Examples
///
/// ```
/// use probe_lru::LruCache;
/// use core::num::NonZeroUsize;
///
/// let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap()).unwrap();
///
/// cache.put(1u32, 10i64);
/// cache.put(2, 20);
///
/// // Accessing items updates their recency
/// assert_eq!(cache.get(&1), Some(&10));
///
/// // Adding beyond capacity evicts the least recently used item
/// assert_eq!(cache.put(3, 30), Some((2, 20)));
/// assert_eq!(cache.get(&2), None);
/// assert_eq!(cache.iter().map(|(k, _)| *k).collect::<Vec<_>>(), [3, 1]);
/// ```
pub struct LruCache<K, V, S = IdentityState> {
    config: LruCacheConfig,
    list: RecencyList<K, V>,
    index: SlotIndex<K, S>,
    metrics: LruCacheMetrics,
}

impl<K: CacheKey, V: Copy> LruCache<K, V> {
    /// Creates a cache holding up to `capacity` entries over a slot table
    /// twice that size, using the identity key hasher.
    pub fn new(capacity: NonZeroUsize) -> Result<Self, CacheError> {
        LruCache::with_hasher(LruCacheConfig::for_capacity(capacity), IdentityState)
    }
}

impl<K: CacheKey, V: Copy, S: BuildHasher + Default> LruCache<K, V, S> {
    /// Creates a cache from a configuration with an optional hasher.
    ///
    /// If `hasher` is `None`, `S::default()` is used.
    ///
    /// # Errors
    ///
    /// - [`CacheError::TableTooSmall`] if `table_size <= capacity`
    /// - [`CacheError::AllocationFailed`] if storage cannot be reserved
    ///
    /// # Examples
    ///
    /// ```
    /// use probe_lru::config::LruCacheConfig;
    /// use probe_lru::LruCache;
    /// use core::num::NonZeroUsize;
    ///
    /// let config = LruCacheConfig {
    ///     capacity: NonZeroUsize::new(4).unwrap(),
    ///     table_size: NonZeroUsize::new(8).unwrap(),
    /// };
    /// let mut cache: LruCache<i32, i32> = LruCache::init(config, None).unwrap();
    /// cache.put(1, 10);
    /// assert_eq!(cache.get(&1), Some(&10));
    /// ```
    pub fn init(config: LruCacheConfig, hasher: Option<S>) -> Result<Self, CacheError> {
        LruCache::with_hasher(config, hasher.unwrap_or_default())
    }
}

impl<K: CacheKey, V: Copy, S: BuildHasher> LruCache<K, V, S> {
    /// Creates a cache from a configuration and hash builder.
    pub fn with_hasher(config: LruCacheConfig, hasher: S) -> Result<Self, CacheError> {
        config.validate()?;
        // One spare entry: a new key is linked before the tail is evicted.
        // Cannot overflow since capacity < table_size.
        let slots = config.capacity.get() + 1;
        let list = RecencyList::with_slots(slots)?;
        let index = SlotIndex::new(config.table_size.get(), slots, hasher)?;
        debug!(
            capacity = config.capacity.get(),
            table_size = config.table_size.get(),
            "created LRU cache"
        );
        Ok(LruCache {
            config,
            list,
            index,
            metrics: LruCacheMetrics::new(),
        })
    }

    /// Maximum number of live entries.
    #[inline]
    pub fn cap(&self) -> NonZeroUsize {
        self.config.capacity
    }

    /// Number of slots in the key index.
    #[inline]
    pub fn table_size(&self) -> usize {
        self.index.table_size()
    }

    /// The configuration the cache was built from.
    #[inline]
    pub fn config(&self) -> &LruCacheConfig {
        &self.config
    }

    /// Number of live entries. Kept as a running count.
    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Number of tombstoned slots currently in the key index.
    #[inline]
    pub fn tombstones(&self) -> usize {
        self.index.tombstones()
    }

    /// Detailed metrics, including index probe statistics.
    #[inline]
    pub fn lru_metrics(&self) -> &LruCacheMetrics {
        &self.metrics
    }

    /// Inserts or updates `key`, making it the most recently used entry.
    ///
    /// Returns the evicted least recently used pair when inserting a new key
    /// pushed the cache past its capacity. Updating a present key never
    /// evicts.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        let Some(probe) = self.index.locate(key) else {
            unreachable!(
                "slot table of {} slots exhausted with {} live keys",
                self.index.table_size(),
                self.index.live()
            );
        };
        self.metrics.record_probe(probe.distance());

        match probe {
            Probe::Found { entry, .. } => {
                self.list.get_mut(entry).value = value;
                self.list.promote_to_front(entry);
                self.metrics.core.record_update();
                None
            }
            Probe::Vacant { slot, .. } => {
                let Some(entry) = self.list.push_front(key, value) else {
                    unreachable!("entry arena exhausted at {} entries", self.list.len());
                };
                self.index.occupy(slot, key, entry);
                self.metrics.core.record_insertion();
                if self.list.len() > self.config.capacity.get() {
                    self.evict()
                } else {
                    None
                }
            }
        }
    }

    /// Returns the value for `key` and marks it most recently used.
    ///
    /// A miss is `None`; there is no sentinel value.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self.lookup(*key) {
            Some(entry) => {
                self.list.promote_to_front(entry);
                self.metrics.core.record_hit();
                Some(self.list.get(entry).value())
            }
            None => {
                self.metrics.core.record_miss();
                None
            }
        }
    }

    /// Like [`get`](Self::get) but returns a mutable reference.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.lookup(*key) {
            Some(entry) => {
                self.list.promote_to_front(entry);
                self.metrics.core.record_hit();
                Some(&mut self.list.get_mut(entry).value)
            }
            None => {
                self.metrics.core.record_miss();
                None
            }
        }
    }

    /// Returns the value for `key` without touching the recency order.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.find(*key).map(|entry| self.list.get(entry).value())
    }

    /// Returns the entry for `key`, with its recency links, without touching
    /// the recency order.
    pub fn peek_entry(&self, key: &K) -> Option<&Entry<K, V>> {
        self.find(*key).map(|entry| self.list.get(entry))
    }

    /// Whether `key` is cached. Does not touch the recency order.
    pub fn contains(&self, key: &K) -> bool {
        self.find(*key).is_some()
    }

    /// The entry that the next eviction would remove.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        let entry = self.list.get(self.list.tail()?);
        Some((entry.key(), entry.value()))
    }

    /// The most recently used entry.
    pub fn peek_mru(&self) -> Option<(&K, &V)> {
        let entry = self.list.get(self.list.head()?);
        Some((entry.key(), entry.value()))
    }

    /// Removes `key` from the cache and returns its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let entry = self.index.remove(*key)?;
        let (_, value) = self.list.remove(entry);
        self.metrics.core.record_removal();
        self.metrics.compactions = self.index.compactions();
        trace!(key = ?key, "removed entry");
        Some(value)
    }

    /// Removes every entry. Reserved storage is kept for reuse.
    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    /// Iterates over the entries from most to least recently used.
    ///
    /// Iteration does not change the recency order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.list.iter()
    }

    /// Probes for `key`, recording the probe distance.
    fn lookup(&mut self, key: K) -> Option<EntryId> {
        let probe = self.index.locate(key)?;
        self.metrics.record_probe(probe.distance());
        match probe {
            Probe::Found { entry, .. } => Some(entry),
            Probe::Vacant { .. } => None,
        }
    }

    fn find(&self, key: K) -> Option<EntryId> {
        match self.index.locate(key)? {
            Probe::Found { entry, .. } => Some(entry),
            Probe::Vacant { .. } => None,
        }
    }

    fn evict(&mut self) -> Option<(K, V)> {
        let tail = self.list.tail()?;
        let (key, value) = self.list.evict_tail()?;
        let removed = self.index.remove(key);
        debug_assert_eq!(removed, Some(tail), "index and list disagree on {key:?}");
        self.metrics.core.record_eviction();
        self.metrics.compactions = self.index.compactions();
        trace!(key = ?key, "evicted least recently used entry");
        Some((key, value))
    }

    /// Checks that the index and the recency list describe the same entries.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        self.list.check_links();
        self.index.check_consistency();
        assert_eq!(self.list.len(), self.index.live());
        assert!(self.list.len() <= self.config.capacity.get());
        for (key, _) in self.list.iter() {
            let entry = self.find(*key);
            assert!(entry.is_some(), "key {:?} in list but not in index", key);
            if let Some(entry) = entry {
                assert_eq!(self.list.get(entry).key(), key);
            }
        }
    }
}

impl<'a, K: CacheKey, V: Copy, S: BuildHasher> IntoIterator for &'a LruCache<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> fmt::Debug for LruCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("config", &self.config)
            .field("list", &self.list)
            .field("index", &self.index)
            .finish()
    }
}

impl<K: CacheKey, V: Copy, S: BuildHasher> CacheMetrics for LruCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics.metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.metrics.algorithm_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn make_lru(cap: usize, table_size: usize) -> LruCache<u32, i64> {
        let config = LruCacheConfig {
            capacity: NonZeroUsize::new(cap).unwrap(),
            table_size: NonZeroUsize::new(table_size).unwrap(),
        };
        LruCache::init(config, None).unwrap()
    }

    fn order(cache: &LruCache<u32, i64>) -> Vec<u32> {
        cache.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn test_lru_get_put() {
        let mut cache = make_lru(2, 4);
        assert_eq!(cache.put(1, 10), None);
        assert_eq!(cache.put(2, 20), None);
        assert_eq!(cache.get(&1), Some(&10));
        assert_eq!(cache.get(&2), Some(&20));
        assert_eq!(cache.get(&3), None);
        assert_eq!(cache.put(1, 11), None);
        assert_eq!(cache.get(&1), Some(&11));
        assert_eq!(cache.put(3, 30), Some((2, 20)));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&1), Some(&11));
        assert_eq!(cache.get(&3), Some(&30));
        cache.check_invariants();
    }

    #[test]
    fn test_lru_demo_scenario() {
        let mut cache = make_lru(4, 8);
        for k in 1..=4 {
            cache.put(k, i64::from(k) * 10);
        }
        assert_eq!(order(&cache), [4, 3, 2, 1]);

        assert_eq!(cache.get(&2), Some(&20));
        assert_eq!(order(&cache), [2, 4, 3, 1]);

        assert_eq!(cache.put(5, 50), Some((1, 10)));
        assert_eq!(order(&cache), [5, 2, 4, 3]);

        assert_eq!(cache.get(&3), Some(&30));
        assert_eq!(order(&cache), [3, 5, 2, 4]);

        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.len(), 4);
        cache.check_invariants();
    }

    #[test]
    fn test_lru_negative_one_is_a_value() {
        let mut cache: LruCache<i32, i32> = LruCache::new(NonZeroUsize::new(2).unwrap()).unwrap();
        cache.put(7, -1);
        assert_eq!(cache.get(&7), Some(&-1));
        assert_eq!(cache.get(&8), None);
    }

    #[test]
    fn test_lru_update_keeps_count() {
        let mut cache = make_lru(3, 6);
        cache.put(1, 10);
        cache.put(2, 20);
        cache.put(3, 30);
        assert_eq!(cache.put(1, 100), None);
        assert_eq!(cache.len(), 3);
        assert_eq!(order(&cache), [1, 3, 2]);
        assert_eq!(cache.put(4, 40), Some((2, 20)));
        cache.check_invariants();
    }

    #[test]
    fn test_lru_get_mut() {
        let mut cache = make_lru(2, 4);
        cache.put(1, 10);
        cache.put(2, 20);
        if let Some(v) = cache.get_mut(&1) {
            *v = 15;
        }
        assert_eq!(cache.peek(&1), Some(&15));
        assert_eq!(cache.put(3, 30), Some((2, 20)));
        assert!(cache.get_mut(&2).is_none());
    }

    #[test]
    fn test_lru_peek_and_contains_do_not_promote() {
        let mut cache = make_lru(2, 4);
        cache.put(1, 10);
        cache.put(2, 20);
        assert_eq!(cache.peek(&1), Some(&10));
        assert!(cache.contains(&1));
        assert!(!cache.contains(&9));
        assert_eq!(cache.peek_lru(), Some((&1, &10)));
        assert_eq!(cache.peek_mru(), Some((&2, &20)));
        assert_eq!(cache.put(3, 30), Some((1, 10)));
    }

    #[test]
    fn test_lru_peek_entry_exposes_links() {
        let mut cache = make_lru(3, 6);
        cache.put(1, 10);
        cache.put(2, 20);
        cache.put(3, 30);
        let middle = cache.peek_entry(&2).unwrap();
        assert_eq!(*middle.key(), 2);
        assert!(middle.prev().is_some());
        assert!(middle.next().is_some());
        assert!(cache.peek_entry(&3).unwrap().prev().is_none());
        assert!(cache.peek_entry(&1).unwrap().next().is_none());
    }

    #[test]
    fn test_lru_remove() {
        let mut cache = make_lru(2, 4);
        cache.put(1, 10);
        cache.put(2, 20);
        assert_eq!(cache.remove(&1), Some(10));
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.remove(&3), None);
        assert_eq!(cache.put(3, 30), None);
        assert_eq!(cache.get(&2), Some(&20));
        assert_eq!(cache.get(&3), Some(&30));
        cache.check_invariants();
    }

    #[test]
    fn test_lru_eviction_tombstones_evicted_slot() {
        // 1 and 9 share home slot 1; evicting 1 leaves 9 reachable past it.
        let mut cache = make_lru(2, 8);
        cache.put(1, 10);
        cache.put(9, 90);
        assert_eq!(cache.put(2, 20), Some((1, 10)));
        assert_eq!(cache.tombstones(), 1);
        assert!(!cache.contains(&1));
        assert_eq!(cache.peek(&9), Some(&90));
        cache.check_invariants();
    }

    #[test]
    fn test_lru_clear() {
        let mut cache = make_lru(2, 4);
        cache.put(1, 10);
        cache.put(2, 20);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.tombstones(), 0);
        assert!(cache.iter().next().is_none());
        cache.put(3, 30);
        assert_eq!(cache.get(&3), Some(&30));
        cache.check_invariants();
    }

    #[test]
    fn test_lru_colliding_keys_survive_eviction_of_chain_head() {
        // 1, 9, 17 and 25 all hash to slot 1 of an 8-slot table.
        let mut cache = make_lru(3, 8);
        cache.put(1, 10);
        cache.put(9, 90);
        cache.put(17, 170);
        assert_eq!(cache.put(25, 250), Some((1, 10)));
        assert_eq!(cache.tombstones(), 1);
        assert_eq!(cache.get(&9), Some(&90));
        assert_eq!(cache.get(&17), Some(&170));
        assert_eq!(cache.get(&25), Some(&250));
        assert_eq!(cache.get(&1), None);
        cache.check_invariants();
    }

    #[test]
    fn test_lru_colliding_churn_reuses_tombstones() {
        // Every key lands on slot 0; each eviction's tombstone is refilled
        // by the next insertion.
        let mut cache = make_lru(2, 8);
        for k in 0..50u32 {
            cache.put(k * 8, i64::from(k));
            cache.check_invariants();
            assert!(cache.tombstones() <= 1);
        }
        assert_eq!(order(&cache), [49 * 8, 48 * 8]);
    }

    #[test]
    fn test_lru_tombstones_are_compacted() {
        let mut cache = make_lru(4, 8);
        for k in [1, 9, 17, 25] {
            cache.put(k, i64::from(k));
        }
        cache.remove(&1);
        cache.remove(&9);
        assert_eq!(cache.tombstones(), 2);
        assert_eq!(cache.lru_metrics().compactions, 0);
        cache.remove(&17);
        assert_eq!(cache.tombstones(), 0);
        assert_eq!(cache.lru_metrics().compactions, 1);
        assert_eq!(cache.get(&25), Some(&25));
        assert_eq!(cache.lru_metrics().max_probe_distance, 3);
        cache.check_invariants();
    }

    #[test]
    fn test_lru_capacity_one() {
        let mut cache = make_lru(1, 2);
        assert_eq!(cache.put(1, 10), None);
        assert_eq!(cache.put(2, 20), Some((1, 10)));
        assert_eq!(cache.put(2, 21), None);
        assert_eq!(cache.put(4, 40), Some((2, 21)));
        assert_eq!(order(&cache), [4]);
        cache.check_invariants();
    }

    #[test]
    fn test_lru_tight_table() {
        // table_size = capacity + 1 is the smallest legal table.
        let mut cache = make_lru(4, 5);
        for k in 0..40u32 {
            cache.put(k, i64::from(k));
            cache.check_invariants();
        }
        assert_eq!(order(&cache), [39, 38, 37, 36]);
    }

    #[test]
    fn test_lru_init_rejects_small_table() {
        let config = LruCacheConfig {
            capacity: NonZeroUsize::new(4).unwrap(),
            table_size: NonZeroUsize::new(4).unwrap(),
        };
        let result: Result<LruCache<u32, u32>, _> = LruCache::init(config, None);
        assert_eq!(
            result.err(),
            Some(CacheError::TableTooSmall {
                capacity: 4,
                table_size: 4
            })
        );
    }

    #[test]
    fn test_lru_churn_keeps_structures_consistent() {
        let mut cache = make_lru(16, 24);
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        for step in 0..5_000i64 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let key = (state % 64) as u32;
            match state % 5 {
                0 => {
                    cache.remove(&key);
                }
                1 | 2 => {
                    cache.get(&key);
                }
                _ => {
                    cache.put(key, step);
                }
            }
            cache.check_invariants();
        }
    }

    #[test]
    fn test_lru_metrics() {
        let mut cache = make_lru(2, 4);
        let metrics = cache.metrics();
        assert_eq!(metrics.get("requests").unwrap(), &0.0);
        cache.put(1, 10);
        cache.put(2, 20);
        cache.get(&1);
        cache.get(&2);
        cache.get(&3);
        cache.put(2, 22);
        cache.put(3, 30);
        let metrics = cache.metrics();
        assert_eq!(metrics.get("cache_hits").unwrap(), &2.0);
        assert_eq!(metrics.get("cache_misses").unwrap(), &1.0);
        assert_eq!(metrics.get("requests").unwrap(), &3.0);
        assert_eq!(metrics.get("insertions").unwrap(), &3.0);
        assert_eq!(metrics.get("updates").unwrap(), &1.0);
        assert_eq!(metrics.get("evictions").unwrap(), &1.0);
        assert_eq!(metrics.get("probes").unwrap(), &7.0);
        assert_eq!(cache.algorithm_name(), "LRU");

        // Removal, peeks and evictions do not count as probes.
        cache.remove(&3);
        cache.peek(&2);
        cache.contains(&2);
        assert_eq!(cache.metrics().get("probes").unwrap(), &7.0);
        assert_eq!(cache.metrics().get("removals").unwrap(), &1.0);
    }

    #[test]
    fn test_lru_into_iterator() {
        let mut cache = make_lru(3, 6);
        cache.put(1, 10);
        cache.put(2, 20);
        let mut seen = Vec::new();
        for (k, v) in &cache {
            seen.push((*k, *v));
        }
        assert_eq!(seen, [(2, 20), (1, 10)]);
        assert_eq!(cache.iter().rev().next(), Some((&1, &10)));
    }

    #[cfg(feature = "hashbrown")]
    #[test]
    fn test_lru_with_scrambled_hasher() {
        use crate::key::ScrambledState;
        let config = LruCacheConfig::for_capacity(NonZeroUsize::new(8).unwrap());
        let mut cache: LruCache<u64, u64, ScrambledState> = LruCache::init(config, None).unwrap();
        for k in 0..32u64 {
            cache.put(k << 20, k);
            cache.check_invariants();
        }
        assert_eq!(cache.len(), 8);
        assert_eq!(cache.get(&(31 << 20)), Some(&31));
        assert_eq!(cache.get(&0), None);
    }
}
