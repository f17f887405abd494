//! Cache Configuration Module
//!
//! Configuration for [`LruCache`](crate::LruCache). Like every config in this
//! crate it is a plain struct with public fields:
//!
//! - **Simple**: Just create the struct with all fields set
//! - **Type safety**: Zero sizes are unrepresentable
//! - **Checked once**: [`LruCacheConfig::validate`] runs when the cache is built
//!
//! # Sizing Guidelines
//!
//! ## Understanding `capacity` and `table_size`
//!
//! - **`capacity`**: Maximum number of live entries. Inserting a new key into a
//!   full cache evicts the least recently used entry.
//! - **`table_size`**: Number of slots in the open-addressed key index. It must
//!   be strictly greater than `capacity`; the slack keeps linear probe chains
//!   short. The table never grows.
//!
//! ```text
//! load factor = capacity / table_size
//! load ≤ 0.5  →  expected probe length for a hit ≈ 1.5 slots
//! load ≈ 0.9  →  expected probe length for a hit ≈ 5.5 slots
//! ```
//!
//! [`LruCacheConfig::for_capacity`] picks `table_size = 2 × capacity`.
//!
//! ## Memory
//!
//! ```text
//! Total Memory ≈ table_size × slot_size + (capacity + 1) × (entry_size + slot_size)
//! ```
//!
//! The extra `+ 1` entry exists because a new key is linked in before the
//! least recently used entry is evicted.
//!
//! # Examples
//!
//! ```
//! use probe_lru::config::LruCacheConfig;
//! use probe_lru::LruCache;
//! use core::num::NonZeroUsize;
//!
//! let config = LruCacheConfig {
//!     capacity: NonZeroUsize::new(1000).unwrap(),
//!     table_size: NonZeroUsize::new(2048).unwrap(),
//! };
//! let cache: LruCache<u64, u64> = LruCache::init(config, None).unwrap();
//! assert_eq!(cache.table_size(), 2048);
//! ```

use crate::error::CacheError;
use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for an LRU cache.
///
/// # Examples
///
/// ```
/// use probe_lru::config::LruCacheConfig;
/// use core::num::NonZeroUsize;
///
/// // The classic layout: 4 entries over 8 slots.
/// let config = LruCacheConfig::for_capacity(NonZeroUsize::new(4).unwrap());
/// assert_eq!(config.table_size.get(), 8);
/// assert!(config.validate().is_ok());
///
/// // A table no larger than the capacity is rejected.
/// let config = LruCacheConfig {
///     capacity: NonZeroUsize::new(8).unwrap(),
///     table_size: NonZeroUsize::new(8).unwrap(),
/// };
/// assert!(config.validate().is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LruCacheConfig {
    /// Maximum number of live key-value pairs.
    pub capacity: NonZeroUsize,
    /// Number of hash slots. Must be greater than `capacity`.
    pub table_size: NonZeroUsize,
}

impl LruCacheConfig {
    /// Builds a config whose slot table is twice the capacity.
    pub fn for_capacity(capacity: NonZeroUsize) -> Self {
        let table_size = NonZeroUsize::new(capacity.get().saturating_mul(2)).unwrap_or(capacity);
        LruCacheConfig {
            capacity,
            table_size,
        }
    }

    /// Checks that the slot table can always hold every live key plus one.
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.table_size <= self.capacity {
            return Err(CacheError::TableTooSmall {
                capacity: self.capacity.get(),
                table_size: self.table_size.get(),
            });
        }
        Ok(())
    }

    /// Ratio of live entries to slots when the cache is full.
    pub fn max_load_factor(&self) -> f64 {
        self.capacity.get() as f64 / self.table_size.get() as f64
    }
}

impl fmt::Debug for LruCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCacheConfig")
            .field("capacity", &self.capacity)
            .field("table_size", &self.table_size)
            .finish()
    }
}
