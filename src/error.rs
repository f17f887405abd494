//! Cache construction errors.
//!
//! Only construction can fail: storage for the slot table and the entry
//! arena is reserved up front, so `put`, `get` and `remove` never allocate
//! and never return errors. A lookup miss is reported as `None`, not as an
//! error.

use thiserror::Error;

/// Errors returned when building an [`LruCache`](crate::LruCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The slot table must have strictly more slots than the cache has
    /// entries, otherwise a probe for an absent key could find no free slot.
    #[error("slot table of {table_size} slots cannot index a cache of capacity {capacity}; table_size must exceed capacity")]
    TableTooSmall {
        /// Configured maximum number of live entries.
        capacity: usize,
        /// Configured number of hash slots.
        table_size: usize,
    },

    /// Reserving storage for the named structure failed.
    #[error("failed to reserve storage for {what} ({requested} elements)")]
    AllocationFailed {
        /// Which structure was being allocated.
        what: &'static str,
        /// Number of elements requested.
        requested: usize,
    },
}
