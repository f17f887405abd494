#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Architecture
//!
//! ```text
//!            key                       ┌──────────────────────────────┐
//!             │                        │ RecencyList (entry arena)    │
//!             ▼                        │                              │
//!   ┌──────────────────┐   EntryId     │  head ─▶ [4] ⇄ [3] ⇄ [2] ⇄ [1] ◀─ tail
//!   │ SlotIndex        │──────────────▶│          MRU            LRU │
//!   │ hash(key) % size │               └──────────────────────────────┘
//!   │ linear probing   │
//!   │ tombstones       │
//!   └──────────────────┘
//! ```
//!
//! - The **slot index** maps each live key to the id of its entry. Deleted
//!   slots become tombstones so that later keys on the same probe chain stay
//!   reachable.
//! - The **recency list** is a doubly linked list stored in an arena, linked
//!   by index. The head is the most recently used entry, the tail is the next
//!   eviction victim.
//! - [`LruCache`] keeps the two in lockstep: every key in the index has
//!   exactly one entry in the list and vice versa.
//!
//! ## Performance Characteristics
//!
//! | Operation | Expected time | Allocates |
//! |-----------|---------------|-----------|
//! | `get`     | O(1)          | No        |
//! | `put`     | O(1)          | No        |
//! | `remove`  | O(1) amortised| No        |
//! | `iter`    | O(len)        | No        |
//! | `init`    | O(table_size) | Yes       |
//!
//! ## Observability
//!
//! The crate emits [`tracing`] events: construction at `debug`, evictions,
//! removals and index compactions at `trace`. Install any subscriber to see
//! them; without one they cost a branch.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

/// Cache configuration.
pub mod config;

/// Arena entries and their stable ids.
pub mod entry;

/// Construction errors.
pub mod error;

/// Integer key types and slot hashing.
pub mod key;

/// Open-addressed key index with tombstone deletion.
pub(crate) mod index;

/// Index-linked recency list.
///
/// Internal infrastructure; use [`LruCache`] instead.
pub(crate) mod list;

/// Least Recently Used (LRU) cache implementation.
///
/// Provides a fixed-size cache that evicts the least recently used items when
/// the capacity is reached.
pub mod lru;

/// Cache metrics system.
///
/// Counters for hits, misses and evictions plus index probe statistics,
/// reported through the [`CacheMetrics`](metrics::CacheMetrics) trait.
pub mod metrics;

pub use crate::config::LruCacheConfig;
pub use crate::entry::{Entry, EntryId};
pub use crate::error::CacheError;
pub use crate::key::{CacheKey, IdentityHasher, IdentityState};
#[cfg(feature = "hashbrown")]
pub use crate::key::ScrambledState;
pub use crate::list::Iter;
pub use crate::lru::LruCache;
pub use crate::metrics::{CacheMetrics, CoreCacheMetrics, LruCacheMetrics};
