//! Cache Entry Type
//!
//! An [`Entry`] holds one live key-value pair plus its links in the recency
//! order. Entries live in the arena owned by the recency list and are
//! addressed by [`EntryId`], a stable arena index. Links are indices rather
//! than pointers, so unlinking or evicting an entry can never leave a
//! dangling reference behind: a stale id simply names a recycled slot.
//!
//! # Memory Layout
//!
//! - `key: K` - fixed-width integer key
//! - `value: V` - value
//! - `prev: Option<EntryId>` - toward the most recently used end
//! - `next: Option<EntryId>` - toward the least recently used end

use core::fmt;

/// Stable index of an entry inside the recency arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(usize);

impl EntryId {
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        EntryId(index)
    }

    /// Position of the entry in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({})", self.0)
    }
}

/// A key-value pair and its neighbours in the recency list.
///
/// While an entry sits on the free chain, `next` links to the next free slot
/// and `prev` is `None`; its key and value are stale.
#[derive(Clone, Copy)]
pub struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) prev: Option<EntryId>,
    pub(crate) next: Option<EntryId>,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Entry {
            key,
            value,
            prev: None,
            next: None,
        }
    }

    /// The entry's key.
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The entry's value.
    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// The neighbour that was used more recently, if any.
    #[inline]
    pub fn prev(&self) -> Option<EntryId> {
        self.prev
    }

    /// The neighbour that was used less recently, if any.
    #[inline]
    pub fn next(&self) -> Option<EntryId> {
        self.next
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("prev", &self.prev)
            .field("next", &self.next)
            .finish()
    }
}
