//! Recency List
//!
//! A doubly linked list ordering cache entries from most to least recently
//! used. The head is the most recently used entry and the tail the least
//! recently used one. Entries live in a `Vec` arena and are addressed by
//! [`EntryId`]; removed slots are threaded onto an intrusive free chain
//! through their `next` link and reused before the arena grows. The arena is
//! reserved once at construction, so linking new entries never reallocates.

extern crate alloc;

use crate::entry::{Entry, EntryId};
use crate::error::CacheError;
use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;

/// A doubly linked recency list stored in a fixed arena.
///
/// # Examples
///
/// ```ignore
/// let mut list = RecencyList::with_slots(3).unwrap();
/// let a = list.push_front(1, 10).unwrap();
/// let b = list.push_front(2, 20).unwrap();
///
/// // b is the head, a the tail
/// list.promote_to_front(a);
/// assert_eq!(list.evict_tail(), Some((2, 20)));
/// ```
pub(crate) struct RecencyList<K, V> {
    /// Arena of entries, live and free.
    nodes: Vec<Entry<K, V>>,
    /// Number of arena slots reserved up front.
    slots: usize,
    /// Most recently used entry.
    head: Option<EntryId>,
    /// Least recently used entry.
    tail: Option<EntryId>,
    /// First slot of the free chain.
    free: Option<EntryId>,
    /// Number of linked entries.
    len: usize,
}

impl<K: Copy, V: Copy> RecencyList<K, V> {
    /// Creates an empty list able to hold `slots` entries at once.
    pub(crate) fn with_slots(slots: usize) -> Result<Self, CacheError> {
        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(slots)
            .map_err(|_| CacheError::AllocationFailed {
                what: "entry arena",
                requested: slots,
            })?;
        Ok(RecencyList {
            nodes,
            slots,
            head: None,
            tail: None,
            free: None,
            len: 0,
        })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) fn head(&self) -> Option<EntryId> {
        self.head
    }

    #[inline]
    pub(crate) fn tail(&self) -> Option<EntryId> {
        self.tail
    }

    #[inline]
    pub(crate) fn get(&self, id: EntryId) -> &Entry<K, V> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: EntryId) -> &mut Entry<K, V> {
        &mut self.nodes[id.index()]
    }

    /// Links a new entry as the head.
    ///
    /// Returns `None` when every reserved slot is in use.
    pub(crate) fn push_front(&mut self, key: K, value: V) -> Option<EntryId> {
        let id = match self.free {
            Some(id) => {
                self.free = self.nodes[id.index()].next;
                self.nodes[id.index()] = Entry::new(key, value);
                id
            }
            None => {
                if self.nodes.len() == self.slots {
                    return None;
                }
                self.nodes.push(Entry::new(key, value));
                EntryId::new(self.nodes.len() - 1)
            }
        };
        self.attach_front(id);
        self.len += 1;
        Some(id)
    }

    /// Moves a linked entry to the head.
    pub(crate) fn promote_to_front(&mut self, id: EntryId) {
        if self.head == Some(id) {
            return;
        }
        self.detach(id);
        self.attach_front(id);
    }

    /// Unlinks the tail and returns its key and value.
    pub(crate) fn evict_tail(&mut self) -> Option<(K, V)> {
        let tail = self.tail?;
        Some(self.release(tail))
    }

    /// Unlinks an arbitrary linked entry and returns its key and value.
    pub(crate) fn remove(&mut self, id: EntryId) -> (K, V) {
        self.release(id)
    }

    /// Drops every entry. Reserved storage is kept.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
        self.free = None;
        self.len = 0;
    }

    /// Iterates from most to least recently used.
    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    fn release(&mut self, id: EntryId) -> (K, V) {
        self.detach(id);
        self.len -= 1;
        let node = &mut self.nodes[id.index()];
        node.next = self.free;
        self.free = Some(id);
        (node.key, node.value)
    }

    fn attach_front(&mut self, id: EntryId) {
        let old_head = self.head;
        {
            let node = &mut self.nodes[id.index()];
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => self.nodes[h.index()].prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    fn detach(&mut self, id: EntryId) {
        let (prev, next) = {
            let node = &self.nodes[id.index()];
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.nodes[p.index()].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n.index()].prev = prev,
            None => self.tail = prev,
        }
        let node = &mut self.nodes[id.index()];
        node.prev = None;
        node.next = None;
    }

    /// Walks the list in both directions and panics on any broken link.
    #[cfg(test)]
    pub(crate) fn check_links(&self) {
        let mut count = 0;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let node = self.get(id);
            assert_eq!(node.prev, prev, "prev link of {:?} is not a mirror", id);
            count += 1;
            assert!(count <= self.len, "cycle in recency list");
            prev = Some(id);
            cursor = node.next;
        }
        assert_eq!(prev, self.tail, "walk from head did not end at tail");
        assert_eq!(count, self.len);
        assert_eq!(self.head.is_none(), self.tail.is_none());
    }
}

impl<K, V> fmt::Debug for RecencyList<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecencyList")
            .field("len", &self.len)
            .field("slots", &self.slots)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .finish()
    }
}

/// Iterator over cache entries from most to least recently used.
///
/// Created by [`LruCache::iter`](crate::LruCache::iter). Iterating does not
/// change the recency order.
pub struct Iter<'a, K, V> {
    nodes: &'a [Entry<K, V>],
    front: Option<EntryId>,
    back: Option<EntryId>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let nodes = self.nodes;
        let node = &nodes[self.front?.index()];
        self.remaining -= 1;
        self.front = node.next;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let nodes = self.nodes;
        let node = &nodes[self.back?.index()];
        self.remaining -= 1;
        self.back = node.prev;
        Some((&node.key, &node.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            nodes: self.nodes,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
