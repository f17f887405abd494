//! Open-addressed key index with linear probing.
//!
//! Maps each live key to the [`EntryId`] of its entry in the recency arena.
//! The slot table has a fixed size chosen at construction; a key's home slot
//! is `hash(key) mod table_size` and collisions walk forward one slot at a
//! time, wrapping at the end.
//!
//! # Deletion
//!
//! Clearing a slot back to empty would cut every probe chain that runs
//! through it: a later lookup for a key stored further along would stop at
//! the hole and report a miss. Removed slots therefore become tombstones.
//! Lookups step over tombstones; insertions reuse the first tombstone they
//! pass. When tombstones pile up the table is compacted in place (same size),
//! using scratch space reserved at construction so compaction never
//! allocates.

extern crate alloc;

use crate::entry::EntryId;
use crate::error::CacheError;
use crate::key::{hash_key, CacheKey};
use alloc::vec::Vec;
use core::fmt;
use core::hash::BuildHasher;
use tracing::trace;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Slot<K> {
    Empty,
    Tombstone,
    Occupied { key: K, entry: EntryId },
}

/// Outcome of probing for a key.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Probe {
    /// The key is stored at `slot`.
    Found {
        slot: usize,
        entry: EntryId,
        distance: usize,
    },
    /// The key is absent; `slot` is where it should be inserted.
    Vacant { slot: usize, distance: usize },
}

impl Probe {
    /// Number of slots stepped over past the home slot.
    #[inline]
    pub(crate) fn distance(&self) -> usize {
        match *self {
            Probe::Found { distance, .. } | Probe::Vacant { distance, .. } => distance,
        }
    }
}

pub(crate) struct SlotIndex<K, S> {
    slots: Vec<Slot<K>>,
    /// Holding area for live slots during compaction.
    scratch: Vec<(K, EntryId)>,
    hasher: S,
    live: usize,
    tombstones: usize,
    compactions: u64,
}

impl<K: CacheKey, S: BuildHasher> SlotIndex<K, S> {
    /// Creates an index of `table_size` empty slots that will hold at most
    /// `max_live` keys at once.
    pub(crate) fn new(table_size: usize, max_live: usize, hasher: S) -> Result<Self, CacheError> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(table_size)
            .map_err(|_| CacheError::AllocationFailed {
                what: "slot table",
                requested: table_size,
            })?;
        slots.resize(table_size, Slot::Empty);

        let mut scratch = Vec::new();
        scratch
            .try_reserve_exact(max_live)
            .map_err(|_| CacheError::AllocationFailed {
                what: "compaction scratch",
                requested: max_live,
            })?;

        Ok(SlotIndex {
            slots,
            scratch,
            hasher,
            live: 0,
            tombstones: 0,
            compactions: 0,
        })
    }

    #[inline]
    pub(crate) fn table_size(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    #[inline]
    pub(crate) fn tombstones(&self) -> usize {
        self.tombstones
    }

    #[inline]
    pub(crate) fn compactions(&self) -> u64 {
        self.compactions
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn home(&self, key: K) -> usize {
        // The remainder is below the table length, so it fits in usize.
        (hash_key(&self.hasher, key) % self.slots.len() as u64) as usize
    }

    #[inline]
    fn next_slot(&self, slot: usize) -> usize {
        if slot + 1 == self.slots.len() {
            0
        } else {
            slot + 1
        }
    }

    /// Probes for `key`.
    ///
    /// Visits at most `table_size` slots. Returns `None` only if every slot
    /// holds some other live key, which correct sizing rules out.
    pub(crate) fn locate(&self, key: K) -> Option<Probe> {
        let mut slot = self.home(key);
        let mut first_tombstone = None;
        for distance in 0..self.slots.len() {
            match self.slots[slot] {
                Slot::Empty => {
                    return Some(Probe::Vacant {
                        slot: first_tombstone.unwrap_or(slot),
                        distance,
                    });
                }
                Slot::Tombstone => {
                    if first_tombstone.is_none() {
                        first_tombstone = Some(slot);
                    }
                }
                Slot::Occupied { key: k, entry } if k == key => {
                    return Some(Probe::Found {
                        slot,
                        entry,
                        distance,
                    });
                }
                Slot::Occupied { .. } => {}
            }
            slot = self.next_slot(slot);
        }
        first_tombstone.map(|slot| Probe::Vacant {
            slot,
            distance: self.slots.len(),
        })
    }

    /// Stores `key` in a slot previously reported as [`Probe::Vacant`].
    pub(crate) fn occupy(&mut self, slot: usize, key: K, entry: EntryId) {
        match self.slots[slot] {
            Slot::Tombstone => self.tombstones -= 1,
            Slot::Empty => {}
            Slot::Occupied { key: k, .. } => {
                unreachable!("slot {} already holds key {:?}", slot, k)
            }
        }
        self.slots[slot] = Slot::Occupied { key, entry };
        self.live += 1;
    }

    /// Removes `key`, leaving a tombstone. Returns the entry it mapped to.
    pub(crate) fn remove(&mut self, key: K) -> Option<EntryId> {
        match self.locate(key)? {
            Probe::Found { slot, entry, .. } => {
                self.slots[slot] = Slot::Tombstone;
                self.live -= 1;
                self.tombstones += 1;
                self.maybe_compact();
                Some(entry)
            }
            Probe::Vacant { .. } => None,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.fill(Slot::Empty);
        self.live = 0;
        self.tombstones = 0;
    }

    fn maybe_compact(&mut self) {
        let len = self.slots.len();
        if self.tombstones > len / 4 || self.live + self.tombstones == len {
            self.compact();
        }
    }

    /// Rebuilds the table in place, dropping every tombstone.
    fn compact(&mut self) {
        self.scratch.clear();
        for slot in self.slots.iter_mut() {
            if let Slot::Occupied { key, entry } = *slot {
                self.scratch.push((key, entry));
            }
            *slot = Slot::Empty;
        }

        for i in 0..self.scratch.len() {
            let (key, entry) = self.scratch[i];
            let mut slot = self.home(key);
            while self.slots[slot] != Slot::Empty {
                slot = self.next_slot(slot);
            }
            self.slots[slot] = Slot::Occupied { key, entry };
        }

        trace!(
            live = self.live,
            tombstones = self.tombstones,
            table_size = self.slots.len(),
            "compacted slot table"
        );
        self.tombstones = 0;
        self.compactions += 1;
    }

    /// Verifies counters and that every stored key is reachable from its home.
    #[cfg(test)]
    pub(crate) fn check_consistency(&self) {
        let mut live = 0;
        let mut tombstones = 0;
        for (slot, state) in self.slots.iter().enumerate() {
            match *state {
                Slot::Occupied { key, entry } => {
                    live += 1;
                    assert_eq!(
                        self.locate(key),
                        Some(Probe::Found {
                            slot,
                            entry,
                            distance: (slot + self.slots.len() - self.home(key))
                                % self.slots.len(),
                        }),
                        "key {:?} unreachable from its home slot",
                        key
                    );
                }
                Slot::Tombstone => tombstones += 1,
                Slot::Empty => {}
            }
        }
        assert_eq!(live, self.live);
        assert_eq!(tombstones, self.tombstones);
    }
}

impl<K, S> fmt::Debug for SlotIndex<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotIndex")
            .field("table_size", &self.slots.len())
            .field("live", &self.live)
            .field("tombstones", &self.tombstones)
            .field("compactions", &self.compactions)
            .finish()
    }
}
