//! Cache Key Types and Slot Hashing
//!
//! Keys are restricted to fixed-width integers. Each key is widened to a
//! `u64` bit pattern (signed keys are reinterpreted at their own width first,
//! so `-1i32` becomes `0xFFFF_FFFF` rather than a sign-extended value) and
//! then fed through a [`BuildHasher`]. The home slot of a key is the hash
//! modulo the slot table size.
//!
//! The default [`IdentityState`] passes the bit pattern through unchanged,
//! which gives the classic `key mod table_size` placement: dense integer keys
//! spread evenly and probe sequences are fully predictable. Workloads whose
//! keys cluster on a common stride should use a scrambling hasher instead,
//! such as [`ScrambledState`] (with the `hashbrown` feature).

use core::fmt::Debug;
use core::hash::{BuildHasher, Hasher};

mod sealed {
    pub trait Sealed {}
}

/// A fixed-width integer usable as a cache key.
///
/// This trait is sealed; it is implemented for every primitive integer type
/// up to 64 bits wide.
pub trait CacheKey: Copy + Eq + Debug + sealed::Sealed {
    /// Returns the key's bit pattern widened to 64 bits.
    fn to_bits(self) -> u64;
}

macro_rules! impl_unsigned_key {
    ($($t:ty),*) => {$(
        impl sealed::Sealed for $t {}
        impl CacheKey for $t {
            #[inline]
            fn to_bits(self) -> u64 {
                self as u64
            }
        }
    )*};
}

macro_rules! impl_signed_key {
    ($($t:ty => $u:ty),*) => {$(
        impl sealed::Sealed for $t {}
        impl CacheKey for $t {
            #[inline]
            fn to_bits(self) -> u64 {
                self as $u as u64
            }
        }
    )*};
}

impl_unsigned_key!(u8, u16, u32, u64, usize);
impl_signed_key!(i8 => u8, i16 => u16, i32 => u32, i64 => u64, isize => usize);

/// Hashes a key with the given builder.
#[inline]
pub(crate) fn hash_key<K: CacheKey, S: BuildHasher>(hasher: &S, key: K) -> u64 {
    let mut state = hasher.build_hasher();
    state.write_u64(key.to_bits());
    state.finish()
}

/// A hasher that returns the last `u64` written to it.
///
/// Only meaningful for integer keys, which is all this crate accepts.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityHasher {
    hash: u64,
}

impl Hasher for IdentityHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        // Fallback for callers that hash through `Hash::hash`; the last
        // write wins, its first 8 bytes read little-endian.
        self.hash = bytes
            .iter()
            .take(8)
            .enumerate()
            .fold(0, |acc, (i, b)| acc | (u64::from(*b) << (i * 8)));
    }

    #[inline]
    fn write_u64(&mut self, n: u64) {
        self.hash = n;
    }
}

/// [`BuildHasher`] producing [`IdentityHasher`]s. The default key hasher.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityState;

impl BuildHasher for IdentityState {
    type Hasher = IdentityHasher;

    #[inline]
    fn build_hasher(&self) -> IdentityHasher {
        IdentityHasher::default()
    }
}

/// Randomly seeded scrambling hasher for clustered key sets.
#[cfg(feature = "hashbrown")]
pub type ScrambledState = hashbrown::DefaultHashBuilder;
