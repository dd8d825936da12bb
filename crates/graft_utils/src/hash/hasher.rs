//! `FixedHashState` gives hash results that only depend on the input,
//! which makes it usable for checksums that are compared across runs.
//!
//! `NoOpHashState` passes a single `u64` straight through, which is all a
//! [`TypeId`](core::any::TypeId) key needs.

use core::hash::{BuildHasher, Hash, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHasher

const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x95EE04C4F326B271);

/// The hasher built by [`FixedHashState`].
pub type FixedHasher = FoldHasher<'static>;

/// Hash state with a compiled-in seed.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use graft_utils::hash::FixedHashState;
///
/// let a = FixedHashState.hash_one("scene");
/// let b = FixedHashState.hash_one("scene");
/// assert_eq!(a, b);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

/// Hashes `value` with [`FixedHashState`].
///
/// The result is stable across processes, so it can be stored next to the
/// data it was computed from.
#[inline]
pub fn stable_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    FixedHashState.hash_one(value)
}

// -----------------------------------------------------------------------------
// NoOpHasher

/// Hasher that keeps the last `u64` it was given.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHasher {
    hash: u64,
}

impl Hasher for NoOpHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        // Only reached by keys that do not hash through `write_u64`.
        for byte in bytes.iter().rev() {
            self.hash = self.hash.rotate_left(8).wrapping_add(*byte as u64);
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }
}

/// Builds [`NoOpHasher`]s.
///
/// ```
/// use core::hash::BuildHasher;
/// use graft_utils::hash::NoOpHashState;
///
/// assert_eq!(NoOpHashState.hash_one(7_u64), 7);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHashState;

impl BuildHasher for NoOpHashState {
    type Hasher = NoOpHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        NoOpHasher { hash: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_hash_depends_only_on_input() {
        assert_eq!(stable_hash(&[1_u8, 2, 3][..]), stable_hash(&[1_u8, 2, 3][..]));
        assert_ne!(stable_hash(&[1_u8, 2, 3][..]), stable_hash(&[1_u8, 2, 4][..]));
    }

    #[test]
    fn no_op_keeps_u64() {
        let mut hasher = NoOpHashState.build_hasher();
        hasher.write_u64(42);
        assert_eq!(hasher.finish(), 42);
    }
}
