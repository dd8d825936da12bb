//! Hash states and the hash map alias used across graft.

// -----------------------------------------------------------------------------
// Modules

mod hasher;

// -----------------------------------------------------------------------------
// Exports

pub use hasher::{FixedHashState, FixedHasher, stable_hash};
pub use hasher::{NoOpHashState, NoOpHasher};

/// A [`hashbrown::HashMap`] whose default hash state is [`FixedHashState`].
///
/// Iteration order depends only on the inserted keys, never on process
/// randomness.
pub type HashMap<K, V, S = FixedHashState> = hashbrown::HashMap<K, V, S>;

// -----------------------------------------------------------------------------
// Re-export crates

pub use foldhash;
pub use hashbrown;
