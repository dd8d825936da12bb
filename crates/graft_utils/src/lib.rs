//! Small containers shared by the graft crates.
//!
//! - [`TypeIdMap`]: a map keyed by [`TypeId`](core::any::TypeId), used by the
//!   type dispatch registry and by the per-session class id cache.
//! - [`hash`]: a stable, fixed-seed hash state and a pass-through hash state
//!   for keys that are already hashes.
#![no_std]

// -----------------------------------------------------------------------------
// Modules

mod typeid_map;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-level exports

pub use typeid_map::TypeIdMap;
