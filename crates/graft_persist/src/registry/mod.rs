//! The process-wide type dispatch cache.
//!
//! [`TypeRegistry`] maps each concrete runtime type to a [`TypeEntry`]: the
//! function pointers that allocate and read it, read into an existing
//! instance, and clone it. Entries are inserted during an explicit build
//! phase and only read afterwards.
//!
//! ## auto_register
//!
//! Types marked `#[persist(auto_register)]` submit themselves through the
//! [`inventory`](https://docs.rs/inventory) crate; see
//! [`TypeRegistry::auto_register`] and [`TypeRegistry::global`]. Tests and
//! tools can still build isolated registries with [`TypeRegistry::new`].

// -----------------------------------------------------------------------------
// Modules

mod entry;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use entry::{CloneFn, ClonePolicy, MakeFn, ReadFn, TypeEntry};
pub use type_registry::TypeRegistry;
