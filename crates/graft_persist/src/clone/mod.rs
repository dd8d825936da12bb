//! Deep cloning of object graphs.
//!
//! A [`Cloner`] produces an independent copy of owned data and resolves
//! shared (`Arc`) slots through a per-session identity map, following the
//! [`ClonePolicy`](crate::registry::ClonePolicy) of each type.

mod cloner;

pub use cloner::Cloner;
