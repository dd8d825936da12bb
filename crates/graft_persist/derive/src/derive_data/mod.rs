//! Parsed form of a `#[derive(Persist)]` input.

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod persist_struct;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use attributes::{FieldAttributes, TypeAttributes};
pub(crate) use persist_struct::{PersistField, PersistStruct};
