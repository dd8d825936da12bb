//! The read side of a persistence session.
//!
//! A [`Deserializer`] rebuilds values from the bytes a
//! [`Serializer`](crate::Serializer) produced. Class headers embedded in the
//! stream are read once per session into [`ClassDef`]s and matched by tag
//! against the local layouts, so a reader tolerates fields that were added
//! or removed since the data was written.

// -----------------------------------------------------------------------------
// Modules

mod class_def;
mod deserializer;

// -----------------------------------------------------------------------------
// Exports

pub use class_def::{ClassDef, FieldDef, FieldSlot};
pub use deserializer::Deserializer;

pub(crate) use class_def::Target;
