//! Static type descriptions: wire shapes and class layouts.

// -----------------------------------------------------------------------------
// Modules

mod class_info;
mod shape;

// -----------------------------------------------------------------------------
// Exports

pub use class_info::{ClassFlags, ClassInfo, ClassKind, FieldFlags, FieldInfo};
pub use shape::{MAX_SHAPE_DEPTH, Shape};
