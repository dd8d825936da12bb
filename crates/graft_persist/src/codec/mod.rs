//! The primitive codec: fixed-width scalars, 7-bit length prefixes,
//! strings and collection counts.

// -----------------------------------------------------------------------------
// Modules

mod reader;
mod writer;

// -----------------------------------------------------------------------------
// Exports

pub use reader::BinaryReader;
pub use writer::BinaryWriter;
