//! The write side of a persistence session.

mod serializer;

pub use serializer::Serializer;
