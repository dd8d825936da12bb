//! [`Persist`](crate::Persist) implementations for foreign types.
//!
//! ## Implemented Menu
//!
//! - primitives: `i8`-`i64`, `u8`-`u64`, `f32`, `f64`, `bool`, `char`
//! - `core::time::Duration`, as 100 ns ticks
//! - `String`, with the null flag of empty strings
//! - `Vec<T>`, `HashMap<K, V, S>`, `BTreeMap<K, V>`
//! - `Box<T>`, `Arc<T>` for records; `Box<dyn Object>`, `Arc<dyn Object>`
//! - `Option<T>` for every type above, see [`Nullable`](crate::Nullable)

// -----------------------------------------------------------------------------
// Modules

mod collections;
mod pointers;
mod primitives;
mod string;
