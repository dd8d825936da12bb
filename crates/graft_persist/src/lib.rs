#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// Inside this crate the derive output must name `graft_persist` the same way
// doctests and downstream crates do.
extern crate self as graft_persist;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod filter;
mod object;
mod options;
mod persist;
mod persistence;
mod record;

pub mod clone;
pub mod codec;
pub mod de;
pub mod impls;
pub mod info;
pub mod registry;
pub mod ser;

#[doc(hidden)]
pub mod __macro_exports;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use clone::Cloner;
pub use de::Deserializer;
pub use error::{DecodeError, DecodeErrorKind, PersistError};
pub use filter::ItemFilter;
pub use object::Object;
pub use options::{AUTO_SIGNATURE, Options};
pub use persist::{Nullable, Persist};
pub use persistence::{DEFAULT_SIGNATURE, Persistence};
pub use record::Record;
pub use registry::{ClonePolicy, TypeRegistry};
pub use ser::Serializer;

pub use graft_persist_derive::Persist;
