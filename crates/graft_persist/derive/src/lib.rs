//! Derive macro for `graft_persist`.
//!
//! See [`Persist`].
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static PERSIST_ATTRIBUTE_NAME: &str = "persist";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Persistent Records
///
/// `#[derive(Persist)]` turns a struct with named fields into a record and
/// implements:
///
/// - `Record`: static class description, field writer and reader, deep clone
/// - `Persist`: the record as a field value
/// - `Nullable`: `Option<T>` written as a null class id
/// - `Object`: polymorphic use behind `Box<dyn Object>` or `Arc<dyn Object>`
///
/// The type must implement `Default`; reading starts from the default
/// instance and overwrites the fields found in the stream. Generic types are
/// not supported.
///
/// ## Type Attributes
///
/// ```rust, ignore
/// #[derive(Persist, Default)]
/// #[persist(type_path = "scene::Node", auto_register)]
/// struct Node { /* ... */ }
/// ```
///
/// - `type_path = "..."`: the class name written into streams. Defaults to
///   `module_path!()` joined with the type name; set it explicitly for any
///   type whose documents must outlive a refactor.
/// - `value`: the type has no identity; clones are `Clone::clone` copies.
/// - `compact`: fields are written in tag order without ordinals. Compact
///   classes cannot change layout and cannot have conditional fields.
/// - `resource`: `Arc<T>` slots share the source instead of copying it when
///   cloned.
/// - `auto_register`: submit the type to the global registry (requires the
///   `auto_register` feature).
/// - `before_serialization = path`, `after_serialization = path`: called with
///   `&self` around writing and cloning.
/// - `after_deserialization = path`: called with `&mut self` after reading and
///   on every fresh clone.
///
/// ## Field Attributes
///
/// - `rename = "..."`: the tag stored in class headers. Defaults to the field
///   name. Fields are ordered by tag.
/// - `required`: reading fails when the stream has no value for the field.
/// - `member`: omitted when equal to the value in `Default::default()`;
///   the field type must implement `PartialEq`.
/// - `serialize_if = path`: `fn(&Self) -> bool`, deciding per instance
///   whether the field is written and cloned. Excluded fields clone as
///   `Default::default()`.
/// - `item_if = path`: `fn(&Self, usize, &Item) -> bool` for a collection
///   field implementing `ItemFilter`, deciding per element.
/// - `skip`: not persisted; reads and clones leave `Default::default()`.
///
/// `required` cannot be combined with the conditional attributes, since
/// omitting such a field would make the record unreadable.
#[proc_macro_derive(Persist, attributes(persist))]
pub fn derive_persist(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let data = match derive_data::PersistStruct::from_ast(&ast) {
        Ok(data) => data,
        Err(err) => return err.into_compile_error().into(),
    };

    impls::impl_persist(&data).into()
}
