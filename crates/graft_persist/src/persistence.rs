use alloc::sync::Arc;
use alloc::vec::Vec;
use std::io::{Read, Write};

use graft_utils::hash::stable_hash;

use crate::clone::Cloner;
use crate::de::Deserializer;
use crate::error::{DecodeError, DecodeErrorKind, PersistError};
use crate::options::Options;
use crate::persist::Persist;
use crate::record::Record;
use crate::registry::TypeRegistry;
use crate::ser::Serializer;

/// Signature word written before every document by default.
pub const DEFAULT_SIGNATURE: u32 = 0xdead_babe;

// -----------------------------------------------------------------------------
// Persistence

/// Whole-document entry points over a frozen registry.
///
/// A document is `[signature: u32] [root]`; every call runs its own
/// session, so a `Persistence` can be shared between threads.
///
/// ```
/// use graft_persist::{Persist, Persistence, TypeRegistry};
/// use std::sync::Arc;
///
/// #[derive(Persist, Default, Debug, PartialEq)]
/// #[persist(type_path = "scene::Camera")]
/// struct Camera {
///     fov: f32,
///     name: Option<String>,
/// }
///
/// let persistence = Persistence::new(Arc::new(TypeRegistry::new()));
/// let camera = Camera { fov: 60.0, name: None };
///
/// let bytes = persistence.to_bytes(&camera);
/// assert!(persistence.has_signature(&bytes));
/// assert_eq!(persistence.from_bytes::<Camera>(&bytes).unwrap(), camera);
/// assert_eq!(persistence.checksum(&camera), persistence.checksum(&Camera { fov: 60.0, name: None }));
/// ```
#[derive(Debug, Clone)]
pub struct Persistence {
    registry: Arc<TypeRegistry>,
    options: Options,
    signature: u32,
}

impl Persistence {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            options: Options::default(),
            signature: DEFAULT_SIGNATURE,
        }
    }

    /// Uses the registry built by [`TypeRegistry::global`].
    pub fn global() -> Self {
        Self::new(TypeRegistry::global())
    }

    #[inline]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    #[inline]
    pub fn with_signature(mut self, signature: u32) -> Self {
        self.signature = signature;
        self
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[inline]
    pub fn signature(&self) -> u32 {
        self.signature
    }

    /// Encodes `value` as a document.
    pub fn to_bytes<T: Persist>(&self, value: &T) -> Vec<u8> {
        let mut ser = Serializer::new(self.options.clone());
        ser.writer().write_u32(self.signature);
        ser.write_root(value);
        ser.into_bytes()
    }

    /// Encodes `value` and writes the document to `out`.
    pub fn write_object<T: Persist>(&self, mut out: impl Write, value: &T) -> Result<(), PersistError> {
        out.write_all(&self.to_bytes(value))?;
        Ok(())
    }

    /// Whether `bytes` starts with this signature.
    pub fn has_signature(&self, bytes: &[u8]) -> bool {
        bytes.get(..4) == Some(self.signature.to_le_bytes().as_slice())
    }

    fn session<'a>(&'a self, bytes: &'a [u8]) -> Result<Deserializer<'a>, PersistError> {
        if !self.has_signature(bytes) {
            let position = self.options.report_error_position.then_some(0);
            return Err(DecodeError {
                kind: DecodeErrorKind::BadSignature,
                position,
            }
            .into());
        }
        Ok(Deserializer::new(&bytes[4..], &self.registry, self.options.clone()))
    }

    /// Decodes a document.
    pub fn from_bytes<T: Persist>(&self, bytes: &[u8]) -> Result<T, PersistError> {
        self.session(bytes)?.read_root()
    }

    /// Reads `input` to its end and decodes it as a document.
    pub fn read_object<T: Persist>(&self, mut input: impl Read) -> Result<T, PersistError> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        self.from_bytes(&bytes)
    }

    /// Decodes a document over the fields of `target`; fields absent from
    /// the document keep their value.
    pub fn read_into<T: Record>(&self, bytes: &[u8], target: &mut T) -> Result<(), PersistError> {
        self.session(bytes)?.read_root_into(target)
    }

    /// Deep-clones `value` in a fresh clone session.
    pub fn clone<T: Persist>(&self, value: &T) -> Result<T, PersistError> {
        Cloner::new(&self.registry).clone_value(value)
    }

    /// A hash of the encoded document, stable across runs and platforms.
    ///
    /// Values holding a [`std::collections::HashMap`] with a random hash
    /// state have no stable encoding; use [`graft_utils::hash::HashMap`] or
    /// a `BTreeMap` instead.
    pub fn checksum<T: Persist>(&self, value: &T) -> u64 {
        stable_hash(self.to_bytes(value).as_slice())
    }
}
