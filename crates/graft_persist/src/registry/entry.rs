use alloc::boxed::Box;
use alloc::string::ToString;
use core::any::TypeId;
use core::fmt;

use crate::clone::Cloner;
use crate::de::{ClassDef, Deserializer};
use crate::error::{DecodeErrorKind, PersistError};
use crate::info::ClassInfo;
use crate::object::Object;
use crate::record::Record;

// -----------------------------------------------------------------------------
// Function pointers

/// Allocates an instance and reads its body.
pub type MakeFn =
    fn(&mut Deserializer<'_>, &ClassDef) -> Result<Box<dyn Object>, PersistError>;

/// Reads a body into an existing instance.
pub type ReadFn =
    fn(&mut Deserializer<'_>, &ClassDef, &mut dyn Object) -> Result<(), PersistError>;

/// Deep-clones an instance.
pub type CloneFn = fn(&mut Cloner<'_>, &dyn Object) -> Result<Box<dyn Object>, PersistError>;

// -----------------------------------------------------------------------------
// ClonePolicy

/// How a shared (`Arc`) slot is cloned.
///
/// Within one clone session every slot pointing at the same source
/// instance resolves to the same result, whichever policy applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClonePolicy {
    /// One deep copy per source instance.
    Deep,
    /// The clone points at the source instance.
    Share,
}

impl ClonePolicy {
    /// `Share` for classes marked as resources, `Deep` otherwise.
    #[inline]
    pub const fn for_class(info: &ClassInfo) -> Self {
        if info.is_resource() {
            Self::Share
        } else {
            Self::Deep
        }
    }
}

// -----------------------------------------------------------------------------
// TypeEntry

/// The dispatch entry of one registered type.
#[derive(Clone, Copy)]
pub struct TypeEntry {
    type_id: TypeId,
    info: &'static ClassInfo,
    make: MakeFn,
    read: ReadFn,
    clone: CloneFn,
    policy: ClonePolicy,
}

impl TypeEntry {
    /// The default entry of `T`.
    pub fn of<T: Record>() -> Self {
        let info = T::class_info();
        Self {
            type_id: TypeId::of::<T>(),
            info,
            make: make_record::<T>,
            read: read_record::<T>,
            clone: clone_record::<T>,
            policy: ClonePolicy::for_class(info),
        }
    }

    #[inline]
    pub fn with_cloner(mut self, clone: CloneFn) -> Self {
        self.clone = clone;
        self
    }

    #[inline]
    pub fn with_policy(mut self, policy: ClonePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn info(&self) -> &'static ClassInfo {
        self.info
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.info.type_path()
    }

    #[inline]
    pub fn make_fn(&self) -> MakeFn {
        self.make
    }

    #[inline]
    pub fn read_fn(&self) -> ReadFn {
        self.read
    }

    #[inline]
    pub fn clone_fn(&self) -> CloneFn {
        self.clone
    }

    #[inline]
    pub fn policy(&self) -> ClonePolicy {
        self.policy
    }
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("type_path", &self.type_path())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Default handlers

fn make_record<T: Record>(
    de: &mut Deserializer<'_>,
    def: &ClassDef,
) -> Result<Box<dyn Object>, PersistError> {
    let mut value = T::default();
    de.read_body(def, &mut value)?;
    Ok(Box::new(value))
}

fn read_record<T: Record>(
    de: &mut Deserializer<'_>,
    def: &ClassDef,
    target: &mut dyn Object,
) -> Result<(), PersistError> {
    let found = target.type_path();
    match target.downcast_mut::<T>() {
        Some(target) => de.read_body(def, target),
        None => Err(DecodeErrorKind::TypeMismatch {
            expected: T::class_info().type_path().to_string(),
            found: found.to_string(),
        }
        .into()),
    }
}

fn clone_record<T: Record>(
    cl: &mut Cloner<'_>,
    src: &dyn Object,
) -> Result<Box<dyn Object>, PersistError> {
    cl.clone_as::<T>(src)
}
