use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::{Any, TypeId};
use core::fmt;

use crate::clone::Cloner;
use crate::error::PersistError;
use crate::info::ClassInfo;
use crate::ser::Serializer;

// -----------------------------------------------------------------------------
// Object

/// A persisted class instance behind a trait object.
///
/// `Object` is what polymorphic slots (`Box<dyn Object>`,
/// `Arc<dyn Object>`) hold. The stored instance always knows its exact
/// runtime type, so writing and cloning dispatch on that type rather than
/// on the declared slot type.
///
/// Implemented by `#[derive(Persist)]`; there is rarely a reason to
/// implement it by hand.
pub trait Object: Any + Send + Sync {
    /// Layout of the runtime type.
    fn class(&self) -> &'static ClassInfo;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// Writes this instance as a record of its runtime type.
    fn write_object(&self, ser: &mut Serializer);

    /// Deep-clones this instance as its runtime type.
    ///
    /// This is the fallback used when the dispatch registry has no entry for
    /// the runtime type, which keeps clones of unregistered types exact.
    fn clone_object(&self, cl: &mut Cloner<'_>) -> Result<Box<dyn Object>, PersistError>;
}

impl dyn Object {
    /// The [`TypeId`] of the runtime type.
    #[inline]
    pub fn object_type_id(&self) -> TypeId {
        self.as_any().type_id()
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.class().type_path()
    }

    #[inline]
    pub fn is<T: Object>(&self) -> bool {
        self.as_any().is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    #[inline]
    pub fn downcast_mut<T: Object>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }

    /// Takes the boxed value as `T`, handing the box back as
    /// `Box<dyn Any>` if the runtime type differs.
    #[inline]
    pub fn downcast<T: Object>(self: Box<Self>) -> Result<Box<T>, Box<dyn Any>> {
        self.into_any().downcast()
    }

    /// Shared counterpart of [`downcast`](Self::downcast).
    #[inline]
    pub fn downcast_arc<T: Object>(
        self: Arc<Self>,
    ) -> Result<Arc<T>, Arc<dyn Any + Send + Sync>> {
        self.into_any_arc().downcast()
    }
}

impl fmt::Debug for dyn Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dyn Object({})", self.type_path())
    }
}
