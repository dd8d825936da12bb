use alloc::boxed::Box;
use alloc::sync::Arc;

use crate::clone::Cloner;
use crate::de::Deserializer;
use crate::error::{DecodeError, DecodeErrorKind, PersistError};
use crate::info::Shape;
use crate::object::Object;
use crate::persist::{Nullable, Persist};
use crate::record::Record;
use crate::ser::Serializer;

// Pointers to records are written inline as the record itself. Shared
// instances are not deduplicated on the wire; identity is only kept by
// clone sessions.

// -----------------------------------------------------------------------------
// Static record types

impl<T: Record> Persist for Box<T> {
    #[inline]
    fn shape() -> Shape {
        Shape::Record
    }

    #[inline]
    fn write(&self, ser: &mut Serializer) {
        ser.write_record(&**self);
    }

    #[inline]
    fn read(de: &mut Deserializer<'_>) -> Result<Self, PersistError> {
        de.read_record_or_default::<T>().map(Box::new)
    }

    #[inline]
    fn deep_clone(&self, cl: &mut Cloner<'_>) -> Result<Self, PersistError> {
        cl.clone_record(&**self).map(Box::new)
    }
}

impl<T: Record> Nullable for Box<T> {
    #[inline]
    fn option_shape() -> Shape {
        Shape::Record
    }

    fn write_option(value: Option<&Self>, ser: &mut Serializer) {
        match value {
            Some(value) => ser.write_record(&**value),
            None => ser.write_null(),
        }
    }

    #[inline]
    fn read_option(de: &mut Deserializer<'_>) -> Result<Option<Self>, PersistError> {
        Ok(de.read_record::<T>()?.map(Box::new))
    }
}

impl<T: Record> Persist for Arc<T> {
    #[inline]
    fn shape() -> Shape {
        Shape::Record
    }

    #[inline]
    fn write(&self, ser: &mut Serializer) {
        ser.write_record(&**self);
    }

    #[inline]
    fn read(de: &mut Deserializer<'_>) -> Result<Self, PersistError> {
        de.read_record_or_default::<T>().map(Arc::new)
    }

    #[inline]
    fn deep_clone(&self, cl: &mut Cloner<'_>) -> Result<Self, PersistError> {
        cl.clone_shared(self)
    }
}

impl<T: Record> Nullable for Arc<T> {
    #[inline]
    fn option_shape() -> Shape {
        Shape::Record
    }

    fn write_option(value: Option<&Self>, ser: &mut Serializer) {
        match value {
            Some(value) => ser.write_record(&**value),
            None => ser.write_null(),
        }
    }

    #[inline]
    fn read_option(de: &mut Deserializer<'_>) -> Result<Option<Self>, PersistError> {
        Ok(de.read_record::<T>()?.map(Arc::new))
    }
}

// -----------------------------------------------------------------------------
// Polymorphic records

fn read_non_null(de: &mut Deserializer<'_>) -> Result<Box<dyn Object>, PersistError> {
    let start = de.position();
    match de.read_object()? {
        Some(object) => Ok(object),
        None => {
            let kind = DecodeErrorKind::UnexpectedNull {
                expected: "dyn Object".into(),
            };
            Err(DecodeError::at(kind, start).into())
        }
    }
}

impl Persist for Box<dyn Object> {
    #[inline]
    fn shape() -> Shape {
        Shape::Record
    }

    #[inline]
    fn write(&self, ser: &mut Serializer) {
        ser.write_object(&**self);
    }

    #[inline]
    fn read(de: &mut Deserializer<'_>) -> Result<Self, PersistError> {
        read_non_null(de)
    }

    #[inline]
    fn deep_clone(&self, cl: &mut Cloner<'_>) -> Result<Self, PersistError> {
        cl.deep_object(&**self)
    }
}

impl Nullable for Box<dyn Object> {
    #[inline]
    fn option_shape() -> Shape {
        Shape::Record
    }

    fn write_option(value: Option<&Self>, ser: &mut Serializer) {
        match value {
            Some(value) => ser.write_object(&**value),
            None => ser.write_null(),
        }
    }

    #[inline]
    fn read_option(de: &mut Deserializer<'_>) -> Result<Option<Self>, PersistError> {
        de.read_object()
    }
}

impl Persist for Arc<dyn Object> {
    #[inline]
    fn shape() -> Shape {
        Shape::Record
    }

    #[inline]
    fn write(&self, ser: &mut Serializer) {
        ser.write_object(&**self);
    }

    #[inline]
    fn read(de: &mut Deserializer<'_>) -> Result<Self, PersistError> {
        read_non_null(de).map(Arc::from)
    }

    #[inline]
    fn deep_clone(&self, cl: &mut Cloner<'_>) -> Result<Self, PersistError> {
        cl.clone_shared_object(self)
    }
}

impl Nullable for Arc<dyn Object> {
    #[inline]
    fn option_shape() -> Shape {
        Shape::Record
    }

    fn write_option(value: Option<&Self>, ser: &mut Serializer) {
        match value {
            Some(value) => ser.write_object(&**value),
            None => ser.write_null(),
        }
    }

    #[inline]
    fn read_option(de: &mut Deserializer<'_>) -> Result<Option<Self>, PersistError> {
        Ok(de.read_object()?.map(Arc::from))
    }
}
