use crate::clone::Cloner;
use crate::de::Deserializer;
use crate::error::PersistError;
use crate::info::Shape;
use crate::ser::Serializer;

// -----------------------------------------------------------------------------
// Persist

/// A value that can be written, read and deep-cloned.
///
/// Implemented for primitives, strings, collections, boxed and shared
/// records, and by `#[derive(Persist)]` for classes.
pub trait Persist: Sized + Send + Sync + 'static {
    /// The wire shape recorded in class headers for fields of this type.
    fn shape() -> Shape;

    fn write(&self, ser: &mut Serializer);

    fn read(de: &mut Deserializer<'_>) -> Result<Self, PersistError>;

    /// Produces an independent copy.
    ///
    /// Owned data is copied; shared resources follow the clone policy of
    /// their type.
    fn deep_clone(&self, cl: &mut Cloner<'_>) -> Result<Self, PersistError>;
}

// -----------------------------------------------------------------------------
// Nullable

/// A type whose absence has its own encoding, which makes `Option<Self>`
/// persistable.
///
/// - records: class id `0`;
/// - strings: an empty string followed by a `true` null flag;
/// - collections: the count `-1`;
/// - primitives: a leading `true` null flag.
pub trait Nullable: Persist {
    fn option_shape() -> Shape;

    fn write_option(value: Option<&Self>, ser: &mut Serializer);

    fn read_option(de: &mut Deserializer<'_>) -> Result<Option<Self>, PersistError>;
}

impl<T: Nullable> Persist for Option<T> {
    #[inline]
    fn shape() -> Shape {
        T::option_shape()
    }

    #[inline]
    fn write(&self, ser: &mut Serializer) {
        T::write_option(self.as_ref(), ser);
    }

    #[inline]
    fn read(de: &mut Deserializer<'_>) -> Result<Self, PersistError> {
        T::read_option(de)
    }

    fn deep_clone(&self, cl: &mut Cloner<'_>) -> Result<Self, PersistError> {
        match self {
            Some(value) => Ok(Some(value.deep_clone(cl)?)),
            None => Ok(None),
        }
    }
}

// -----------------------------------------------------------------------------
// Null flag helpers

/// Writes `[is_null: bool] [value]?`.
pub(crate) fn write_flagged<T: Persist>(value: Option<&T>, ser: &mut Serializer) {
    ser.writer().write_bool(value.is_none());
    if let Some(value) = value {
        value.write(ser);
    }
}

pub(crate) fn read_flagged<T: Persist>(de: &mut Deserializer<'_>) -> Result<Option<T>, PersistError> {
    if de.reader().read_bool()? {
        Ok(None)
    } else {
        T::read(de).map(Some)
    }
}
