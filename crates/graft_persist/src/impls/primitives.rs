use alloc::boxed::Box;
use core::time::Duration;

use crate::clone::Cloner;
use crate::de::Deserializer;
use crate::error::{DecodeError, DecodeErrorKind, PersistError};
use crate::info::Shape;
use crate::persist::{Nullable, Persist, read_flagged, write_flagged};
use crate::ser::Serializer;

macro_rules! impl_persist_primitive {
    ($($ty:ty => $shape:ident, $write:ident, $read:ident;)*) => {
        $(
            impl Persist for $ty {
                #[inline]
                fn shape() -> Shape {
                    Shape::$shape
                }

                #[inline]
                fn write(&self, ser: &mut Serializer) {
                    ser.writer().$write(*self);
                }

                #[inline]
                fn read(de: &mut Deserializer<'_>) -> Result<Self, PersistError> {
                    Ok(de.reader().$read()?)
                }

                #[inline]
                fn deep_clone(&self, _: &mut Cloner<'_>) -> Result<Self, PersistError> {
                    Ok(*self)
                }
            }

            impl Nullable for $ty {
                fn option_shape() -> Shape {
                    Shape::Nullable(Box::new(Shape::$shape))
                }

                #[inline]
                fn write_option(value: Option<&Self>, ser: &mut Serializer) {
                    write_flagged(value, ser);
                }

                #[inline]
                fn read_option(de: &mut Deserializer<'_>) -> Result<Option<Self>, PersistError> {
                    read_flagged(de)
                }
            }
        )*
    };
}

impl_persist_primitive! {
    i8 => SByte, write_i8, read_i8;
    u8 => Byte, write_u8, read_u8;
    i16 => Short, write_i16, read_i16;
    u16 => UShort, write_u16, read_u16;
    i32 => Int, write_i32, read_i32;
    u32 => UInt, write_u32, read_u32;
    i64 => Long, write_i64, read_i64;
    u64 => ULong, write_u64, read_u64;
    f32 => Float, write_f32, read_f32;
    f64 => Double, write_f64, read_f64;
    bool => Bool, write_bool, read_bool;
    char => Char, write_char, read_char;
}

// -----------------------------------------------------------------------------
// Duration

const NANOS_PER_SEC: u32 = 1_000_000_000;

impl Persist for Duration {
    #[inline]
    fn shape() -> Shape {
        Shape::Duration
    }

    /// Written as whole seconds (`u64`) followed by the sub-second
    /// nanoseconds (`u32`).
    fn write(&self, ser: &mut Serializer) {
        let writer = ser.writer();
        writer.write_u64(self.as_secs());
        writer.write_u32(self.subsec_nanos());
    }

    fn read(de: &mut Deserializer<'_>) -> Result<Self, PersistError> {
        let start = de.position();
        let secs = de.reader().read_u64()?;
        let nanos = de.reader().read_u32()?;
        if nanos >= NANOS_PER_SEC {
            let kind = DecodeErrorKind::InvalidValue {
                shape: Shape::Duration,
            };
            return Err(DecodeError::at(kind, start).into());
        }
        Ok(Duration::new(secs, nanos))
    }

    #[inline]
    fn deep_clone(&self, _: &mut Cloner<'_>) -> Result<Self, PersistError> {
        Ok(*self)
    }
}

impl Nullable for Duration {
    fn option_shape() -> Shape {
        Shape::Nullable(Box::new(Shape::Duration))
    }

    #[inline]
    fn write_option(value: Option<&Self>, ser: &mut Serializer) {
        write_flagged(value, ser);
    }

    #[inline]
    fn read_option(de: &mut Deserializer<'_>) -> Result<Option<Self>, PersistError> {
        read_flagged(de)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use core::time::Duration;

    use crate::error::DecodeErrorKind;
    use crate::{Deserializer, Options, Persist, Serializer, TypeRegistry};

    fn round_trip<T: Persist>(value: &T) -> T {
        let mut ser = Serializer::new(Options::default());
        ser.write_root(value);
        let registry = TypeRegistry::new();
        Deserializer::new(ser.as_bytes(), &registry, Options::default())
            .read_root()
            .unwrap()
    }

    #[test]
    fn scalars() {
        assert_eq!(round_trip(&-5_i8), -5);
        assert_eq!(round_trip(&u64::MAX), u64::MAX);
        assert_eq!(round_trip(&0.25_f32), 0.25);
        assert_eq!(round_trip(&'ß'), 'ß');
        assert!(round_trip(&true));
    }

    #[test]
    fn nullable_primitives() {
        let mut ser = Serializer::new(Options::default());
        Some(7_i16).write(&mut ser);
        None::<i16>.write(&mut ser);
        assert_eq!(ser.as_bytes(), &[0, 7, 0, 1]);

        let values = vec![Some(1_u32), None, Some(3)];
        assert_eq!(round_trip(&values), values);
    }

    #[test]
    fn duration_is_exact() {
        let mut ser = Serializer::new(Options::default());
        Duration::new(2, 7).write(&mut ser);
        let mut expected = 2_u64.to_le_bytes().to_vec();
        expected.extend_from_slice(&7_u32.to_le_bytes());
        assert_eq!(ser.as_bytes(), expected.as_slice());

        for value in [
            Duration::new(3, 550),
            Duration::from_nanos(1),
            Duration::MAX,
        ] {
            assert_eq!(round_trip(&value), value);
        }
        assert_eq!(round_trip(&Some(Duration::new(0, 999_999_999))), Some(Duration::new(0, 999_999_999)));
    }

    #[test]
    fn out_of_range_nanos_are_invalid() {
        let mut bytes: Vec<u8> = vec![19];
        bytes.extend_from_slice(&1_u64.to_le_bytes());
        bytes.extend_from_slice(&1_000_000_000_u32.to_le_bytes());
        let registry = TypeRegistry::new();
        let err = Deserializer::new(&bytes, &registry, Options::default())
            .read_root::<Duration>()
            .unwrap_err();
        assert!(matches!(
            err.decode_kind(),
            Some(DecodeErrorKind::InvalidValue { .. })
        ));
    }
}
