use alloc::borrow::ToOwned;
use alloc::string::String;

use crate::clone::Cloner;
use crate::de::Deserializer;
use crate::error::PersistError;
use crate::info::Shape;
use crate::persist::{Nullable, Persist};
use crate::ser::Serializer;

// An empty string is followed by a flag telling `""` (false) from null
// (true). Non-empty strings carry no flag.

fn write_string(value: Option<&str>, ser: &mut Serializer) {
    let writer = ser.writer();
    match value {
        Some(value) => {
            writer.write_str(value);
            if value.is_empty() {
                writer.write_bool(false);
            }
        }
        None => {
            writer.write_str("");
            writer.write_bool(true);
        }
    }
}

fn read_string(de: &mut Deserializer<'_>) -> Result<Option<String>, PersistError> {
    let reader = de.reader();
    let value = reader.read_str()?;
    if !value.is_empty() {
        return Ok(Some(value.to_owned()));
    }
    if reader.read_bool()? {
        Ok(None)
    } else {
        Ok(Some(String::new()))
    }
}

impl Persist for String {
    #[inline]
    fn shape() -> Shape {
        Shape::String
    }

    #[inline]
    fn write(&self, ser: &mut Serializer) {
        write_string(Some(self), ser);
    }

    fn read(de: &mut Deserializer<'_>) -> Result<Self, PersistError> {
        match read_string(de)? {
            Some(value) => Ok(value),
            None => {
                log::warn!("null read into a `String`, using an empty string");
                Ok(String::new())
            }
        }
    }

    #[inline]
    fn deep_clone(&self, _: &mut Cloner<'_>) -> Result<Self, PersistError> {
        Ok(self.clone())
    }
}

impl Nullable for String {
    #[inline]
    fn option_shape() -> Shape {
        Shape::String
    }

    #[inline]
    fn write_option(value: Option<&Self>, ser: &mut Serializer) {
        write_string(value.map(String::as_str), ser);
    }

    #[inline]
    fn read_option(de: &mut Deserializer<'_>) -> Result<Option<Self>, PersistError> {
        read_string(de)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use crate::{Deserializer, Options, Persist, Serializer, TypeRegistry};

    fn encode<T: Persist>(value: &T) -> alloc::vec::Vec<u8> {
        let mut ser = Serializer::new(Options::default());
        value.write(&mut ser);
        ser.into_bytes()
    }

    fn decode<T: Persist>(bytes: &[u8]) -> T {
        let registry = TypeRegistry::new();
        T::read(&mut Deserializer::new(bytes, &registry, Options::default())).unwrap()
    }

    #[test]
    fn empty_and_null_are_distinct() {
        let empty = Some(String::new());
        let null: Option<String> = None;
        assert_eq!(encode(&empty), [0, 0]);
        assert_eq!(encode(&null), [0, 1]);
        assert_eq!(decode::<Option<String>>(&encode(&empty)), empty);
        assert_eq!(decode::<Option<String>>(&encode(&null)), null);
    }

    #[test]
    fn non_empty_has_no_flag() {
        assert_eq!(encode(&String::from("ab")), [2, b'a', b'b']);
        assert_eq!(decode::<String>(&[2, b'a', b'b']), "ab");
    }

    #[test]
    fn null_into_plain_string_is_empty() {
        assert_eq!(decode::<String>(&[0, 1]), "");
    }
}
