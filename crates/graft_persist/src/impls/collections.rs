use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};
use std::collections::HashMap;

use crate::clone::Cloner;
use crate::de::Deserializer;
use crate::error::PersistError;
use crate::info::Shape;
use crate::persist::{Nullable, Persist};
use crate::ser::Serializer;

// Collections are written as `[count: i32] [item]*`; the count `-1` is a
// null collection, which is distinct from an empty one.

// -----------------------------------------------------------------------------
// Vec

fn read_items<T: Persist>(de: &mut Deserializer<'_>) -> Result<Option<Vec<T>>, PersistError> {
    let Some(count) = de.reader().read_count()? else {
        return Ok(None);
    };
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(T::read(de)?);
    }
    Ok(Some(items))
}

impl<T: Persist> Persist for Vec<T> {
    fn shape() -> Shape {
        Shape::Sequence(Box::new(T::shape()))
    }

    fn write(&self, ser: &mut Serializer) {
        ser.writer().write_count(Some(self.len()));
        for item in self {
            item.write(ser);
        }
    }

    fn read(de: &mut Deserializer<'_>) -> Result<Self, PersistError> {
        match read_items(de)? {
            Some(items) => Ok(items),
            None => {
                log::warn!("null read into a `Vec<{}>`, using an empty list", T::shape());
                Ok(Vec::new())
            }
        }
    }

    fn deep_clone(&self, cl: &mut Cloner<'_>) -> Result<Self, PersistError> {
        self.iter().map(|item| item.deep_clone(cl)).collect()
    }
}

impl<T: Persist> Nullable for Vec<T> {
    #[inline]
    fn option_shape() -> Shape {
        Self::shape()
    }

    fn write_option(value: Option<&Self>, ser: &mut Serializer) {
        match value {
            Some(value) => value.write(ser),
            None => ser.writer().write_count(None),
        }
    }

    #[inline]
    fn read_option(de: &mut Deserializer<'_>) -> Result<Option<Self>, PersistError> {
        read_items(de)
    }
}

// -----------------------------------------------------------------------------
// Maps

fn map_shape<K: Persist, V: Persist>() -> Shape {
    Shape::Mapping(Box::new(K::shape()), Box::new(V::shape()))
}

fn write_entries<'a, K, V>(
    len: usize,
    entries: impl Iterator<Item = (&'a K, &'a V)>,
    ser: &mut Serializer,
) where
    K: Persist,
    V: Persist,
{
    ser.writer().write_count(Some(len));
    for (key, value) in entries {
        key.write(ser);
        value.write(ser);
    }
}

fn read_entries<K, V, M>(de: &mut Deserializer<'_>) -> Result<Option<M>, PersistError>
where
    K: Persist,
    V: Persist,
    M: Default + Extend<(K, V)>,
{
    let Some(count) = de.reader().read_count()? else {
        return Ok(None);
    };
    let mut map = M::default();
    for _ in 0..count {
        let key = K::read(de)?;
        let value = V::read(de)?;
        map.extend(Some((key, value)));
    }
    Ok(Some(map))
}

fn clone_entries<'a, K, V, M>(
    entries: impl Iterator<Item = (&'a K, &'a V)>,
    cl: &mut Cloner<'_>,
) -> Result<M, PersistError>
where
    K: Persist,
    V: Persist,
    M: FromIterator<(K, V)>,
{
    entries
        .map(|(key, value)| Ok((key.deep_clone(cl)?, value.deep_clone(cl)?)))
        .collect()
}

macro_rules! impl_persist_map {
    ($($ty:ty where [$($bounds:tt)*];)*) => {
        $(
            impl<$($bounds)*> Persist for $ty {
                #[inline]
                fn shape() -> Shape {
                    map_shape::<K, V>()
                }

                fn write(&self, ser: &mut Serializer) {
                    write_entries(self.len(), self.iter(), ser);
                }

                fn read(de: &mut Deserializer<'_>) -> Result<Self, PersistError> {
                    match read_entries(de)? {
                        Some(map) => Ok(map),
                        None => {
                            log::warn!("null read into a `{}`, using an empty map", Self::shape());
                            Ok(Self::default())
                        }
                    }
                }

                fn deep_clone(&self, cl: &mut Cloner<'_>) -> Result<Self, PersistError> {
                    clone_entries(self.iter(), cl)
                }
            }

            impl<$($bounds)*> Nullable for $ty {
                #[inline]
                fn option_shape() -> Shape {
                    map_shape::<K, V>()
                }

                fn write_option(value: Option<&Self>, ser: &mut Serializer) {
                    match value {
                        Some(value) => value.write(ser),
                        None => ser.writer().write_count(None),
                    }
                }

                #[inline]
                fn read_option(de: &mut Deserializer<'_>) -> Result<Option<Self>, PersistError> {
                    read_entries(de)
                }
            }
        )*
    };
}

impl_persist_map! {
    HashMap<K, V, S> where [
        K: Persist + Eq + Hash,
        V: Persist,
        S: BuildHasher + Default + Send + Sync + 'static
    ];
    graft_utils::hash::hashbrown::HashMap<K, V, S> where [
        K: Persist + Eq + Hash,
        V: Persist,
        S: BuildHasher + Default + Send + Sync + 'static
    ];
    BTreeMap<K, V> where [
        K: Persist + Ord,
        V: Persist
    ];
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec::Vec;

    use graft_utils::hash::HashMap;

    use crate::{Deserializer, Options, Persist, Serializer, TypeRegistry};

    fn encode<T: Persist>(value: &T) -> Vec<u8> {
        let mut ser = Serializer::new(Options::default());
        value.write(&mut ser);
        ser.into_bytes()
    }

    fn decode<T: Persist>(bytes: &[u8]) -> T {
        let registry = TypeRegistry::new();
        T::read(&mut Deserializer::new(bytes, &registry, Options::default())).unwrap()
    }

    #[test]
    fn empty_and_null_lists_are_distinct() {
        let empty: Option<Vec<u8>> = Some(Vec::new());
        let null: Option<Vec<u8>> = None;
        assert_eq!(encode(&empty), 0_i32.to_le_bytes());
        assert_eq!(encode(&null), (-1_i32).to_le_bytes());
        assert_eq!(decode::<Option<Vec<u8>>>(&encode(&empty)), empty);
        assert_eq!(decode::<Option<Vec<u8>>>(&encode(&null)), null);
    }

    #[test]
    fn nested_lists() {
        let value = vec![vec![String::from("a")], Vec::new(), vec![String::new()]];
        assert_eq!(decode::<Vec<Vec<String>>>(&encode(&value)), value);
    }

    #[test]
    fn maps() {
        let mut tree = BTreeMap::new();
        tree.insert(2_u8, String::from("two"));
        tree.insert(1_u8, String::new());
        assert_eq!(decode::<BTreeMap<u8, String>>(&encode(&tree)), tree);

        let mut hashed: HashMap<String, Option<i32>> = HashMap::default();
        hashed.insert("a".into(), Some(1));
        hashed.insert("b".into(), None);
        assert_eq!(decode::<HashMap<String, Option<i32>>>(&encode(&hashed)), hashed);

        let null: Option<BTreeMap<u8, u8>> = None;
        assert_eq!(decode::<Option<BTreeMap<u8, u8>>>(&encode(&null)), None);
    }

    #[test]
    fn count_larger_than_input() {
        let registry = TypeRegistry::new();
        let bytes = 1000_i32.to_le_bytes();
        let err = Vec::<u8>::read(&mut Deserializer::new(&bytes, &registry, Options::default()))
            .unwrap_err();
        assert!(matches!(
            err.decode_kind(),
            Some(crate::DecodeErrorKind::BadCount { count: 1000 })
        ));
    }

    #[test]
    fn any_negative_count_is_null() {
        let registry = TypeRegistry::new();
        let mut bytes = vec![33, 2];
        bytes.extend_from_slice(&(-2_i32).to_le_bytes());
        let list = Deserializer::new(&bytes, &registry, Options::default())
            .read_root::<Option<Vec<u8>>>()
            .unwrap();
        assert_eq!(list, None);
    }
}
