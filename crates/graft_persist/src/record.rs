use crate::clone::Cloner;
use crate::de::Deserializer;
use crate::error::PersistError;
use crate::info::ClassInfo;
use crate::object::Object;
use crate::persist::Persist;
use crate::ser::Serializer;

/// A class: a named set of fields with a static layout.
///
/// This is the contract `#[derive(Persist)]` expands a struct into. The
/// engine drives the framing (class ids, headers, ordinals, terminator);
/// a `Record` only knows how to handle its own fields.
///
/// # Example
///
/// ```
/// use graft_persist::{Persist, Record};
///
/// #[derive(Persist, Default)]
/// #[persist(type_path = "scene::Label")]
/// struct Label {
///     text: String,
///     #[persist(required)]
///     id: u32,
/// }
///
/// let info = Label::class_info();
/// assert_eq!(info.type_path(), "scene::Label");
/// // Fields are kept in tag order.
/// assert_eq!(info.fields()[0].tag(), "id");
/// assert!(info.fields()[0].is_required());
/// ```
pub trait Record: Object + Persist + Default {
    fn class_info() -> &'static ClassInfo;

    /// Writes `[ordinal, value]` for every participating field, or the bare
    /// values of all fields for compact classes.
    fn write_fields(&self, ser: &mut Serializer);

    /// Reads the field at `index` in [`ClassInfo::fields`].
    fn read_field(&mut self, index: usize, de: &mut Deserializer<'_>) -> Result<(), PersistError>;

    /// Builds the clone's fields. Fields excluded by their predicate keep
    /// their default.
    fn clone_fields(&self, cl: &mut Cloner<'_>) -> Result<Self, PersistError>;

    /// Runs before the instance is written or cloned.
    #[inline]
    fn before_serialization(&self) {}

    /// Runs after the instance was written or cloned.
    #[inline]
    fn after_serialization(&self) {}

    /// Runs on a fully read instance, and on a fresh clone, before it is
    /// handed to its parent.
    #[inline]
    fn after_deserialization(&mut self) {}
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::sync::atomic::{AtomicU32, Ordering};

    use super::Record;
    use crate::info::{ClassKind, FieldFlags};
    use crate::{Cloner, DecodeErrorKind, Deserializer, Options, Persist, Serializer, TypeRegistry};

    fn encode<T: Persist>(value: &T) -> Vec<u8> {
        let mut ser = Serializer::new(Options::default());
        ser.write_root(value);
        ser.into_bytes()
    }

    fn decode<T: Persist>(bytes: &[u8]) -> T {
        let registry = TypeRegistry::new();
        Deserializer::new(bytes, &registry, Options::default())
            .read_root()
            .unwrap()
    }

    fn deep<T: Persist>(value: &T) -> T {
        let registry = TypeRegistry::new();
        Cloner::new(&registry).clone_value(value).unwrap()
    }

    #[derive(Persist, Debug, PartialEq)]
    #[persist(type_path = "t::Light")]
    struct Light {
        #[persist(rename = "color")]
        tint: u32,
        #[persist(member)]
        intensity: f32,
        #[persist(serialize_if = Light::is_enabled)]
        target: Option<String>,
        enabled: bool,
        #[persist(skip)]
        cache: Vec<u8>,
    }

    impl Default for Light {
        fn default() -> Self {
            Self {
                tint: 0xffffff,
                intensity: 1.0,
                target: None,
                enabled: true,
                cache: Vec::new(),
            }
        }
    }

    impl Light {
        fn is_enabled(&self) -> bool {
            self.enabled
        }
    }

    #[test]
    fn class_info_follows_attributes() {
        let info = Light::class_info();
        let tags: Vec<_> = info.fields().iter().map(|field| field.tag()).collect();
        assert_eq!(tags, ["color", "enabled", "intensity", "target"]);
        assert_eq!(info.fields()[0].name(), "tint");
        assert_eq!(info.fields()[2].flags(), FieldFlags::MEMBER);
        assert_eq!(info.fields()[3].flags(), FieldFlags::CONDITIONAL);
        assert_eq!(info.kind(), ClassKind::Reference);
        assert!(!info.is_compact());
    }

    #[test]
    fn member_field_omitted_at_default() {
        let plain = Light::default();
        let bright = Light {
            intensity: 2.5,
            ..Light::default()
        };
        assert_eq!(encode(&bright).len(), encode(&plain).len() + 2 + 4);
        assert_eq!(decode::<Light>(&encode(&plain)).intensity, 1.0);
        assert_eq!(decode::<Light>(&encode(&bright)).intensity, 2.5);
    }

    #[test]
    fn predicate_excludes_field_from_write_and_clone() {
        let off = Light {
            target: Some("door".into()),
            enabled: false,
            ..Light::default()
        };
        assert_eq!(decode::<Light>(&encode(&off)).target, None);
        assert_eq!(deep(&off).target, None);

        let on = Light {
            target: Some("door".into()),
            ..Light::default()
        };
        assert_eq!(decode::<Light>(&encode(&on)), on);
        assert_eq!(deep(&on), on);
    }

    #[test]
    fn skipped_field_is_not_carried() {
        let light = Light {
            cache: vec![1, 2, 3],
            ..Light::default()
        };
        assert!(decode::<Light>(&encode(&light)).cache.is_empty());
        assert!(deep(&light).cache.is_empty());
    }

    #[derive(Persist, Default, Debug, PartialEq)]
    #[persist(type_path = "t::Pair", compact)]
    struct Pair {
        a: u8,
        b: i16,
    }

    #[test]
    fn compact_body_is_bare_values() {
        assert!(Pair::class_info().is_compact());
        let pairs = vec![Pair { a: 7, b: -1 }, Pair { a: 3, b: 4 }];
        let bytes = encode(&pairs);
        // Second element: known class id, then the values.
        assert!(bytes.ends_with(&[1, 0, 3, 4, 0]));
        assert_eq!(decode::<Vec<Pair>>(&bytes), pairs);
    }

    #[derive(Persist, Default, Debug, Clone, PartialEq)]
    #[persist(type_path = "t::Point", value)]
    struct Point {
        x: i32,
        #[persist(skip)]
        label: String,
    }

    #[test]
    fn value_class_clones_structurally() {
        assert_eq!(Point::class_info().kind(), ClassKind::Value);
        let point = Point {
            x: 4,
            label: "origin".into(),
        };
        assert_eq!(deep(&point), point);
        assert!(decode::<Point>(&encode(&point)).label.is_empty());
    }

    #[derive(Persist, Default)]
    #[persist(
        type_path = "t::Counted",
        before_serialization = Counted::on_write_start,
        after_serialization = Counted::on_write_end,
        after_deserialization = Counted::on_loaded,
    )]
    struct Counted {
        value: i32,
        #[persist(skip)]
        started: AtomicU32,
        #[persist(skip)]
        finished: AtomicU32,
        #[persist(skip)]
        loaded: bool,
    }

    impl Counted {
        fn on_write_start(&self) {
            self.started.fetch_add(1, Ordering::Relaxed);
        }

        fn on_write_end(&self) {
            self.finished.fetch_add(1, Ordering::Relaxed);
        }

        fn on_loaded(&mut self) {
            self.loaded = true;
        }
    }

    #[test]
    fn hooks_run_around_write_read_and_clone() {
        let source = Counted {
            value: 12,
            ..Counted::default()
        };
        let back: Counted = decode(&encode(&source));
        assert_eq!(source.started.load(Ordering::Relaxed), 1);
        assert_eq!(source.finished.load(Ordering::Relaxed), 1);
        assert!(back.loaded);
        assert_eq!(back.value, 12);

        let copy = deep(&source);
        assert_eq!(source.started.load(Ordering::Relaxed), 2);
        assert_eq!(source.finished.load(Ordering::Relaxed), 2);
        assert!(copy.loaded);
        assert!(!source.loaded);
        assert_eq!(copy.started.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn out_of_range_field_index() {
        let registry = TypeRegistry::new();
        let mut de = Deserializer::new(&[], &registry, Options::default());
        let err = Light::default().read_field(9, &mut de).unwrap_err();
        assert!(matches!(
            err.decode_kind(),
            Some(DecodeErrorKind::BadFieldIndex { index: 9, .. })
        ));
    }

    #[derive(Persist, Default)]
    struct Unnamed {
        x: u8,
    }

    #[test]
    fn default_type_path_is_module_qualified() {
        assert_eq!(
            Unnamed::class_info().type_path(),
            concat!(module_path!(), "::Unnamed")
        );
        assert_eq!(decode::<Unnamed>(&encode(&Unnamed { x: 5 })).x, 5);
    }
}
