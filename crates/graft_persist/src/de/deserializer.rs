use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::any::TypeId;
use core::ops::Range;

use crate::codec::BinaryReader;
use crate::de::{ClassDef, FieldSlot, Target};
use crate::error::{DecodeError, DecodeErrorKind, PersistError};
use crate::info::{ClassFlags, MAX_SHAPE_DEPTH, Shape};
use crate::object::Object;
use crate::options::{AUTO_SIGNATURE, Options};
use crate::persist::Persist;
use crate::record::Record;
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// Deserializer

/// A read session over one encoded buffer.
///
/// The session owns the class definitions read so far; they are never
/// shared with another session. Handlers for polymorphic records come from
/// the registry, which is only borrowed.
///
/// Every failure is fatal: on error no partially read value is returned.
///
/// ```
/// use graft_persist::{Deserializer, Options, Persist, Serializer, TypeRegistry};
///
/// #[derive(Persist, Default, Debug, PartialEq)]
/// #[persist(type_path = "scene::Point")]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let points = vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }];
/// let mut ser = Serializer::new(Options::default());
/// ser.write_root(&points);
///
/// let registry = TypeRegistry::new();
/// let mut de = Deserializer::new(ser.as_bytes(), &registry, Options::default());
/// let back: Vec<Point> = de.read_root().unwrap();
/// assert_eq!(back, points);
/// // One header for both points.
/// assert_eq!(de.class_def_count(), 1);
/// ```
pub struct Deserializer<'a> {
    reader: BinaryReader<'a>,
    registry: &'a TypeRegistry,
    options: Options,
    class_defs: Vec<Rc<ClassDef>>,
}

impl<'a> Deserializer<'a> {
    pub fn new(data: &'a [u8], registry: &'a TypeRegistry, options: Options) -> Self {
        Self {
            reader: BinaryReader::new(data),
            registry,
            options,
            class_defs: Vec::new(),
        }
    }

    /// The underlying primitive reader.
    #[inline]
    pub fn reader(&mut self) -> &mut BinaryReader<'a> {
        &mut self.reader
    }

    #[inline]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Number of class headers read in this session.
    #[inline]
    pub fn class_def_count(&self) -> usize {
        self.class_defs.len()
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    /// Forgets all class definitions; the next record starts a new session.
    #[inline]
    pub fn reset(&mut self) {
        self.class_defs.clear();
    }

    #[inline]
    fn error_at(&self, kind: DecodeErrorKind, position: usize) -> PersistError {
        DecodeError::at(kind, position).into()
    }

    /// Drops byte offsets from decode errors if the options ask for it.
    fn finish<T>(&self, result: Result<T, PersistError>) -> Result<T, PersistError> {
        match result {
            Err(PersistError::Decode(mut err)) if !self.options.report_error_position => {
                err.position = None;
                Err(PersistError::Decode(err))
            }
            other => other,
        }
    }

    // -------------------------------------------------------------------------
    // Roots

    fn read_preamble(&mut self, expected: &Shape) -> Result<(), PersistError> {
        if self.options.auto_signature {
            let start = self.reader.position();
            if self.reader.read_array::<4>()? != AUTO_SIGNATURE {
                return Err(self.error_at(DecodeErrorKind::BadSignature, start));
            }
        }
        let start = self.reader.position();
        let stored = Shape::read(&mut self.reader)?;
        if !expected.accepts(&stored) {
            let kind = DecodeErrorKind::TypeMismatch {
                expected: expected.to_string(),
                found: stored.to_string(),
            };
            return Err(self.error_at(kind, start));
        }
        Ok(())
    }

    /// Reads a top-level value written by
    /// [`Serializer::write_root`](crate::Serializer::write_root).
    pub fn read_root<T: Persist>(&mut self) -> Result<T, PersistError> {
        let result = self
            .read_preamble(&T::shape())
            .and_then(|()| T::read(self));
        self.finish(result)
    }

    /// Reads a top-level record of any registered type.
    pub fn read_root_object(&mut self) -> Result<Option<Box<dyn Object>>, PersistError> {
        let result = self
            .read_preamble(&Shape::Record)
            .and_then(|()| self.read_object());
        self.finish(result)
    }

    /// Reads a top-level record into an existing instance.
    ///
    /// Fields absent from the stream keep their current value.
    pub fn read_root_into<T: Record>(&mut self, target: &mut T) -> Result<(), PersistError> {
        let result = self.read_preamble(&Shape::Record).and_then(|()| {
            let start = self.reader.position();
            if self.read_record_into(target)? {
                Ok(())
            } else {
                let kind = DecodeErrorKind::UnexpectedNull {
                    expected: T::class_info().type_path().into(),
                };
                Err(self.error_at(kind, start))
            }
        });
        self.finish(result)
    }

    // -------------------------------------------------------------------------
    // Records

    /// Reads a record of static type `T`, `None` for a null record.
    pub fn read_record<T: Record>(&mut self) -> Result<Option<T>, PersistError> {
        let start = self.reader.position();
        let class_id = self.reader.read_i16()?;
        if class_id == 0 {
            return Ok(None);
        }
        let def = self.class_def(class_id, Some(Target::of::<T>(self.registry)), start)?;
        self.expect_type::<T>(&def, start)?;
        let mut value = T::default();
        self.read_body(&def, &mut value)?;
        Ok(Some(value))
    }

    /// Reads a record into a slot that cannot hold null; a null record
    /// yields `T::default()`.
    pub fn read_record_or_default<T: Record>(&mut self) -> Result<T, PersistError> {
        match self.read_record::<T>()? {
            Some(value) => Ok(value),
            None => {
                log::warn!(
                    "null read into non-nullable `{}`, using the default value",
                    T::class_info().type_path()
                );
                Ok(T::default())
            }
        }
    }

    /// Reads a record over the fields of `target`.
    ///
    /// Returns `false`, leaving `target` untouched, for a null record.
    pub fn read_record_into<T: Record>(&mut self, target: &mut T) -> Result<bool, PersistError> {
        let start = self.reader.position();
        let class_id = self.reader.read_i16()?;
        if class_id == 0 {
            return Ok(false);
        }
        let def = self.class_def(class_id, Some(Target::of::<T>(self.registry)), start)?;
        self.expect_type::<T>(&def, start)?;
        self.read_body(&def, target)?;
        Ok(true)
    }

    /// Reads a record of whatever type the stream names.
    ///
    /// The type is found in the registry by its type path; an unregistered
    /// type is a [`PersistError::Dispatch`] error.
    pub fn read_object(&mut self) -> Result<Option<Box<dyn Object>>, PersistError> {
        let start = self.reader.position();
        let class_id = self.reader.read_i16()?;
        if class_id == 0 {
            return Ok(None);
        }
        let def = self.class_def(class_id, None, start)?;
        let Some(entry) = def.entry() else {
            return Err(PersistError::Dispatch {
                type_path: def.type_path().into(),
            });
        };
        (entry.make_fn())(self, &def).map(Some)
    }

    /// Reads a record over an existing polymorphic instance, which must have
    /// the type the stream names.
    pub fn read_object_into(&mut self, target: &mut dyn Object) -> Result<bool, PersistError> {
        let start = self.reader.position();
        let class_id = self.reader.read_i16()?;
        if class_id == 0 {
            return Ok(false);
        }
        let hint = Target::of_object(target, self.registry);
        let def = self.class_def(class_id, Some(hint), start)?;
        if def.type_id() != Some(hint.type_id) {
            let kind = DecodeErrorKind::TypeMismatch {
                expected: target.type_path().into(),
                found: def.type_path().into(),
            };
            return Err(self.error_at(kind, start));
        }
        let Some(entry) = def.entry() else {
            return Err(PersistError::Dispatch {
                type_path: target.type_path().into(),
            });
        };
        (entry.read_fn())(self, &def, target)?;
        Ok(true)
    }

    fn expect_type<T: Record>(&self, def: &ClassDef, start: usize) -> Result<(), PersistError> {
        if def.type_id() == Some(TypeId::of::<T>()) {
            return Ok(());
        }
        let kind = DecodeErrorKind::TypeMismatch {
            expected: T::class_info().type_path().into(),
            found: def.type_path().into(),
        };
        Err(self.error_at(kind, start))
    }

    // -------------------------------------------------------------------------
    // Class definitions

    fn class_def(
        &mut self,
        class_id: i16,
        hint: Option<Target>,
        start: usize,
    ) -> Result<Rc<ClassDef>, PersistError> {
        let known = self.class_defs.len();
        match usize::try_from(class_id) {
            Ok(id) if (1..=known).contains(&id) => {
                let cached = &self.class_defs[id - 1];
                match hint {
                    Some(hint) if !cached.is_resolved() && hint.info.type_path() == cached.type_path() => {
                        let def = cached
                            .rebind(hint, self.options.allow_unknown_fields)
                            .map_err(|kind| self.error_at(kind, start))?;
                        let def = Rc::new(def);
                        self.class_defs[id - 1] = Rc::clone(&def);
                        Ok(def)
                    }
                    _ => Ok(Rc::clone(cached)),
                }
            }
            Ok(id) if id == known + 1 => self.read_class_header(hint, start),
            _ => Err(self.error_at(DecodeErrorKind::BadClassId { class_id, known }, start)),
        }
    }

    fn read_class_header(&mut self, hint: Option<Target>, start: usize) -> Result<Rc<ClassDef>, PersistError> {
        let type_path = self.reader.read_str()?.to_owned();
        let flags = ClassFlags::from_bits_retain(self.reader.read_u8()?);
        let count_at = self.reader.position();
        let count = self.reader.read_i16()?;
        let Ok(count) = usize::try_from(count) else {
            let kind = DecodeErrorKind::BadCount {
                count: i64::from(count),
            };
            return Err(self.error_at(kind, count_at));
        };

        // Each stored field takes at least two bytes.
        let mut stored = Vec::with_capacity(count.min(self.reader.remaining() / 2));
        for _ in 0..count {
            let tag = self.reader.read_str()?.to_owned();
            let shape = Shape::read(&mut self.reader)?;
            stored.push((tag, shape));
        }

        let target = match hint {
            Some(hint) if hint.info.type_path() == type_path => Some(hint),
            _ => self
                .registry
                .get_with_type_path(&type_path)
                .map(Target::from_entry),
        };
        let def = ClassDef::resolve(
            type_path,
            flags.contains(ClassFlags::COMPACT),
            stored,
            target,
            self.options.allow_unknown_fields,
        )
        .map_err(|kind| self.error_at(kind, start))?;

        log::trace!(
            "read class header {} of `{}` with {} field(s)",
            self.class_defs.len() + 1,
            def.type_path(),
            def.fields().len(),
        );
        let def = Rc::new(def);
        self.class_defs.push(Rc::clone(&def));
        Ok(def)
    }

    // -------------------------------------------------------------------------
    // Bodies

    /// Reads the body of a record whose class header is `def` into `value`,
    /// then runs its `after_deserialization` hook.
    ///
    /// `def` must be bound to `T`. This is the building block of custom
    /// [`MakeFn`](crate::registry::MakeFn) handlers.
    pub fn read_body<T: Record>(&mut self, def: &ClassDef, value: &mut T) -> Result<(), PersistError> {
        debug_assert_eq!(def.type_id(), Some(TypeId::of::<T>()));
        if def.is_compact() {
            for field in def.fields() {
                if let FieldSlot::Known(index) = field.slot() {
                    value.read_field(index, self)?;
                }
            }
        } else {
            self.read_fields(def, value)?;
        }
        value.after_deserialization();
        Ok(())
    }

    fn read_fields<T: Record>(&mut self, def: &ClassDef, value: &mut T) -> Result<(), PersistError> {
        let fields = def.fields();
        let mut next = 0;
        loop {
            let start = self.reader.position();
            let ordinal = self.reader.read_i16()?;
            if ordinal == 0 {
                break;
            }
            let index = self.field_index(def, ordinal, start)?;
            if index < next {
                let kind = DecodeErrorKind::OrdinalOutOfOrder {
                    class: def.type_path().into(),
                    ordinal,
                    previous: next,
                };
                return Err(self.error_at(kind, start));
            }
            self.check_omitted(def, next..index, start)?;
            match fields[index].slot() {
                FieldSlot::Known(local) => value.read_field(local, self)?,
                FieldSlot::Unknown => self.skip_value(fields[index].shape())?,
            }
            next = index + 1;
        }
        let end = self.reader.position();
        self.check_omitted(def, next..fields.len(), end)
    }

    /// Maps a non-zero ordinal to an index into `def.fields()`.
    fn field_index(&self, def: &ClassDef, ordinal: i16, start: usize) -> Result<usize, PersistError> {
        match usize::try_from(ordinal) {
            Ok(ordinal) if ordinal <= def.fields().len() => Ok(ordinal - 1),
            _ => {
                let kind = DecodeErrorKind::UnfinishedObject {
                    class: def.type_path().into(),
                    ordinal,
                };
                Err(self.error_at(kind, start))
            }
        }
    }

    fn check_omitted(&self, def: &ClassDef, range: Range<usize>, position: usize) -> Result<(), PersistError> {
        match def.fields()[range].iter().find(|field| field.is_required()) {
            Some(field) => {
                let kind = DecodeErrorKind::MissingField {
                    class: def.type_path().into(),
                    field: field.tag().into(),
                };
                Err(self.error_at(kind, position))
            }
            None => Ok(()),
        }
    }

    // -------------------------------------------------------------------------
    // Skipping

    /// Consumes one value of the given shape without building it.
    ///
    /// Records of unregistered types can be skipped: their class header is
    /// enough to walk their body. Values nested deeper than
    /// [`MAX_SHAPE_DEPTH`] are rejected.
    #[inline]
    pub fn skip_value(&mut self, shape: &Shape) -> Result<(), PersistError> {
        self.skip_nested(shape, 0)
    }

    fn skip_nested(&mut self, shape: &Shape, depth: usize) -> Result<(), PersistError> {
        if depth > MAX_SHAPE_DEPTH {
            let kind = DecodeErrorKind::NestingTooDeep {
                limit: MAX_SHAPE_DEPTH,
            };
            return Err(self.error_at(kind, self.reader.position()));
        }
        if let Some(size) = shape.fixed_size() {
            self.reader.skip(size)?;
            return Ok(());
        }
        match shape {
            Shape::Char => {
                self.reader.read_char()?;
            }
            Shape::String => {
                if self.reader.read_str()?.is_empty() {
                    self.reader.read_bool()?;
                }
            }
            Shape::Any => {
                let inner = Shape::read(&mut self.reader)?;
                self.skip_nested(&inner, depth + 1)?;
            }
            Shape::Nullable(inner) => {
                if !self.reader.read_bool()? {
                    self.skip_nested(inner, depth + 1)?;
                }
            }
            Shape::Record => self.skip_record(depth + 1)?,
            Shape::Sequence(item) => {
                if let Some(count) = self.reader.read_count()? {
                    for _ in 0..count {
                        self.skip_nested(item, depth + 1)?;
                    }
                }
            }
            Shape::Mapping(key, value) => {
                if let Some(count) = self.reader.read_count()? {
                    for _ in 0..count {
                        self.skip_nested(key, depth + 1)?;
                        self.skip_nested(value, depth + 1)?;
                    }
                }
            }
            // Fixed size, handled above.
            _ => {}
        }
        Ok(())
    }

    fn skip_record(&mut self, depth: usize) -> Result<(), PersistError> {
        let start = self.reader.position();
        let class_id = self.reader.read_i16()?;
        if class_id == 0 {
            return Ok(());
        }
        let def = self.class_def(class_id, None, start)?;
        if def.is_compact() {
            for field in def.fields() {
                self.skip_nested(field.shape(), depth)?;
            }
            return Ok(());
        }
        let mut next = 0;
        loop {
            let start = self.reader.position();
            let ordinal = self.reader.read_i16()?;
            if ordinal == 0 {
                return Ok(());
            }
            let index = self.field_index(&def, ordinal, start)?;
            if index < next {
                let kind = DecodeErrorKind::OrdinalOutOfOrder {
                    class: def.type_path().into(),
                    ordinal,
                    previous: next,
                };
                return Err(self.error_at(kind, start));
            }
            self.skip_nested(def.fields()[index].shape(), depth)?;
            next = index + 1;
        }
    }
}

impl core::fmt::Debug for Deserializer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Deserializer")
            .field("position", &self.reader.position())
            .field("class_defs", &self.class_defs.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::codec::BinaryWriter;
    use crate::error::{DecodeErrorKind, PersistError};
    use crate::options::Options;
    use crate::registry::TypeRegistry;
    use crate::{Deserializer, Persist, Serializer};

    mod v0 {
        use crate::Persist;

        #[derive(Persist, Default)]
        #[persist(type_path = "t::Doc")]
        pub struct Doc {
            pub pages: u32,
        }
    }

    mod v1 {
        use crate::Persist;

        #[derive(Persist, Default, Debug, PartialEq)]
        #[persist(type_path = "t::Doc")]
        pub struct Doc {
            pub title: String,
            pub pages: u32,
        }
    }

    mod v2 {
        use crate::Persist;

        #[derive(Persist, Default, Debug, PartialEq)]
        #[persist(type_path = "t::Note")]
        pub struct Note {
            pub text: String,
        }

        #[derive(Persist, Default, Debug, PartialEq)]
        #[persist(type_path = "t::Doc")]
        pub struct Doc {
            pub title: String,
            pub notes: Vec<Note>,
            pub pages: u32,
            pub margin: Option<f32>,
            #[persist(required)]
            pub author: String,
        }
    }

    fn encode<T: Persist>(value: &T) -> Vec<u8> {
        let mut ser = Serializer::new(Options::default());
        ser.write_root(value);
        ser.into_bytes()
    }

    fn decode<T: Persist>(bytes: &[u8], options: Options) -> Result<T, PersistError> {
        let registry = TypeRegistry::new();
        Deserializer::new(bytes, &registry, options).read_root()
    }

    fn lenient() -> Options {
        Options {
            allow_unknown_fields: true,
            ..Options::default()
        }
    }

    fn new_doc() -> v2::Doc {
        v2::Doc {
            title: "draft".into(),
            notes: vec![v2::Note { text: "a".into() }, v2::Note::default()],
            pages: 12,
            margin: Some(1.5),
            author: "kim".into(),
        }
    }

    #[test]
    fn newer_stream_skips_unknown_fields() {
        let bytes = encode(&new_doc());
        let old: v1::Doc = decode(&bytes, lenient()).unwrap();
        assert_eq!(
            old,
            v1::Doc {
                title: "draft".into(),
                pages: 12,
            }
        );
    }

    #[test]
    fn unknown_fields_rejected_by_default() {
        let bytes = encode(&new_doc());
        let err = decode::<v1::Doc>(&bytes, Options::default()).unwrap_err();
        assert!(matches!(
            err.decode_kind(),
            Some(DecodeErrorKind::UnknownField { field, .. }) if field == "author"
        ));
    }

    #[test]
    fn older_stream_lacks_required_field() {
        let bytes = encode(&v1::Doc::default());
        let err = decode::<v2::Doc>(&bytes, Options::default()).unwrap_err();
        assert_eq!(
            err.decode_kind(),
            Some(&DecodeErrorKind::MissingField {
                class: "t::Doc".into(),
                field: "author".into(),
            })
        );
    }

    #[test]
    fn header_read_once_per_session() {
        let docs = vec![new_doc(), new_doc(), new_doc()];
        let bytes = encode(&docs);
        let registry = TypeRegistry::new();
        let mut de = Deserializer::new(&bytes, &registry, Options::default());
        let back: Vec<v2::Doc> = de.read_root().unwrap();
        assert_eq!(back, docs);
        // `Doc` and `Note`.
        assert_eq!(de.class_def_count(), 2);
    }

    // Root shape, then class 1 `t::P` with fields "a": i32 and "b": i32.
    fn p_header(w: &mut BinaryWriter) {
        w.write_u8(32);
        w.write_i16(1);
        w.write_str("t::P");
        w.write_u8(0);
        w.write_i16(2);
        w.write_str("a");
        w.write_u8(5);
        w.write_str("b");
        w.write_u8(5);
    }

    #[derive(Persist, Default, Debug)]
    #[persist(type_path = "t::P")]
    struct P {
        a: i32,
        b: i32,
    }

    #[test]
    fn ordinals_must_ascend() {
        let mut w = BinaryWriter::new();
        p_header(&mut w);
        w.write_i16(2);
        w.write_i32(7);
        w.write_i16(1);
        w.write_i32(8);
        w.write_i16(0);
        let err = decode::<P>(w.as_bytes(), Options::default()).unwrap_err();
        assert!(matches!(
            err.decode_kind(),
            Some(DecodeErrorKind::OrdinalOutOfOrder {
                ordinal: 1,
                previous: 2,
                ..
            })
        ));
    }

    #[test]
    fn unrecognized_ordinal_is_unfinished_object() {
        let mut w = BinaryWriter::new();
        p_header(&mut w);
        w.write_i16(1);
        w.write_i32(7);
        w.write_i16(3);
        let err = decode::<P>(w.as_bytes(), Options::default()).unwrap_err();
        assert!(matches!(
            err.decode_kind(),
            Some(DecodeErrorKind::UnfinishedObject { ordinal: 3, .. })
        ));
    }

    #[test]
    fn truncated_input() {
        let bytes = encode(&new_doc());
        for len in 0..bytes.len() {
            assert!(decode::<v2::Doc>(&bytes[..len], Options::default()).is_err());
        }
        for len in [1, bytes.len() - 1] {
            let err = decode::<v2::Doc>(&bytes[..len], Options::default()).unwrap_err();
            assert!(
                matches!(err.decode_kind(), Some(DecodeErrorKind::UnexpectedEof { .. })),
                "{err}"
            );
        }
    }

    #[test]
    fn class_id_beyond_next_is_rejected() {
        let err = decode::<P>(&[32, 5, 0], Options::default()).unwrap_err();
        let PersistError::Decode(err) = err else {
            panic!("expected a decode error");
        };
        assert_eq!(err.kind, DecodeErrorKind::BadClassId { class_id: 5, known: 0 });
        assert_eq!(err.position, Some(1));
    }

    #[test]
    fn positions_can_be_suppressed() {
        let options = Options {
            report_error_position: false,
            ..Options::default()
        };
        let PersistError::Decode(err) = decode::<P>(&[32, 5, 0], options).unwrap_err() else {
            panic!("expected a decode error");
        };
        assert_eq!(err.position, None);
    }

    #[test]
    fn root_shape_must_match() {
        let bytes = encode(&7_i32);
        let err = decode::<String>(&bytes, Options::default()).unwrap_err();
        assert!(matches!(
            err.decode_kind(),
            Some(DecodeErrorKind::TypeMismatch { .. })
        ));
    }

    #[test]
    fn signature_checked_when_enabled() {
        let options = Options {
            auto_signature: true,
            ..Options::default()
        };
        let mut ser = Serializer::new(options.clone());
        ser.write_root(&String::from("x"));
        let bytes = ser.into_bytes();
        assert_eq!(&bytes[..4], b"GRF1");
        assert_eq!(decode::<String>(&bytes, options.clone()).unwrap(), "x");

        let mut tampered = bytes.clone();
        tampered[0] = b'X';
        let err = decode::<String>(&tampered, options).unwrap_err();
        assert_eq!(err.decode_kind(), Some(&DecodeErrorKind::BadSignature));
    }

    #[test]
    fn unregistered_polymorphic_type_is_a_dispatch_error() {
        let bytes = encode(&P::default());
        let registry = TypeRegistry::new();
        let mut de = Deserializer::new(&bytes, &registry, Options::default());
        match de.read_root_object() {
            Err(PersistError::Dispatch { type_path }) => assert_eq!(type_path, "t::P"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn registered_polymorphic_type() {
        let bytes = encode(&new_doc());
        let mut registry = TypeRegistry::new();
        registry.register::<v2::Doc>();
        let mut de = Deserializer::new(&bytes, &registry, Options::default());
        let object = de.read_root_object().unwrap().unwrap();
        assert_eq!(object.downcast_ref::<v2::Doc>(), Some(&new_doc()));
    }

    #[test]
    fn read_into_keeps_absent_fields() {
        let bytes = encode(&v0::Doc { pages: 3 });
        let registry = TypeRegistry::new();

        let mut doc = v1::Doc {
            title: "kept".into(),
            pages: 1,
        };
        Deserializer::new(&bytes, &registry, Options::default())
            .read_root_into(&mut doc)
            .unwrap();
        assert_eq!(
            doc,
            v1::Doc {
                title: "kept".into(),
                pages: 3,
            }
        );

        // `author` is required, so an old stream cannot be merged into the
        // newest layout.
        let mut doc = new_doc();
        let err = Deserializer::new(&bytes, &registry, Options::default())
            .read_root_into(&mut doc)
            .unwrap_err();
        assert!(matches!(
            err.decode_kind(),
            Some(DecodeErrorKind::MissingField { .. })
        ));
    }

    #[test]
    fn skips_values_by_shape() {
        let bytes = encode(&vec![new_doc()]);
        let registry = TypeRegistry::new();
        let mut de = Deserializer::new(&bytes, &registry, Options::default());
        let shape = crate::info::Shape::read(de.reader()).unwrap();
        de.skip_value(&shape).unwrap();
        assert!(de.reader().is_empty());
        assert_eq!(de.class_def_count(), 2);
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let registry = TypeRegistry::new();
        let too_deep = Some(&DecodeErrorKind::NestingTooDeep {
            limit: crate::info::MAX_SHAPE_DEPTH,
        });

        let mut bytes = vec![18_u8; 200_000];
        bytes.push(5);
        let err = Deserializer::new(&bytes, &registry, Options::default())
            .read_root::<i32>()
            .unwrap_err();
        assert_eq!(err.decode_kind(), too_deep);

        let mut bytes = vec![17_u8; 200_000];
        bytes.extend_from_slice(&[5, 0, 0, 0, 0]);
        let mut de = Deserializer::new(&bytes, &registry, Options::default());
        let err = de.skip_value(&crate::info::Shape::Any).unwrap_err();
        assert_eq!(err.decode_kind(), too_deep);
    }
}
