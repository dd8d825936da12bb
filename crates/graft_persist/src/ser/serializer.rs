use alloc::vec::Vec;
use core::any::TypeId;

use graft_utils::TypeIdMap;

use crate::codec::BinaryWriter;
use crate::info::{ClassFlags, ClassInfo};
use crate::object::Object;
use crate::options::{AUTO_SIGNATURE, Options};
use crate::persist::Persist;
use crate::record::Record;

// -----------------------------------------------------------------------------
// Serializer

/// A write session.
///
/// The first record of each class in a session is preceded by the class
/// header (type path, class flags, field tags and shapes); later records of
/// the same class only carry the class id.
///
/// ```
/// use graft_persist::{Options, Persist, Serializer};
///
/// #[derive(Persist, Default)]
/// #[persist(type_path = "scene::Point")]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let mut ser = Serializer::new(Options::default());
/// ser.write_root(&vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }]);
/// assert_eq!(ser.class_count(), 1);
/// ```
#[derive(Debug)]
pub struct Serializer {
    writer: BinaryWriter,
    class_ids: TypeIdMap<i16>,
    options: Options,
}

impl Serializer {
    pub fn new(options: Options) -> Self {
        Self {
            writer: BinaryWriter::new(),
            class_ids: TypeIdMap::new(),
            options,
        }
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The underlying primitive writer.
    #[inline]
    pub fn writer(&mut self) -> &mut BinaryWriter {
        &mut self.writer
    }

    /// Number of classes that received an id in this session.
    #[inline]
    pub fn class_count(&self) -> usize {
        self.class_ids.len()
    }

    /// Writes a top-level value: the optional signature, its shape, then
    /// the value.
    pub fn write_root<T: Persist>(&mut self, value: &T) {
        if self.options.auto_signature {
            self.writer.write_bytes(&AUTO_SIGNATURE);
        }
        T::shape().write(&mut self.writer);
        value.write(self);
    }

    /// Writes a non-null record of static type `T`.
    pub fn write_record<T: Record>(&mut self, value: &T) {
        value.before_serialization();
        let info = T::class_info();
        self.write_class_id(TypeId::of::<T>(), info);
        value.write_fields(self);
        if !info.is_compact() {
            self.writer.write_i16(0);
        }
        value.after_serialization();
    }

    /// Writes a record of whatever runtime type `value` has.
    #[inline]
    pub fn write_object(&mut self, value: &dyn Object) {
        value.write_object(self);
    }

    /// Writes a null record.
    #[inline]
    pub fn write_null(&mut self) {
        self.writer.write_i16(0);
    }

    /// Writes a field ordinal: the field's one-based position in tag order.
    #[inline]
    pub fn write_ordinal(&mut self, ordinal: i16) {
        debug_assert!(ordinal > 0, "ordinal 0 is reserved for the terminator");
        self.writer.write_i16(ordinal);
    }

    fn write_class_id(&mut self, type_id: TypeId, info: &ClassInfo) {
        if let Some(id) = self.class_ids.get(&type_id) {
            self.writer.write_i16(*id);
            return;
        }
        let next = self.class_ids.len() + 1;
        assert!(
            next <= i16::MAX as usize,
            "more than {} classes in one session",
            i16::MAX
        );
        self.class_ids.insert(type_id, next as i16);
        self.writer.write_i16(next as i16);
        self.write_class_header(info);
    }

    fn write_class_header(&mut self, info: &ClassInfo) {
        let fields = info.fields();
        self.writer.write_str(info.type_path());
        self.writer
            .write_u8(info.flags().intersection(ClassFlags::WIRE).bits());
        self.writer.write_i16(fields.len() as i16);
        for field in fields {
            self.writer.write_str(field.tag());
            field.shape().write(&mut self.writer);
        }
        log::trace!("wrote class header of `{}`", info.type_path());
    }

    /// Starts a new session on the same buffer: class ids are forgotten and
    /// headers are written again.
    #[inline]
    pub fn reset(&mut self) {
        self.class_ids.clear();
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.writer.as_bytes()
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_bytes()
    }
}
