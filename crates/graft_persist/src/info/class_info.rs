use bitflags::bitflags;

use crate::info::Shape;

// -----------------------------------------------------------------------------
// Flags

bitflags! {
    /// Class level switches, written into every class header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClassFlags: u8 {
        /// Fields are written in order without ordinals or terminator.
        const COMPACT  = 1 << 0;
        /// Shared resource: clones reuse the source instead of copying it.
        /// Local only, never written.
        const RESOURCE = 1 << 1;
    }
}

bitflags! {
    /// Per-field persistence rules.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u8 {
        /// Absence from the stream is a decode error.
        const REQUIRED      = 1 << 0;
        /// Omitted on write when equal to the class default.
        const MEMBER        = 1 << 1;
        /// Guarded by a per-instance predicate.
        const CONDITIONAL   = 1 << 2;
        /// Collection whose elements are filtered by a predicate.
        const ITEM_FILTERED = 1 << 3;
    }
}

impl ClassFlags {
    /// The subset of flags that is part of the wire format.
    pub const WIRE: Self = Self::COMPACT;
}

// -----------------------------------------------------------------------------
// ClassKind

/// How instances of a class are copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// Has identity; cloned field by field.
    Reference,
    /// No identity; cloned as a structural copy.
    Value,
}

// -----------------------------------------------------------------------------
// FieldInfo

/// Static description of one persisted field.
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo {
    name: &'static str,
    tag: &'static str,
    shape: fn() -> Shape,
    flags: FieldFlags,
}

impl FieldInfo {
    #[inline]
    pub const fn new(name: &'static str, tag: &'static str, shape: fn() -> Shape) -> Self {
        Self {
            name,
            tag,
            shape,
            flags: FieldFlags::empty(),
        }
    }

    #[inline]
    pub const fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags = flags;
        self
    }

    /// The Rust field name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The name written to class headers.
    #[inline]
    pub const fn tag(&self) -> &'static str {
        self.tag
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        (self.shape)()
    }

    #[inline]
    pub const fn flags(&self) -> FieldFlags {
        self.flags
    }

    #[inline]
    pub const fn is_required(&self) -> bool {
        self.flags.contains(FieldFlags::REQUIRED)
    }
}

// -----------------------------------------------------------------------------
// ClassInfo

/// Static description of a persisted class.
///
/// `fields` are sorted by tag. A field's position in that order is its
/// index, and the index plus one is the ordinal written to the stream.
#[derive(Debug, Clone, Copy)]
pub struct ClassInfo {
    type_path: &'static str,
    kind: ClassKind,
    flags: ClassFlags,
    fields: &'static [FieldInfo],
}

impl ClassInfo {
    #[inline]
    pub const fn new(type_path: &'static str, fields: &'static [FieldInfo]) -> Self {
        Self {
            type_path,
            kind: ClassKind::Reference,
            flags: ClassFlags::empty(),
            fields,
        }
    }

    #[inline]
    pub const fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    #[inline]
    pub const fn with_flags(mut self, flags: ClassFlags) -> Self {
        self.flags = flags;
        self
    }

    /// The name written to class headers and used to look the type up.
    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.type_path
    }

    #[inline]
    pub const fn kind(&self) -> ClassKind {
        self.kind
    }

    #[inline]
    pub const fn flags(&self) -> ClassFlags {
        self.flags
    }

    #[inline]
    pub const fn fields(&self) -> &'static [FieldInfo] {
        self.fields
    }

    #[inline]
    pub fn field(&self, index: usize) -> Option<&'static FieldInfo> {
        self.fields.get(index)
    }

    /// Finds a field by its tag.
    pub fn field_index(&self, tag: &str) -> Option<usize> {
        self.fields.binary_search_by(|field| field.tag.cmp(tag)).ok()
    }

    #[inline]
    pub const fn is_compact(&self) -> bool {
        self.flags.contains(ClassFlags::COMPACT)
    }

    #[inline]
    pub const fn is_resource(&self) -> bool {
        self.flags.contains(ClassFlags::RESOURCE)
    }

    /// Whether tags are strictly ascending, which lookups rely on.
    pub fn has_sorted_tags(&self) -> bool {
        self.fields.windows(2).all(|w| w[0].tag < w[1].tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> Shape {
        Shape::Int
    }

    fn string() -> Shape {
        Shape::String
    }

    static FIELDS: [FieldInfo; 3] = [
        FieldInfo::new("alpha", "a", int),
        FieldInfo::new("beta", "b", int).with_flags(FieldFlags::REQUIRED),
        FieldInfo::new("gamma", "c", string),
    ];

    static INFO: ClassInfo = ClassInfo::new("tests::Abc", &FIELDS).with_flags(ClassFlags::COMPACT);

    #[test]
    fn lookup_by_tag() {
        assert!(INFO.has_sorted_tags());
        assert_eq!(INFO.field_index("b"), Some(1));
        assert_eq!(INFO.field_index("z"), None);
        assert!(INFO.field(1).unwrap().is_required());
        assert_eq!(INFO.field(2).unwrap().shape(), Shape::String);
        assert!(INFO.is_compact());
        assert!(!INFO.is_resource());
    }
}
