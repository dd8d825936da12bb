use alloc::boxed::Box;
use core::fmt;

use crate::codec::{BinaryReader, BinaryWriter};
use crate::error::{DecodeError, DecodeErrorKind};

/// Deepest element nesting accepted in a stored shape, and deepest value
/// nesting walked when skipping.
pub const MAX_SHAPE_DEPTH: usize = 64;

// -----------------------------------------------------------------------------
// Shape

/// The coarse wire type of a value.
///
/// Class headers record the shape of every field, which lets a reader check
/// that a known field still has a compatible type and skip the bytes of a
/// field it does not know.
///
/// `Decimal`, `DateTime` and `TimeSpan` have no local value mapping; they
/// are only recognised so that streams containing them can be skipped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    SByte,
    Byte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Bool,
    Char,
    Float,
    Double,
    Decimal,
    DateTime,
    TimeSpan,
    String,
    /// A shape tag followed by a value of that shape.
    Any,
    /// Whole seconds (`u64`) then sub-second nanoseconds (`u32`).
    Duration,
    /// A null flag followed by the inner value when present.
    Nullable(Box<Shape>),
    /// A class id, then a class header on first use, then the body.
    Record,
    /// A count followed by that many elements.
    Sequence(Box<Shape>),
    /// A count followed by that many key and value pairs.
    Mapping(Box<Shape>, Box<Shape>),
}

impl Shape {
    /// The tag byte of this shape, without its element shapes.
    pub const fn tag(&self) -> u8 {
        match self {
            Self::SByte => 1,
            Self::Byte => 2,
            Self::Short => 3,
            Self::UShort => 4,
            Self::Int => 5,
            Self::UInt => 6,
            Self::Long => 7,
            Self::ULong => 8,
            Self::Bool => 9,
            Self::Char => 10,
            Self::Float => 11,
            Self::Double => 12,
            Self::Decimal => 13,
            Self::DateTime => 14,
            Self::TimeSpan => 15,
            Self::String => 16,
            Self::Any => 17,
            Self::Nullable(_) => 18,
            Self::Duration => 19,
            Self::Record => 32,
            Self::Sequence(_) => 33,
            Self::Mapping(..) => 34,
        }
    }

    /// Encoded size of values of this shape, when it does not vary.
    pub const fn fixed_size(&self) -> Option<usize> {
        match self {
            Self::SByte | Self::Byte | Self::Bool => Some(1),
            Self::Short | Self::UShort => Some(2),
            Self::Int | Self::UInt | Self::Float => Some(4),
            Self::Long | Self::ULong | Self::Double | Self::DateTime | Self::TimeSpan => Some(8),
            Self::Duration => Some(12),
            Self::Decimal => Some(16),
            _ => None,
        }
    }

    /// Whether a value stored as `stored` can be read where `self` is
    /// expected.
    ///
    /// Shapes must match exactly, except that records are matched by the
    /// class header that follows them rather than by the shape.
    pub fn accepts(&self, stored: &Shape) -> bool {
        match (self, stored) {
            (Self::Nullable(a), Self::Nullable(b)) | (Self::Sequence(a), Self::Sequence(b)) => {
                a.accepts(b)
            }
            (Self::Mapping(ka, va), Self::Mapping(kb, vb)) => ka.accepts(kb) && va.accepts(vb),
            _ => self == stored,
        }
    }

    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u8(self.tag());
        match self {
            Self::Nullable(inner) | Self::Sequence(inner) => inner.write(writer),
            Self::Mapping(key, value) => {
                key.write(writer);
                value.write(writer);
            }
            _ => {}
        }
    }

    /// Reads a shape, rejecting element nesting deeper than
    /// [`MAX_SHAPE_DEPTH`].
    #[inline]
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        Self::read_nested(reader, 0)
    }

    fn read_nested(reader: &mut BinaryReader<'_>, depth: usize) -> Result<Self, DecodeError> {
        let start = reader.position();
        let tag = reader.read_u8()?;
        if matches!(tag, 18 | 33 | 34) && depth >= MAX_SHAPE_DEPTH {
            let kind = DecodeErrorKind::NestingTooDeep {
                limit: MAX_SHAPE_DEPTH,
            };
            return Err(DecodeError::at(kind, start));
        }
        let shape = match tag {
            1 => Self::SByte,
            2 => Self::Byte,
            3 => Self::Short,
            4 => Self::UShort,
            5 => Self::Int,
            6 => Self::UInt,
            7 => Self::Long,
            8 => Self::ULong,
            9 => Self::Bool,
            10 => Self::Char,
            11 => Self::Float,
            12 => Self::Double,
            13 => Self::Decimal,
            14 => Self::DateTime,
            15 => Self::TimeSpan,
            16 => Self::String,
            17 => Self::Any,
            18 => Self::Nullable(Box::new(Self::read_nested(reader, depth + 1)?)),
            19 => Self::Duration,
            32 => Self::Record,
            33 => Self::Sequence(Box::new(Self::read_nested(reader, depth + 1)?)),
            34 => {
                let key = Self::read_nested(reader, depth + 1)?;
                let value = Self::read_nested(reader, depth + 1)?;
                Self::Mapping(Box::new(key), Box::new(value))
            }
            tag => return Err(DecodeError::at(DecodeErrorKind::UnknownShape(tag), start)),
        };
        Ok(shape)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SByte => f.write_str("i8"),
            Self::Byte => f.write_str("u8"),
            Self::Short => f.write_str("i16"),
            Self::UShort => f.write_str("u16"),
            Self::Int => f.write_str("i32"),
            Self::UInt => f.write_str("u32"),
            Self::Long => f.write_str("i64"),
            Self::ULong => f.write_str("u64"),
            Self::Bool => f.write_str("bool"),
            Self::Char => f.write_str("char"),
            Self::Float => f.write_str("f32"),
            Self::Double => f.write_str("f64"),
            Self::Decimal => f.write_str("decimal"),
            Self::DateTime => f.write_str("datetime"),
            Self::TimeSpan => f.write_str("timespan"),
            Self::Duration => f.write_str("duration"),
            Self::String => f.write_str("string"),
            Self::Any => f.write_str("any"),
            Self::Nullable(inner) => write!(f, "Option<{inner}>"),
            Self::Record => f.write_str("record"),
            Self::Sequence(inner) => write!(f, "Vec<{inner}>"),
            Self::Mapping(key, value) => write!(f, "Map<{key}, {value}>"),
        }
    }
}
