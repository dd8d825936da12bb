use crate::error::{DecodeError, DecodeErrorKind};
use crate::info::Shape;

// -----------------------------------------------------------------------------
// BinaryReader

/// A cursor over an encoded byte slice.
///
/// Every read either consumes exactly the bytes it decodes or fails
/// without guessing; a truncated input is always an error.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

macro_rules! impl_read_scalar {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&mut self) -> Result<$ty, DecodeError> {
                Ok(<$ty>::from_le_bytes(self.read_array()?))
            }
        )*
    };
}

impl<'a> BinaryReader<'a> {
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Offset of the next unread byte.
    #[inline]
    pub const fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    #[inline]
    fn error(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError::at(kind, self.pos)
    }

    /// Borrows the next `len` bytes from the input.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let Some(bytes) = self.data.get(self.pos..self.pos.saturating_add(len)) else {
            return Err(self.error(DecodeErrorKind::UnexpectedEof {
                needed: len - self.remaining(),
            }));
        };
        self.pos += len;
        Ok(bytes)
    }

    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0_u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    #[inline]
    pub fn skip(&mut self, len: usize) -> Result<(), DecodeError> {
        self.read_bytes(len).map(|_| ())
    }

    impl_read_scalar! {
        read_i8: i8,
        read_u8: u8,
        read_i16: i16,
        read_u16: u16,
        read_i32: i32,
        read_u32: u32,
        read_i64: i64,
        read_u64: u64,
        read_f32: f32,
        read_f64: f64,
    }

    /// Reads a boolean; any non-zero byte is `true`.
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_u8()? != 0)
    }

    /// Reads one UTF-8 encoded scalar value.
    pub fn read_char(&mut self) -> Result<char, DecodeError> {
        let start = self.pos;
        let lead = self.read_u8()?;
        let width = match lead {
            0x00..=0x7f => return Ok(lead as char),
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => return Err(DecodeError::at(invalid_char(), start)),
        };
        self.pos = start;
        let bytes = self.read_bytes(width)?;
        core::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.chars().next())
            .ok_or(DecodeError::at(invalid_char(), start))
    }

    /// Reads a 7-bit variable-length length prefix.
    pub fn read_len(&mut self) -> Result<usize, DecodeError> {
        let start = self.pos;
        let mut value: u32 = 0;
        for index in 0..5 {
            let byte = self.read_u8()?;
            value |= ((byte & 0x7f) as u32) << (7 * index);
            if byte & 0x80 == 0 {
                if index == 4 && byte > 0x07 {
                    break;
                }
                return Ok(value as usize);
            }
        }
        Err(DecodeError::at(DecodeErrorKind::BadLength, start))
    }

    /// Reads a length-prefixed UTF-8 string borrowed from the input.
    pub fn read_str(&mut self) -> Result<&'a str, DecodeError> {
        let start = self.pos;
        let len = self.read_len()?;
        if len > self.remaining() {
            return Err(DecodeError::at(DecodeErrorKind::BadLength, start));
        }
        let bytes = self.read_bytes(len)?;
        core::str::from_utf8(bytes).map_err(|_| DecodeError::at(DecodeErrorKind::InvalidUtf8, start))
    }

    /// Reads a collection count.
    ///
    /// Returns `None` for any negative count. A count larger than the number
    /// of unread bytes is a [`BadCount`](DecodeErrorKind::BadCount) error:
    /// every element takes at least one byte.
    pub fn read_count(&mut self) -> Result<Option<usize>, DecodeError> {
        let start = self.pos;
        let count = self.read_i32()?;
        match count {
            i32::MIN..=-1 => Ok(None),
            0..=i32::MAX if count as usize <= self.remaining() => Ok(Some(count as usize)),
            _ => Err(DecodeError::at(
                DecodeErrorKind::BadCount {
                    count: count as i64,
                },
                start,
            )),
        }
    }
}

#[inline]
fn invalid_char() -> DecodeErrorKind {
    DecodeErrorKind::InvalidValue { shape: Shape::Char }
}
