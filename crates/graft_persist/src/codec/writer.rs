use alloc::vec::Vec;

// -----------------------------------------------------------------------------
// BinaryWriter

/// Appends primitive values to an in-memory buffer.
///
/// Scalars are little-endian and fixed width. Lengths use a 7-bit
/// variable-length prefix. Writing never fails; the buffer grows as needed.
#[derive(Debug, Default, Clone)]
pub struct BinaryWriter {
    buf: Vec<u8>,
}

macro_rules! impl_write_scalar {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&mut self, value: $ty) {
                self.buf.extend_from_slice(&value.to_le_bytes());
            }
        )*
    };
}

impl BinaryWriter {
    #[inline]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    impl_write_scalar! {
        write_i8: i8,
        write_u8: u8,
        write_i16: i16,
        write_u16: u16,
        write_i32: i32,
        write_u32: u32,
        write_i64: i64,
        write_u64: u64,
        write_f32: f32,
        write_f64: f64,
    }

    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(value as u8);
    }

    /// Writes the UTF-8 encoding of `value`, one to four bytes.
    #[inline]
    pub fn write_char(&mut self, value: char) {
        let mut tmp = [0_u8; 4];
        self.buf
            .extend_from_slice(value.encode_utf8(&mut tmp).as_bytes());
    }

    /// Writes `len` as a 7-bit variable-length integer.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds `i32::MAX`.
    pub fn write_len(&mut self, len: usize) {
        assert!(len <= i32::MAX as usize, "length {len} does not fit the wire format");
        let mut value = len as u32;
        while value >= 0x80 {
            self.buf.push((value as u8) | 0x80);
            value >>= 7;
        }
        self.buf.push(value as u8);
    }

    /// Writes a length-prefixed UTF-8 string.
    #[inline]
    pub fn write_str(&mut self, value: &str) {
        self.write_len(value.len());
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// Writes a collection count, `None` as the null count `-1`.
    ///
    /// # Panics
    ///
    /// Panics if the count exceeds `i32::MAX`.
    pub fn write_count(&mut self, count: Option<usize>) {
        match count {
            Some(count) => {
                assert!(count <= i32::MAX as usize, "count {count} does not fit the wire format");
                self.write_i32(count as i32);
            }
            None => self.write_i32(-1),
        }
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
