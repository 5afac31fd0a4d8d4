/// Cursor-based reader over an immutable byte buffer
use thiserror::Error;

/// Byte order of a fixed-width read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("read of {size} bytes at offset {offset} exceeds buffer length {len}")]
    OutOfBounds { offset: u64, size: usize, len: u64 },
}

/// Fixed-width values a [`ByteReader`] can decode.
pub trait Primitive: Sized + Copy {
    const SIZE: usize;

    /// Decode from the first `SIZE` bytes of `bytes`.
    fn from_bytes(bytes: &[u8], endian: Endian) -> Self;
}

macro_rules! impl_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn from_bytes(bytes: &[u8], endian: Endian) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    match endian {
                        Endian::Little => <$ty>::from_le_bytes(raw),
                        Endian::Big => <$ty>::from_be_bytes(raw),
                    }
                }
            }
        )*
    };
}

impl_primitive!(i8, u8, i16, u16, i32, u32, f32, f64);

/// Reads little- or big-endian values at explicit offsets or at an
/// auto-advancing cursor. The buffer is never mutated.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    cursor: u64,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn position(&self) -> u64 {
        self.cursor
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Move the cursor by `n` bytes. Bounds are only checked by the next read.
    pub fn skip(&mut self, n: i64) {
        self.cursor = self.cursor.saturating_add_signed(n);
    }

    /// Little-endian read at `offset`; the cursor does not move.
    pub fn peek<T: Primitive>(&self, offset: u64) -> Result<T, ReadError> {
        self.peek_endian(offset, Endian::Little)
    }

    pub fn peek_endian<T: Primitive>(&self, offset: u64, endian: Endian) -> Result<T, ReadError> {
        let bytes = self.window(offset, T::SIZE)?;
        Ok(T::from_bytes(bytes, endian))
    }

    /// Little-endian read at the cursor, advancing it by `T::SIZE`.
    pub fn read<T: Primitive>(&mut self) -> Result<T, ReadError> {
        self.read_endian(Endian::Little)
    }

    /// A failed read leaves the cursor where it was.
    pub fn read_endian<T: Primitive>(&mut self, endian: Endian) -> Result<T, ReadError> {
        let value = self.peek_endian(self.cursor, endian)?;
        self.cursor += T::SIZE as u64;
        Ok(value)
    }

    fn window(&self, offset: u64, size: usize) -> Result<&'a [u8], ReadError> {
        let out_of_bounds = || ReadError::OutOfBounds {
            offset,
            size,
            len: self.len(),
        };
        let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
        let end = start.checked_add(size).ok_or_else(out_of_bounds)?;
        self.data.get(start..end).ok_or_else(out_of_bounds)
    }
}
