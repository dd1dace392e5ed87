//! Binary buffer reader with cursor tracking.

use crate::BufferError;

/// A little-endian reader over a byte slice.
///
/// The reader keeps a cursor `x` and an exclusive end `end`. Reads never go
/// past `end`; a short read leaves the cursor where it was and returns
/// [`BufferError::EndOfBuffer`].
///
/// # Example
///
/// ```
/// use arrow_ipc_verify_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u8(), Ok(0x01));
/// assert_eq!(reader.u32_le(), Ok(0x0504_0302));
/// assert_eq!(reader.remaining(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    uint8: &'a [u8],
    x: usize,
    end: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader for the given byte slice.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self {
            uint8,
            x: 0,
            end: uint8.len(),
        }
    }

    /// Creates a reader over the window `x..end` of `uint8`.
    pub fn from_slice(uint8: &'a [u8], x: usize, end: usize) -> Result<Self, BufferError> {
        if x > end || end > uint8.len() {
            return Err(BufferError::InvalidWindow {
                start: x,
                end,
                len: uint8.len(),
            });
        }
        Ok(Self { uint8, x, end })
    }

    /// Current cursor position, relative to the start of the underlying slice.
    pub fn position(&self) -> usize {
        self.x
    }

    /// Total size of the underlying slice.
    pub fn size(&self) -> usize {
        self.uint8.len()
    }

    /// Returns the number of bytes left before the end of the window.
    pub fn remaining(&self) -> usize {
        self.end - self.x
    }

    /// Returns `true` once the cursor reached the end of the window.
    pub fn is_empty(&self) -> bool {
        self.x == self.end
    }

    fn take(&mut self, wanted: usize) -> Result<&'a [u8], BufferError> {
        let available = self.remaining();
        if wanted > available {
            return Err(BufferError::EndOfBuffer {
                offset: self.x,
                wanted,
                available,
            });
        }
        let start = self.x;
        self.x += wanted;
        Ok(&self.uint8[start..self.x])
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Advances the cursor by the given number of bytes.
    pub fn skip(&mut self, length: usize) -> Result<(), BufferError> {
        self.take(length).map(|_| ())
    }

    /// Returns a subarray of the given size and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.take(size)
    }

    /// Returns everything between the cursor and the end of the window.
    pub fn rest(&mut self) -> &'a [u8] {
        let start = self.x;
        self.x = self.end;
        &self.uint8[start..self.end]
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        Ok(self.array::<1>()?[0])
    }

    /// Reads an unsigned 32-bit integer (little-endian).
    #[inline]
    pub fn u32_le(&mut self) -> Result<u32, BufferError> {
        self.array().map(u32::from_le_bytes)
    }

    /// Reads a signed 32-bit integer (little-endian).
    #[inline]
    pub fn i32_le(&mut self) -> Result<i32, BufferError> {
        self.array().map(i32::from_le_bytes)
    }

    /// Reads a signed 64-bit integer (little-endian).
    #[inline]
    pub fn i64_le(&mut self) -> Result<i64, BufferError> {
        self.array().map(i64::from_le_bytes)
    }

    /// Peeks at the next unsigned 32-bit integer without advancing the cursor.
    pub fn peek_u32_le(&self) -> Result<u32, BufferError> {
        self.clone().u32_le()
    }
}
