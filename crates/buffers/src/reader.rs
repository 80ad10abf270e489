//! Binary buffer reader with cursor tracking.

use std::str;

use crate::BufferError;

/// A bounds-checked binary reader over an immutable byte slice.
///
/// Every read validates the remaining length first and fails with
/// [`BufferError::UnexpectedEndOfStream`] instead of panicking. Multi-byte
/// integers are big-endian.
///
/// # Example
///
/// ```
/// use lstasko_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u8().unwrap(), 0x01);
/// assert_eq!(reader.u16().unwrap(), 0x0203);
/// assert_eq!(reader.remaining(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    uint8: &'a [u8],
    x: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader for the given byte slice.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// Returns the current cursor position.
    pub fn position(&self) -> usize {
        self.x
    }

    /// Returns the number of remaining bytes.
    pub fn remaining(&self) -> usize {
        self.uint8.len() - self.x
    }

    pub fn is_eof(&self) -> bool {
        self.x == self.uint8.len()
    }

    fn ensure(&self, needed: usize) -> Result<(), BufferError> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(BufferError::UnexpectedEndOfStream { needed, remaining });
        }
        Ok(())
    }

    /// Moves the cursor to an absolute position.
    ///
    /// Seeking to the end of the buffer is allowed; seeking past it is not.
    pub fn seek(&mut self, position: usize) -> Result<(), BufferError> {
        if position > self.uint8.len() {
            return Err(BufferError::SeekOutOfBounds(position));
        }
        self.x = position;
        Ok(())
    }

    /// Peeks at the current byte without advancing the cursor.
    pub fn peek(&self) -> Result<u8, BufferError> {
        self.ensure(1)?;
        Ok(self.uint8[self.x])
    }

    /// Returns the next `size` bytes without advancing the cursor.
    pub fn peek_n(&self, size: usize) -> Result<&'a [u8], BufferError> {
        self.ensure(size)?;
        Ok(&self.uint8[self.x..self.x + size])
    }

    /// Advances the cursor by the given number of bytes.
    pub fn skip(&mut self, length: usize) -> Result<(), BufferError> {
        self.ensure(length)?;
        self.x += length;
        Ok(())
    }

    /// Returns a subarray of the given size and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        let bin = self.peek_n(size)?;
        self.x += size;
        Ok(bin)
    }

    /// Finds the first occurrence of `pattern` at or after the cursor.
    ///
    /// Returns the absolute offset of the match. The cursor does not move.
    pub fn find(&self, pattern: &[u8]) -> Option<usize> {
        if pattern.is_empty() {
            return Some(self.x);
        }
        self.uint8[self.x..]
            .windows(pattern.len())
            .position(|window| window == pattern)
            .map(|offset| self.x + offset)
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        let val = self.peek()?;
        self.x += 1;
        Ok(val)
    }

    /// Reads a signed 8-bit integer.
    #[inline]
    pub fn i8(&mut self) -> Result<i8, BufferError> {
        Ok(self.u8()? as i8)
    }

    /// Reads an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn u16(&mut self) -> Result<u16, BufferError> {
        let b = self.buf(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Reads a signed 16-bit integer (big-endian).
    #[inline]
    pub fn i16(&mut self) -> Result<i16, BufferError> {
        Ok(self.u16()? as i16)
    }

    /// Reads an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        let b = self.buf(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads a signed 32-bit integer (big-endian).
    #[inline]
    pub fn i32(&mut self) -> Result<i32, BufferError> {
        Ok(self.u32()? as i32)
    }

    /// Reads an unsigned 64-bit integer (big-endian).
    #[inline]
    pub fn u64(&mut self) -> Result<u64, BufferError> {
        let b = self.buf(8)?;
        Ok(u64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Reads a signed 64-bit integer (big-endian).
    #[inline]
    pub fn i64(&mut self) -> Result<i64, BufferError> {
        Ok(self.u64()? as i64)
    }

    /// Reads a 32-bit floating point number (big-endian).
    #[inline]
    pub fn f32(&mut self) -> Result<f32, BufferError> {
        Ok(f32::from_bits(self.u32()?))
    }

    /// Reads a 64-bit floating point number (big-endian).
    #[inline]
    pub fn f64(&mut self) -> Result<f64, BufferError> {
        Ok(f64::from_bits(self.u64()?))
    }

    /// Reads a UTF-8 string of the given size.
    pub fn utf8(&mut self, size: usize) -> Result<&'a str, BufferError> {
        let bytes = self.buf(size)?;
        str::from_utf8(bytes).map_err(|_| BufferError::InvalidUtf8)
    }

    /// Reads a string prefixed with its big-endian 16-bit byte length.
    pub fn utf8_u16(&mut self) -> Result<&'a str, BufferError> {
        let size = self.u16()? as usize;
        self.utf8(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u8(), Ok(0x01));
        assert_eq!(reader.u8(), Ok(0x02));
        assert_eq!(reader.u8(), Ok(0x03));
        assert_eq!(
            reader.u8(),
            Err(BufferError::UnexpectedEndOfStream {
                needed: 1,
                remaining: 0
            })
        );
    }

    #[test]
    fn test_u16() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u16(), Ok(0x0102));
        assert_eq!(reader.u16(), Ok(0x0304));
    }

    #[test]
    fn test_u32() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u32(), Ok(0x01020304));
    }

    #[test]
    fn short_read_does_not_move_cursor() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = Reader::new(&data);
        reader.u8().unwrap();
        assert!(reader.u32().is_err());
        assert_eq!(reader.position(), 1);
        assert_eq!(reader.u16(), Ok(0x0203));
    }

    #[test]
    fn test_skip() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut reader = Reader::new(&data);
        reader.skip(2).unwrap();
        assert_eq!(reader.u8(), Ok(0x03));
        assert!(reader.skip(2).is_err());
    }

    #[test]
    fn test_seek() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = Reader::new(&data);
        reader.seek(2).unwrap();
        assert_eq!(reader.u8(), Ok(0x03));
        reader.seek(3).unwrap();
        assert!(reader.is_eof());
        assert_eq!(reader.seek(4), Err(BufferError::SeekOutOfBounds(4)));
    }

    #[test]
    fn test_peek_n() {
        let data = [0xac, 0xed, 0x00, 0x05];
        let reader = Reader::new(&data);
        assert_eq!(reader.peek_n(2), Ok(&data[..2]));
        assert!(reader.peek_n(5).is_err());
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_find() {
        let data = b"xxchannel_idt";
        let mut reader = Reader::new(data);
        assert_eq!(reader.find(b"channel_id"), Some(2));
        reader.seek(3).unwrap();
        assert_eq!(reader.find(b"channel_id"), None);
        assert_eq!(reader.find(b""), Some(3));
    }

    #[test]
    fn test_utf8() {
        let data = b"hello world";
        let mut reader = Reader::new(data);
        assert_eq!(reader.utf8(5), Ok("hello"));
        assert_eq!(reader.utf8(6), Ok(" world"));
    }

    #[test]
    fn test_utf8_invalid() {
        let data = [0xff, 0xfe];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.utf8(2), Err(BufferError::InvalidUtf8));
    }

    #[test]
    fn test_utf8_u16() {
        let data = [0x00, 0x03, b'1', b'2', b'3'];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.utf8_u16(), Ok("123"));
        assert!(reader.is_eof());
    }
}
