//! Cursor reader over a buffer view.
//!
//! Every read is bounds-checked and returns `Err(BufferError::EndOfBuffer)`
//! instead of panicking; the cursor does not advance on error.

use crate::{BufferError, BufferView};

/// A binary reader that decodes big-endian primitives from a [`BufferView`]
/// while tracking a cursor position.
///
/// # Example
///
/// ```
/// use packpath_buffers::{BufferView, Reader};
///
/// let data = [0x01, 0x02, 0x03];
/// let mut reader = Reader::new(BufferView::new(&data));
/// assert_eq!(reader.u8(), Ok(0x01));
/// assert_eq!(reader.u16(), Ok(0x0203));
/// ```
pub struct Reader<'a> {
    data: &'a [u8],
    x: usize,
}

impl<'a> Reader<'a> {
    pub fn new(view: BufferView<'a>) -> Self {
        Self {
            data: view.bytes(),
            x: 0,
        }
    }

    /// Current cursor position, relative to the view start.
    pub fn pos(&self) -> usize {
        self.x
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.x
    }

    pub fn is_done(&self) -> bool {
        self.x >= self.data.len()
    }

    #[inline]
    fn check(&self, n: usize) -> Result<(), BufferError> {
        if self.x + n > self.data.len() {
            Err(BufferError::EndOfBuffer)
        } else {
            Ok(())
        }
    }

    /// Peeks at the current byte without advancing the cursor.
    pub fn peek(&self) -> Result<u8, BufferError> {
        self.check(1)?;
        Ok(self.data[self.x])
    }

    /// Advances the cursor by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<(), BufferError> {
        self.check(n)?;
        self.x += n;
        Ok(())
    }

    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        self.check(1)?;
        let val = self.data[self.x];
        self.x += 1;
        Ok(val)
    }

    #[inline]
    pub fn u16(&mut self) -> Result<u16, BufferError> {
        self.check(2)?;
        let val = u16::from_be_bytes([self.data[self.x], self.data[self.x + 1]]);
        self.x += 2;
        Ok(val)
    }

    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        self.check(4)?;
        let val = u32::from_be_bytes([
            self.data[self.x],
            self.data[self.x + 1],
            self.data[self.x + 2],
            self.data[self.x + 3],
        ]);
        self.x += 4;
        Ok(val)
    }

    #[inline]
    pub fn u64(&mut self) -> Result<u64, BufferError> {
        self.check(8)?;
        let val = u64::from_be_bytes([
            self.data[self.x],
            self.data[self.x + 1],
            self.data[self.x + 2],
            self.data[self.x + 3],
            self.data[self.x + 4],
            self.data[self.x + 5],
            self.data[self.x + 6],
            self.data[self.x + 7],
        ]);
        self.x += 8;
        Ok(val)
    }

    #[inline]
    pub fn i8(&mut self) -> Result<i8, BufferError> {
        Ok(self.u8()? as i8)
    }

    #[inline]
    pub fn i16(&mut self) -> Result<i16, BufferError> {
        Ok(self.u16()? as i16)
    }

    #[inline]
    pub fn i32(&mut self) -> Result<i32, BufferError> {
        Ok(self.u32()? as i32)
    }

    #[inline]
    pub fn i64(&mut self) -> Result<i64, BufferError> {
        Ok(self.u64()? as i64)
    }

    #[inline]
    pub fn f32(&mut self) -> Result<f32, BufferError> {
        Ok(f32::from_bits(self.u32()?))
    }

    #[inline]
    pub fn f64(&mut self) -> Result<f64, BufferError> {
        Ok(f64::from_bits(self.u64()?))
    }

    /// Reads `size` raw bytes and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.check(size)?;
        let start = self.x;
        self.x += size;
        Ok(&self.data[start..self.x])
    }
}
