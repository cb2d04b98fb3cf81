//! Binary byte sink with auto-growing capacity and an optional hard limit.

use crate::BufferError;

/// A byte sink that grows automatically as needed.
///
/// With [`Writer::with_limit`] the sink instead enforces a hard capacity cap
/// and surfaces [`BufferError::Overflow`] — carrying the number of bytes
/// still needed — once a write would exceed it. Callers serializing into a
/// bounded destination are expected to size the limit generously.
///
/// # Example
///
/// ```
/// use packpath_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(0x01).unwrap();
/// writer.u16(0x0203).unwrap();
/// assert_eq!(writer.flush(), [0x01, 0x02, 0x03]);
/// ```
pub struct Writer {
    uint8: Vec<u8>,
    x: usize,
    limit: Option<usize>,
    alloc_size: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates an unbounded writer with the default allocation size (64KB).
    pub fn new() -> Self {
        Self::with_alloc_size(64 * 1024)
    }

    /// Creates an unbounded writer with a custom allocation size.
    pub fn with_alloc_size(alloc_size: usize) -> Self {
        Self {
            uint8: vec![0u8; alloc_size],
            x: 0,
            limit: None,
            alloc_size,
        }
    }

    /// Creates a writer that refuses to grow beyond `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            uint8: vec![0u8; limit],
            x: 0,
            limit: Some(limit),
            alloc_size: limit.max(1),
        }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.x
    }

    pub fn is_empty(&self) -> bool {
        self.x == 0
    }

    /// The written bytes, without consuming them.
    pub fn as_slice(&self) -> &[u8] {
        &self.uint8[..self.x]
    }

    /// Returns the written bytes and resets the cursor.
    pub fn flush(&mut self) -> Vec<u8> {
        let result = self.uint8[..self.x].to_vec();
        self.x = 0;
        result
    }

    /// Ensures at least `capacity` more bytes can be written.
    pub fn ensure_capacity(&mut self, capacity: usize) -> Result<(), BufferError> {
        let required = self.x + capacity;
        if required <= self.uint8.len() {
            return Ok(());
        }
        if let Some(limit) = self.limit {
            if required > limit {
                return Err(BufferError::Overflow {
                    needed: required - limit,
                    limit,
                });
            }
        }
        let new_size = if required <= self.alloc_size {
            self.alloc_size
        } else {
            required * 2
        };
        self.uint8.resize(new_size, 0);
        Ok(())
    }

    #[inline]
    pub fn u8(&mut self, val: u8) -> Result<(), BufferError> {
        self.ensure_capacity(1)?;
        self.uint8[self.x] = val;
        self.x += 1;
        Ok(())
    }

    #[inline]
    pub fn u16(&mut self, val: u16) -> Result<(), BufferError> {
        self.ensure_capacity(2)?;
        self.uint8[self.x..self.x + 2].copy_from_slice(&val.to_be_bytes());
        self.x += 2;
        Ok(())
    }

    #[inline]
    pub fn u32(&mut self, val: u32) -> Result<(), BufferError> {
        self.ensure_capacity(4)?;
        self.uint8[self.x..self.x + 4].copy_from_slice(&val.to_be_bytes());
        self.x += 4;
        Ok(())
    }

    #[inline]
    pub fn u64(&mut self, val: u64) -> Result<(), BufferError> {
        self.ensure_capacity(8)?;
        self.uint8[self.x..self.x + 8].copy_from_slice(&val.to_be_bytes());
        self.x += 8;
        Ok(())
    }

    #[inline]
    pub fn f64(&mut self, val: f64) -> Result<(), BufferError> {
        self.u64(val.to_bits())
    }

    /// Writes a u8 followed by a big-endian u16.
    pub fn u8u16(&mut self, u8_val: u8, u16_val: u16) -> Result<(), BufferError> {
        self.ensure_capacity(3)?;
        self.uint8[self.x] = u8_val;
        self.uint8[self.x + 1..self.x + 3].copy_from_slice(&u16_val.to_be_bytes());
        self.x += 3;
        Ok(())
    }

    /// Writes a u8 followed by a big-endian u32.
    pub fn u8u32(&mut self, u8_val: u8, u32_val: u32) -> Result<(), BufferError> {
        self.ensure_capacity(5)?;
        self.uint8[self.x] = u8_val;
        self.uint8[self.x + 1..self.x + 5].copy_from_slice(&u32_val.to_be_bytes());
        self.x += 5;
        Ok(())
    }

    /// Writes a byte slice.
    pub fn buf(&mut self, buf: &[u8]) -> Result<(), BufferError> {
        self.ensure_capacity(buf.len())?;
        self.uint8[self.x..self.x + buf.len()].copy_from_slice(buf);
        self.x += buf.len();
        Ok(())
    }
}
