use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("unexpected end of buffer")]
    EndOfBuffer,
    #[error("view out of bounds: offset {offset} + length {len} exceeds size {size}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        size: usize,
    },
    #[error("sink overflow: {needed} more bytes needed, capacity limit is {limit}")]
    Overflow { needed: usize, limit: usize },
}
