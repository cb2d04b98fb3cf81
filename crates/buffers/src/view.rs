//! Read-only buffer views and spans.

use crate::BufferError;

/// An (offset, length) pair locating a byte range within a specific buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Exclusive end offset of the span.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// An immutable, bounds-checked view over a contiguous byte range of a
/// caller-owned backing store. Never copies.
///
/// # Example
///
/// ```
/// use packpath_buffers::{BufferView, Span};
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let view = BufferView::new(&data);
/// assert_eq!(view.len(), 4);
/// assert_eq!(view.span_bytes(Span::new(1, 2)), [0x02, 0x03]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BufferView<'a> {
    data: &'a [u8],
}

impl<'a> BufferView<'a> {
    /// Creates a view covering the whole slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Creates a view over `data[offset..offset + len]`, validating bounds.
    pub fn with_range(data: &'a [u8], offset: usize, len: usize) -> Result<Self, BufferError> {
        if offset + len > data.len() {
            return Err(BufferError::OutOfBounds {
                offset,
                len,
                size: data.len(),
            });
        }
        Ok(Self {
            data: &data[offset..offset + len],
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The viewed bytes.
    pub fn bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Bytes of a span within this view. Panics if the span is out of
    /// bounds; spans produced by the token reader are valid by construction.
    pub fn span_bytes(&self, span: Span) -> &'a [u8] {
        &self.data[span.offset..span.end()]
    }

    /// Fallible variant of [`span_bytes`](Self::span_bytes) for spans taken
    /// from outside the parsing pipeline.
    pub fn try_span_bytes(&self, span: Span) -> Result<&'a [u8], BufferError> {
        if span.end() > self.data.len() {
            return Err(BufferError::OutOfBounds {
                offset: span.offset,
                len: span.len,
                size: self.data.len(),
            });
        }
        Ok(&self.data[span.offset..span.end()])
    }

    /// Creates a sub-view over a span of this view.
    pub fn slice(&self, span: Span) -> Result<BufferView<'a>, BufferError> {
        Ok(BufferView {
            data: self.try_span_bytes(span)?,
        })
    }
}
