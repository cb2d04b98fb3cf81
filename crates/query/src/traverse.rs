//! Single-pass streaming traversal of a MessagePack document.
//!
//! The traverser decodes the whole buffer exactly once, in document order
//! (depth-first, pre-order), dispatching each value token to a visitor. It
//! holds no match semantics of its own; the query executor and the document
//! indexer are both visitors over the same pass.

use packpath_buffers::{BufferView, Reader, Span};

use crate::token::{Token, TokenKind, TokenReader};
use crate::DocumentError;

/// How the current token hangs off its parent container.
///
/// Map keys are folded into the entry of their value token: the visitor sees
/// one `on_token` call per map entry, carrying both the key token span and
/// the raw name span, so key/value pairing is always explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// The outermost value of the document.
    Root,
    /// A map entry; `token` spans the whole key encoding, `name` its bytes.
    Key { token: Span, name: Span },
    /// An array element with its running ordinal.
    Element(u32),
}

/// Callbacks invoked by [`Traverser::traverse`].
pub trait Visitor {
    /// Called for every value token, including container headers (before
    /// descending into their children). `depth` is the nesting depth, 0 for
    /// the root.
    fn on_token(&mut self, token: &Token, depth: u32, entry: Entry);

    /// Called after the last child of a container. `depth` is the
    /// container's own depth; `end` the offset just past its last byte.
    fn on_container_end(&mut self, depth: u32, end: usize);
}

struct Level {
    remaining: u32,
    is_map: bool,
    next_index: u32,
}

impl Level {
    fn for_token(token: &Token) -> Option<Level> {
        match token.kind {
            TokenKind::MapHeader(n) => Some(Level {
                remaining: n,
                is_map: true,
                next_index: 0,
            }),
            TokenKind::ArrayHeader(n) => Some(Level {
                remaining: n,
                is_map: false,
                next_index: 0,
            }),
            _ => None,
        }
    }
}

/// Pure dispatcher walking one document buffer.
pub struct Traverser;

impl Traverser {
    /// Walks the buffer from offset 0, invoking the visitor for every token.
    ///
    /// Fails with [`DocumentError::Truncated`] when a header declares more
    /// children than the buffer holds, and [`DocumentError::UnexpectedToken`]
    /// when a byte does not start a valid token, a map key is not a string,
    /// or bytes remain after the root value's subtree.
    pub fn traverse(
        buffer: BufferView<'_>,
        visitor: &mut dyn Visitor,
    ) -> Result<(), DocumentError> {
        let mut reader = Reader::new(buffer);

        let root = TokenReader::read_token(&mut reader)?;
        visitor.on_token(&root, 0, Entry::Root);

        let mut stack: Vec<Level> = Vec::new();
        if let Some(level) = Level::for_token(&root) {
            stack.push(level);
        }

        while let Some(top) = stack.last_mut() {
            if top.remaining == 0 {
                stack.pop();
                visitor.on_container_end(stack.len() as u32, reader.pos());
                continue;
            }
            top.remaining -= 1;

            let entry = if top.is_map {
                let pos = reader.pos();
                let byte = reader
                    .peek()
                    .map_err(|_| DocumentError::Truncated { offset: pos })?;
                let key = TokenReader::read_token(&mut reader)?;
                if key.kind != TokenKind::Str {
                    return Err(DocumentError::UnexpectedToken { byte, offset: pos });
                }
                Entry::Key {
                    token: key.span,
                    name: key.value_span,
                }
            } else {
                let index = top.next_index;
                top.next_index += 1;
                Entry::Element(index)
            };

            let depth = stack.len() as u32;
            let token = TokenReader::read_token(&mut reader)?;
            visitor.on_token(&token, depth, entry);
            if let Some(level) = Level::for_token(&token) {
                stack.push(level);
            }
        }

        // A buffer holds exactly one document; bytes past the root value's
        // subtree are malformed input, not padding.
        if !reader.is_done() {
            let offset = reader.pos();
            let byte = reader
                .peek()
                .map_err(|_| DocumentError::Truncated { offset })?;
            return Err(DocumentError::UnexpectedToken { byte, offset });
        }
        Ok(())
    }
}
