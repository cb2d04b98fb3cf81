//! Tree writer: serializes a [`DocumentTree`] back to wire bytes.
//!
//! Untouched indexed subtrees are copied verbatim from their backing buffer,
//! so an index→write round trip without mutation reproduces the input
//! byte-for-byte. Dirty and synthetic containers re-emit their header from
//! the current children length and recurse.

use packpath_buffers::Writer;

use crate::error::MappingError;
use crate::tree::{ContainerKind, DocumentTree, NodeId, NodeName, NodePayload};

pub struct TreeWriter;

impl TreeWriter {
    /// Writes the tree rooted at `tree.root()` into `out`, returning the
    /// number of bytes written.
    pub fn write(tree: &DocumentTree<'_>, out: &mut Writer) -> Result<usize, MappingError> {
        let start = out.len();
        write_node(tree, tree.root(), out)?;
        Ok(out.len() - start)
    }
}

fn write_node(tree: &DocumentTree<'_>, id: NodeId, out: &mut Writer) -> Result<(), MappingError> {
    match &tree.node(id).payload {
        NodePayload::Span { buffer, span } => {
            out.buf(&tree.buffer_bytes(*buffer)[span.offset..span.end()])?;
        }
        NodePayload::Container {
            span: Some((buffer, span)),
            dirty: false,
            ..
        } => {
            out.buf(&tree.buffer_bytes(*buffer)[span.offset..span.end()])?;
        }
        NodePayload::Container { kind, children, .. } => {
            write_container_header(*kind, children.len(), out)?;
            let is_map = *kind == ContainerKind::Map;
            for &child in children {
                if is_map {
                    write_key(tree, child, out)?;
                }
                write_node(tree, child, out)?;
            }
        }
    }
    Ok(())
}

fn write_container_header(
    kind: ContainerKind,
    len: usize,
    out: &mut Writer,
) -> Result<(), MappingError> {
    match kind {
        ContainerKind::Map => {
            if len <= 0xf {
                out.u8(0x80 | len as u8)?;
            } else if len <= 0xffff {
                out.u8u16(0xde, len as u16)?;
            } else {
                out.u8u32(0xdf, len as u32)?;
            }
        }
        ContainerKind::Array => {
            if len <= 0xf {
                out.u8(0x90 | len as u8)?;
            } else if len <= 0xffff {
                out.u8u16(0xdc, len as u16)?;
            } else {
                out.u8u32(0xdd, len as u32)?;
            }
        }
    }
    Ok(())
}

fn write_key(tree: &DocumentTree<'_>, child: NodeId, out: &mut Writer) -> Result<(), MappingError> {
    match tree.node(child).name.as_ref() {
        // Indexed keys re-emit the original key token bytes untouched.
        Some(NodeName::Span { buffer, token, .. }) => {
            out.buf(&tree.buffer_bytes(*buffer)[token.offset..token.end()])?;
        }
        Some(NodeName::Owned(name)) => {
            if name.len() <= 0x1f {
                out.u8(0xa0 | name.len() as u8)?;
            } else if name.len() <= 0xff {
                out.u8(0xd9)?;
                out.u8(name.len() as u8)?;
            } else if name.len() <= 0xffff {
                out.u8u16(0xda, name.len() as u16)?;
            } else {
                out.u8u32(0xdb, name.len() as u32)?;
            }
            out.buf(name)?;
        }
        None => {}
    }
    Ok(())
}
