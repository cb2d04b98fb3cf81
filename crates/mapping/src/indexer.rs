//! Document indexer: one traversal pass that builds a [`DocumentTree`]
//! over a buffer for repeated random access without re-parsing.

use packpath_buffers::BufferView;
use packpath_query::{DocumentError, Entry, Token, TokenKind, Traverser, Visitor};

use crate::tree::{BufferId, ContainerKind, DocumentTree, Node, NodeId, NodeName, NodePayload};

/// Builds span trees from raw document buffers.
///
/// Costs O(tokens) time and one node per token; values are never copied,
/// only span bookkeeping is allocated.
pub struct DocumentIndexer;

impl DocumentIndexer {
    pub fn index(buffer: BufferView<'_>) -> Result<DocumentTree<'_>, DocumentError> {
        let mut tree = DocumentTree::empty();
        let handle = tree.register_buffer(buffer.bytes());
        let mut visitor = IndexVisitor {
            tree,
            buffer: handle,
            open: Vec::new(),
        };
        Traverser::traverse(buffer, &mut visitor)?;
        Ok(visitor.tree)
    }
}

struct IndexVisitor<'a> {
    tree: DocumentTree<'a>,
    buffer: BufferId,
    /// Stack of containers whose children are still being attached.
    open: Vec<NodeId>,
}

impl Visitor for IndexVisitor<'_> {
    fn on_token(&mut self, token: &Token, _depth: u32, entry: Entry) {
        let name = match entry {
            Entry::Key { token, name } => Some(NodeName::Span {
                buffer: self.buffer,
                token,
                name,
            }),
            _ => None,
        };
        let payload = match token.kind {
            TokenKind::MapHeader(_) => NodePayload::Container {
                kind: ContainerKind::Map,
                // span length is patched once the container closes
                span: Some((self.buffer, token.span)),
                dirty: false,
                children: Vec::new(),
            },
            TokenKind::ArrayHeader(_) => NodePayload::Container {
                kind: ContainerKind::Array,
                span: Some((self.buffer, token.span)),
                dirty: false,
                children: Vec::new(),
            },
            _ => NodePayload::Span {
                buffer: self.buffer,
                span: token.span,
            },
        };

        let id = self.tree.add_node(Node { name, payload });
        if let Some(&parent) = self.open.last() {
            self.tree.attach_child(parent, id);
        }
        if token.is_container() {
            self.open.push(id);
        }
    }

    fn on_container_end(&mut self, _depth: u32, end: usize) {
        if let Some(id) = self.open.pop() {
            if let NodePayload::Container {
                span: Some((_, span)),
                ..
            } = &mut self.tree.node_mut(id).payload
            {
                span.len = end - span.offset;
            }
        }
    }
}
