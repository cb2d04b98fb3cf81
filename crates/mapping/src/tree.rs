//! Span-indexed document tree.
//!
//! Nodes live in an arena and reference each other by integer id, so the
//! tree is append-only and acyclic by construction: children are attached,
//! never linked back to an ancestor. A node is either a zero-copy span into
//! one of the registered backing buffers or a synthetic container created
//! during extraction. Because grafted spans keep their own buffer handle,
//! one tree can reference several distinct backing buffers at once.

use packpath_buffers::Span;

/// Arena index of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(u32);

impl NodeId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Handle to one of the tree's registered backing buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferId(u32);

impl BufferId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Map,
    Array,
}

/// How a map child is named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeName {
    /// Key read while indexing: `token` spans the whole key encoding (so it
    /// can be re-emitted verbatim), `name` just the raw name bytes.
    Span {
        buffer: BufferId,
        token: Span,
        name: Span,
    },
    /// Name introduced by the extractor.
    Owned(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    /// Zero-copy reference to a complete value encoding — a scalar, or a
    /// whole container subtree grafted as an opaque blob.
    Span { buffer: BufferId, span: Span },
    /// Navigable container. `span` is present for indexed containers and
    /// lets an unmodified subtree be written back verbatim; `dirty` is set
    /// once the subtree is touched by extraction.
    Container {
        kind: ContainerKind,
        span: Option<(BufferId, Span)>,
        dirty: bool,
        children: Vec<NodeId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: Option<NodeName>,
    pub payload: NodePayload,
}

/// A navigable tree of spans over one or more document buffers.
///
/// Read-mostly: lookups walk parent→child links without re-parsing;
/// mutation is only performed by the extractor and is append/replace-only.
/// Not thread-safe; confine to one logical task per run.
#[derive(Debug)]
pub struct DocumentTree<'a> {
    nodes: Vec<Node>,
    buffers: Vec<&'a [u8]>,
    root: NodeId,
}

impl<'a> DocumentTree<'a> {
    /// An empty synthetic map root — the usual starting point for building
    /// a merged document from scratch.
    pub fn new_map_root() -> Self {
        let mut tree = Self::empty();
        let root = tree.new_synthetic(ContainerKind::Map);
        tree.root = root;
        tree
    }

    /// Tree with no nodes yet; the first added node becomes the root.
    pub(crate) fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            buffers: Vec::new(),
            root: NodeId(0),
        }
    }

    /// Registers a backing buffer and returns its handle.
    pub fn register_buffer(&mut self, data: &'a [u8]) -> BufferId {
        self.buffers.push(data);
        BufferId((self.buffers.len() - 1) as u32)
    }

    pub fn buffer_bytes(&self, id: BufferId) -> &'a [u8] {
        self.buffers[id.idx()]
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.root = id;
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.idx()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.idx()]
    }

    pub(crate) fn add_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId((self.nodes.len() - 1) as u32)
    }

    /// Creates an unattached synthetic container node.
    pub fn new_synthetic(&mut self, kind: ContainerKind) -> NodeId {
        self.add_node(Node {
            name: None,
            payload: NodePayload::Container {
                kind,
                span: None,
                dirty: true,
                children: Vec::new(),
            },
        })
    }

    /// Creates an unattached span node referencing `span` in `buffer`.
    pub fn new_span_node(&mut self, buffer: BufferId, span: Span) -> NodeId {
        self.add_node(Node {
            name: None,
            payload: NodePayload::Span { buffer, span },
        })
    }

    pub(crate) fn set_name_owned(&mut self, id: NodeId, name: Vec<u8>) {
        self.node_mut(id).name = Some(NodeName::Owned(name));
    }

    /// Marks a container as touched so the writer re-emits its header
    /// instead of copying the original subtree bytes.
    pub(crate) fn mark_dirty(&mut self, id: NodeId) {
        if let NodePayload::Container { dirty, .. } = &mut self.node_mut(id).payload {
            *dirty = true;
        }
    }

    /// Attaches a child while indexing, without disturbing the parent's
    /// verbatim-write eligibility.
    pub(crate) fn attach_child(&mut self, parent: NodeId, child: NodeId) {
        if let NodePayload::Container { children, .. } = &mut self.node_mut(parent).payload {
            children.push(child);
        }
    }

    /// Appends a child as a mutation: the parent's declared child count
    /// grows and its subtree can no longer be written verbatim.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.mark_dirty(parent);
        self.attach_child(parent, child);
    }

    /// Replaces the child at `position`, keeping its place and name.
    pub fn replace_child(&mut self, parent: NodeId, position: usize, child: NodeId) {
        let old = self.children(parent)[position];
        let name = self.node(old).name.clone();
        self.node_mut(child).name = name;
        self.mark_dirty(parent);
        if let NodePayload::Container { children, .. } = &mut self.node_mut(parent).payload {
            children[position] = child;
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).payload {
            NodePayload::Container { children, .. } => children,
            NodePayload::Span { .. } => &[],
        }
    }

    /// Raw name bytes of a map child.
    pub fn name_bytes(&self, id: NodeId) -> Option<&[u8]> {
        match self.node(id).name.as_ref()? {
            NodeName::Span { buffer, name, .. } => {
                Some(&self.buffer_bytes(*buffer)[name.offset..name.end()])
            }
            NodeName::Owned(bytes) => Some(bytes),
        }
    }

    /// Finds a map child by raw name bytes, returning its position and id.
    pub fn child_by_name(&self, parent: NodeId, name: &[u8]) -> Option<(usize, NodeId)> {
        self.children(parent)
            .iter()
            .enumerate()
            .find(|(_, &child)| self.name_bytes(child) == Some(name))
            .map(|(position, &child)| (position, child))
    }

    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent).get(index).copied()
    }
}
