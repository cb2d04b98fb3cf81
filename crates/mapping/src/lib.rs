//! MessagePack document indexing, value mapping, and re-serialization.
//!
//! Builds zero-copy span trees over encoded documents, grafts queried values
//! from a source document into a destination tree, and writes trees back to
//! wire bytes. Untouched subtrees round-trip byte-identically.
//!
//! # Example
//!
//! ```
//! use packpath_buffers::{BufferView, Writer};
//! use packpath_mapping::{DocumentExtractor, Mapping, TreeWriter};
//!
//! // {"a": 1} with $.a mapped to $.x yields {"x": 1}
//! let doc = [0x81, 0xa1, b'a', 0x01];
//! let mappings = [Mapping::parse("$.a", "$.x").unwrap()];
//! let tree = DocumentExtractor::extract_to_new(BufferView::new(&doc), &mappings).unwrap();
//!
//! let mut out = Writer::new();
//! TreeWriter::write(&tree, &mut out).unwrap();
//! assert_eq!(out.flush(), [0x81, 0xa1, b'x', 0x01]);
//! ```

mod error;
mod extractor;
mod indexer;
mod tree;
mod writer;

pub use error::MappingError;
pub use extractor::{DocumentExtractor, Mapping, TargetPath, TargetSegment};
pub use indexer::DocumentIndexer;
pub use tree::{BufferId, ContainerKind, DocumentTree, Node, NodeId, NodeName, NodePayload};
pub use writer::TreeWriter;
