//! Path queries over raw MessagePack documents.
//!
//! This crate answers "where, inside this byte buffer, does the value at
//! path `P` live?" without materializing an object graph. A path expression
//! is compiled once into an immutable [`PathQuery`], then evaluated in a
//! single streaming pass over the document; matches come back as byte spans
//! into the original buffer.
//!
//! # Example
//!
//! ```
//! use packpath_buffers::BufferView;
//! use packpath_query::{PathQuery, QueryExecutor};
//!
//! // {"a": 1}
//! let doc = [0x81, 0xa1, b'a', 0x01];
//! let query = PathQuery::compile("$.a").unwrap();
//! let state = QueryExecutor::run_one(BufferView::new(&doc), &query).unwrap();
//! let span = state.results()[0].value_span;
//! assert_eq!(doc[span.offset..span.end()], [0x01]);
//! ```

mod compiler;
mod error;
mod executor;
mod token;
mod traverse;

pub use compiler::{PathQuery, Step};
pub use error::{DocumentError, PathParseError, QueryError};
pub use executor::{MatchResult, MatchState, QueryExecutor};
pub use token::{Token, TokenKind, TokenReader};
pub use traverse::{Entry, Traverser, Visitor};
