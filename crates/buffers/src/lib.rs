//! Byte-buffer primitives shared by the packpath crates: bounds-checked
//! read-only views, a cursor reader, and a byte sink that can either grow
//! on demand or enforce a hard capacity limit.

mod error;
mod reader;
mod view;
mod writer;

pub use error::BufferError;
pub use reader::Reader;
pub use view::{BufferView, Span};
pub use writer::Writer;
