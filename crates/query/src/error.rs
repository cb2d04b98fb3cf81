use thiserror::Error;

/// Path expression compilation failures. Each variant carries the offending
/// expression and, where meaningful, the byte offset within it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    #[error("path {expr:?} must start with the root marker '$'")]
    ExpectedRoot { expr: String },
    #[error("unexpected character {ch:?} at offset {pos} in path {expr:?}")]
    UnexpectedChar { expr: String, pos: usize, ch: char },
    #[error("unterminated bracket selector at offset {pos} in path {expr:?}")]
    UnterminatedBracket { expr: String, pos: usize },
    #[error("invalid array index at offset {pos} in path {expr:?}")]
    InvalidIndex { expr: String, pos: usize },
    #[error("empty member name at offset {pos} in path {expr:?}")]
    EmptyMember { expr: String, pos: usize },
    #[error("path {expr:?} ends unexpectedly")]
    UnexpectedEnd { expr: String },
}

/// Structural failures of the input document. Always fatal to the current
/// operation; no partial result is returned.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DocumentError {
    #[error("document truncated at offset {offset}")]
    Truncated { offset: usize },
    #[error("unexpected token byte 0x{byte:02x} at offset {offset}")]
    UnexpectedToken { byte: u8, offset: usize },
}

/// Query evaluation failures surfaced on result navigation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    #[error("no match result at index {index}, {available} available")]
    NoSuchResult { index: usize, available: usize },
    #[error(transparent)]
    Document(#[from] DocumentError),
}
