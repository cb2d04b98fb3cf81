use packpath_buffers::BufferError;
use packpath_query::{DocumentError, PathParseError};
use thiserror::Error;

/// Failures raised while setting up or applying mappings, plus the wrapped
/// failure surfaces of the layers below.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("mapping conflict at target {path:?}: {detail}")]
    Conflict { path: String, detail: String },
    #[error(transparent)]
    Path(#[from] PathParseError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}
