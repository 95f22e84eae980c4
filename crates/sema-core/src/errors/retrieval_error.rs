use super::{EmbedError, StorageError};

/// Retrieval-pipeline errors. User-input problems (malformed FTS syntax)
/// never surface here; they degrade to empty keyword results at the store
/// boundary.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error("location {path}:{line} does not resolve to an indexed symbol")]
    UnknownLocation { path: String, line: u32 },
}
