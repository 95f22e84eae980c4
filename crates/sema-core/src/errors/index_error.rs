use super::{ConfigError, EmbedError, ExtractError, StorageError};

/// Index-manager errors for `update`/`rebuild` and the auto-refresh hook.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("an indexing run is already in progress")]
    IndexingAlreadyInProgress,

    #[error("workspace root does not exist: {path}")]
    MissingRoot { path: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error("merkle cache error: {message}")]
    Merkle { message: String },
}
