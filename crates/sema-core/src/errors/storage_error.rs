/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to open store at {path}: {message}")]
    Open { path: String, message: String },

    #[error("migration failed at version {version}: {message}")]
    Migration { version: u32, message: String },

    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("failed to serialize embedding for {symbol_id}: {message}")]
    SerializeEmbedding { symbol_id: String, message: String },

    #[error("embedding dimension mismatch: store is {expected}, got {actual}")]
    DimensionMismatch { expected: u32, actual: u32 },

    #[error("database corruption detected: {details} (delete the index file and re-index)")]
    Corrupt { details: String },
}

impl StorageError {
    /// Shorthand for wrapping a rusqlite failure message.
    pub fn sqlite(message: impl std::fmt::Display) -> Self {
        StorageError::Sqlite {
            message: message.to_string(),
        }
    }
}
