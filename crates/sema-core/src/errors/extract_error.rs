/// Extraction errors. Per-file failures are recorded on the FileRecord and
/// never abort an indexing run.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("adapter failed on {path}: {message}")]
    Adapter { path: String, message: String },

    #[error("relationship source failed on {path}: {message}")]
    RelationshipSource { path: String, message: String },
}
