use super::StorageError;

/// Graph-analysis errors (impact, branch diff).
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("symbol not found: {symbol_id}")]
    SymbolNotFound { symbol_id: String },
}
