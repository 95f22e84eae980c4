/// Errors surfaced by an `Embedder` implementation.
///
/// The engine treats these as transient: a failed batch marks the affected
/// files `status=error` and indexing continues.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("embedding provider unavailable: {message}")]
    Unavailable { message: String },

    #[error("embedding request failed: {message}")]
    Request { message: String },

    #[error("provider returned {actual} vectors for {expected} inputs")]
    BatchShape { expected: usize, actual: usize },
}
