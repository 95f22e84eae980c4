use crate::errors::EmbedError;

/// Embedding generation provider.
///
/// The implementation is opaque to the core: local ONNX model, remote API,
/// anything that maps text to a fixed-dimension dense vector. All vectors
/// returned by one provider must share `dimension()`.
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Embed a batch of texts. Must return exactly one vector per input, in
    /// input order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Dimensionality of produced vectors.
    fn dimension(&self) -> u32;

    /// Stable identifier of the underlying model. A change forces a full
    /// re-embed of the store.
    fn model_id(&self) -> &str;
}
