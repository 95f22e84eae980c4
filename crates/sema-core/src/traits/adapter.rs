use crate::errors::ExtractError;
use crate::types::Extraction;

/// Per-language symbol extraction adapter.
///
/// Adapters are lexical and infallible in spirit: a file they cannot make
/// sense of should yield an empty `Extraction`, reserving `Err` for genuine
/// failures (which the indexer records on the FileRecord and moves on).
pub trait LanguageAdapter: Send + Sync {
    /// Language names this adapter covers (e.g. `["typescript", "javascript"]`).
    fn languages(&self) -> &[&str];

    /// File extensions routed to this adapter, without the leading dot.
    fn extensions(&self) -> &[&str];

    /// Extract symbols and lexically inferable edges from one file.
    fn extract(&self, source: &str, path: &str) -> Result<Extraction, ExtractError>;
}
