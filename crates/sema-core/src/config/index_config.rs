use serde::{Deserialize, Serialize};

use crate::constants;

/// Write-path options: discovery, parallelism, embedding, auto-refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Glob patterns of files to index. Empty means "every extension an
    /// adapter claims".
    pub include_patterns: Vec<String>,
    /// Glob patterns excluded from discovery, on top of the built-in list
    /// (node_modules, dist, .git, target, ...).
    pub exclude_patterns: Vec<String>,
    /// Bounded fan-out for file-level indexing.
    pub parallelism: usize,
    /// Texts per `embed_batch` call.
    pub embedding_batch_size: usize,
    /// Dimension recorded in schema metadata at store creation.
    pub embedding_dimension: u32,
    /// Embedder LRU capacity (entries).
    pub embed_cache_capacity: u64,
    /// Fallback chunker bounds, used when a file yields no symbols.
    pub max_chunk_lines: u32,
    pub chunk_overlap: u32,
    /// Auto-refresh hook on the read path.
    pub auto_refresh: bool,
    pub auto_refresh_cooldown_ms: u64,
    pub auto_refresh_max_files: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            parallelism: constants::PARALLELISM,
            embedding_batch_size: constants::EMBEDDING_BATCH_SIZE,
            embedding_dimension: 384,
            embed_cache_capacity: constants::EMBED_CACHE_CAPACITY,
            max_chunk_lines: constants::MAX_CHUNK_LINES,
            chunk_overlap: constants::CHUNK_OVERLAP,
            auto_refresh: true,
            auto_refresh_cooldown_ms: constants::AUTO_REFRESH_COOLDOWN_MS,
            auto_refresh_max_files: constants::AUTO_REFRESH_MAX_FILES,
        }
    }
}
