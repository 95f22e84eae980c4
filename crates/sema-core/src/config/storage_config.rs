use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Persisted-layout options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Location of the relational/FTS/vector store.
    pub db_path: PathBuf,
    /// Location of the Merkle snapshot.
    pub cache_path: PathBuf,
    /// Read connections kept in the pool.
    pub read_pool_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(".sema/index.db"),
            cache_path: PathBuf::from(".sema/merkle-cache.json"),
            read_pool_size: 4,
        }
    }
}
