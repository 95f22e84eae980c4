//! Layered configuration.
//!
//! Resolution order (highest priority first): caller overrides, environment
//! variables (`SEMA_*`), project config (`sema.toml` in the workspace root),
//! compiled defaults. Validation runs on the resolved value and fails fast.

mod index_config;
mod retrieval_config;
mod storage_config;

pub use index_config::IndexConfig;
pub use retrieval_config::RetrievalConfig;
pub use storage_config::StorageConfig;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::errors::ConfigError;

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SemaConfig {
    pub storage: StorageConfig,
    pub index: IndexConfig,
    pub retrieval: RetrievalConfig,
    /// Branch partition queries and writes operate on. Resolved from
    /// `.git/HEAD` when left empty.
    pub branch: String,
}

impl SemaConfig {
    /// Load configuration for a workspace root.
    ///
    /// Layers: defaults ← `<root>/sema.toml` (when present) ← `SEMA_*`
    /// environment variables. The result is validated before it is returned.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = match Self::project_file(root) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env_overrides();

        if config.branch.is_empty() {
            config.branch = detect_branch(root).unwrap_or_else(|| "main".to_string());
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    fn project_file(root: &Path) -> Option<std::path::PathBuf> {
        let path = root.join("sema.toml");
        path.exists().then_some(path)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply environment variable overrides. Pattern: `SEMA_BRANCH`,
    /// `SEMA_PARALLELISM`, `SEMA_MAX_TOKENS`, etc. Unparseable values are
    /// ignored, matching the file-layer's forward-compatible stance.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SEMA_DB_PATH") {
            self.storage.db_path = val.into();
        }
        if let Ok(val) = std::env::var("SEMA_CACHE_PATH") {
            self.storage.cache_path = val.into();
        }
        if let Ok(val) = std::env::var("SEMA_BRANCH") {
            self.branch = val;
        }
        if let Ok(val) = std::env::var("SEMA_PARALLELISM") {
            if let Ok(v) = val.parse::<usize>() {
                self.index.parallelism = v;
            }
        }
        if let Ok(val) = std::env::var("SEMA_AUTO_REFRESH") {
            if let Ok(v) = val.parse::<bool>() {
                self.index.auto_refresh = v;
            }
        }
        if let Ok(val) = std::env::var("SEMA_MAX_TOKENS") {
            if let Ok(v) = val.parse::<usize>() {
                self.retrieval.max_tokens = v;
            }
        }
        if let Ok(val) = std::env::var("SEMA_EMBEDDING_DIMENSION") {
            if let Ok(v) = val.parse::<u32>() {
                self.index.embedding_dimension = v;
            }
        }
    }

    /// Validate the resolved configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.index.parallelism == 0 {
            return Err(ConfigError::Validation {
                field: "index.parallelism".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.index.embedding_batch_size == 0 {
            return Err(ConfigError::Validation {
                field: "index.embedding_batch_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.index.embedding_dimension == 0 {
            return Err(ConfigError::Validation {
                field: "index.embedding_dimension".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.index.max_chunk_lines == 0 {
            return Err(ConfigError::Validation {
                field: "index.max_chunk_lines".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.index.chunk_overlap >= self.index.max_chunk_lines {
            return Err(ConfigError::Validation {
                field: "index.chunk_overlap".to_string(),
                message: "must be smaller than max_chunk_lines".to_string(),
            });
        }
        if self.retrieval.graph_depth > constants::GRAPH_DEPTH_MAX {
            return Err(ConfigError::Validation {
                field: "retrieval.graph_depth".to_string(),
                message: format!("must be at most {}", constants::GRAPH_DEPTH_MAX),
            });
        }
        if !(0.0..=1.0).contains(&self.retrieval.confidence_threshold) {
            return Err(ConfigError::Validation {
                field: "retrieval.confidence_threshold".to_string(),
                message: "must be between 0.0 and 1.0".to_string(),
            });
        }
        if self.retrieval.rrf_k == 0 {
            return Err(ConfigError::Validation {
                field: "retrieval.rrf_k".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Read the current branch name from `.git/HEAD` without shelling out.
/// Detached heads and missing repositories yield `None`.
pub fn detect_branch(root: &Path) -> Option<String> {
    let head = std::fs::read_to_string(root.join(".git/HEAD")).ok()?;
    let head = head.trim();
    head.strip_prefix("ref: refs/heads/").map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        SemaConfig::default().validate().unwrap();
    }

    #[test]
    fn graph_depth_is_capped() {
        let mut config = SemaConfig::default();
        config.retrieval.graph_depth = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn chunk_overlap_must_fit() {
        let mut config = SemaConfig::default();
        config.index.chunk_overlap = config.index.max_chunk_lines;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SemaConfig::from_toml(
            r#"
            branch = "feature/x"

            [retrieval]
            max_tokens = 4000
            "#,
        )
        .unwrap();
        assert_eq!(config.branch, "feature/x");
        assert_eq!(config.retrieval.max_tokens, 4000);
        assert_eq!(config.retrieval.rrf_k, constants::RRF_K);
        assert_eq!(config.index.parallelism, constants::PARALLELISM);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = SemaConfig::from_toml("branch = [not toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn detect_branch_reads_head() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/feature/y\n").unwrap();
        assert_eq!(detect_branch(dir.path()), Some("feature/y".to_string()));
    }

    #[test]
    fn detached_head_is_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git/HEAD"), "0123abcd\n").unwrap();
        assert_eq!(detect_branch(dir.path()), None);
    }
}
