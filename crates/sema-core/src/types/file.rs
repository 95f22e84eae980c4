use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a file in the indexing state machine.
///
/// `Pending → Indexing → Indexed`, with `Indexing → Error` on failure.
/// Transitions are persisted on the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Pending,
    Indexing,
    Indexed,
    Error,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Pending => "pending",
            FileStatus::Indexing => "indexing",
            FileStatus::Indexed => "indexed",
            FileStatus::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<FileStatus> {
        match s {
            "pending" => Some(FileStatus::Pending),
            "indexing" => Some(FileStatus::Indexing),
            "indexed" => Some(FileStatus::Indexed),
            "error" => Some(FileStatus::Error),
            _ => None,
        }
    }
}

/// Per-branch file metadata. `(file_path, branch)` is the primary key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub file_path: String,
    pub branch: String,
    /// Content fingerprint as stored in the Merkle cache.
    pub file_hash: String,
    pub mtime_ms: i64,
    pub size: u64,
    pub last_indexed: DateTime<Utc>,
    pub language: Option<String>,
    pub status: FileStatus,
    pub symbol_count: u32,
    pub importance_rank: Option<f64>,
    pub error_message: Option<String>,
}

impl FileRecord {
    /// A fresh record for a file about to be indexed for the first time.
    pub fn pending(file_path: &str, branch: &str, file_hash: &str, mtime_ms: i64, size: u64) -> Self {
        Self {
            file_path: file_path.to_string(),
            branch: branch.to_string(),
            file_hash: file_hash.to_string(),
            mtime_ms,
            size,
            last_indexed: Utc::now(),
            language: None,
            status: FileStatus::Pending,
            symbol_count: 0,
            importance_rank: None,
            error_message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips() {
        for status in [
            FileStatus::Pending,
            FileStatus::Indexing,
            FileStatus::Indexed,
            FileStatus::Error,
        ] {
            assert_eq!(FileStatus::parse(status.as_str()), Some(status));
        }
    }
}
