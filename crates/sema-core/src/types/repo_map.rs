use serde::{Deserialize, Serialize};

/// Per-file, per-branch importance record derived from the import graph.
///
/// `importance_score` is the normalized degree centrality of the file:
/// files that many others import rank high and get surfaced first in
/// repo-level summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoMapEntry {
    pub file_path: String,
    pub branch: String,
    pub importance_score: f64,
    pub in_degree: u32,
    pub out_degree: u32,
    pub symbol_summary: Option<String>,
}
