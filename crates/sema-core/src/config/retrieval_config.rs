use serde::{Deserialize, Serialize};

use crate::constants;

/// Read-path options: retrieval limits, fusion, traversal, packing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Max candidates per retrieval source before fusion.
    pub retrieval_limit: usize,
    /// RRF smoothing constant.
    pub rrf_k: u32,
    /// Multiplier for keyword hits whose name equals the query exactly.
    pub exact_name_boost: f64,
    /// Default BFS depth for graph expansion (hard cap 3).
    pub graph_depth: u32,
    /// Per-hop edge fan-out cap.
    pub max_fan_out: usize,
    /// Minimum edge confidence retained during traversal.
    pub confidence_threshold: f64,
    /// Token budget for the packed context bundle.
    pub max_tokens: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            retrieval_limit: constants::RETRIEVAL_LIMIT,
            rrf_k: constants::RRF_K,
            exact_name_boost: constants::EXACT_NAME_BOOST,
            graph_depth: constants::GRAPH_DEPTH_DEFAULT,
            max_fan_out: constants::MAX_FAN_OUT,
            confidence_threshold: constants::CONFIDENCE_THRESHOLD,
            max_tokens: constants::MAX_TOKENS,
        }
    }
}
