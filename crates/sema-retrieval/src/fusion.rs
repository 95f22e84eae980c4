//! Reciprocal Rank Fusion: score = Σ 1/(k + rank_i)
//!
//! Combines ranked lists from different retrieval methods without requiring
//! score normalization across them. Ranks are 0-based; ties in the fused
//! score break by ascending symbol id so results are deterministic.

use rustc_hash::FxHashMap;

/// A fused candidate: symbol id plus its combined score.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedHit {
    pub symbol_id: String,
    pub score: f64,
}

/// Fuse ranked id lists. Each inner list is ordered best-first; an id may
/// appear in several lists and accumulates score from each.
pub fn fuse(ranked_lists: &[Vec<String>], k: u32) -> Vec<FusedHit> {
    let mut scores: FxHashMap<String, f64> = FxHashMap::default();

    for list in ranked_lists {
        for (rank, symbol_id) in list.iter().enumerate() {
            let rrf = 1.0 / (k as f64 + rank as f64);
            *scores.entry(symbol_id.clone()).or_default() += rrf;
        }
    }

    let mut fused: Vec<FusedHit> = scores
        .into_iter()
        .map(|(symbol_id, score)| FusedHit { symbol_id, score })
        .collect();

    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.symbol_id.cmp(&b.symbol_id))
    });

    fused
}
