//! Graph expansion: BFS over CALLS edges around the top retrieval hits.
//!
//! Both directions are walked (callers and callees), depth- and fan-out-
//! bounded, with a visited set so cyclic call graphs terminate. Edges below
//! the confidence threshold are dropped before the fan-out cut.

use rustc_hash::{FxHashMap, FxHashSet};
use sema_core::errors::RetrievalError;
use sema_core::types::{Edge, Symbol, SymbolKind};
use sema_storage::Store;

/// Nodes and edges gathered by one expansion pass.
#[derive(Debug, Default)]
pub struct GraphExpansion {
    /// Newly reached symbols, keyed by id (seeds are not repeated here).
    pub nodes: Vec<Symbol>,
    /// Every edge that survived the confidence and fan-out cuts.
    pub edges: Vec<Edge>,
    /// Number of BFS visits performed.
    pub expansions: usize,
}

/// Expand callers and callees of `seeds` up to `depth` hops.
pub fn expand(
    store: &Store,
    seeds: &[Symbol],
    branch: &str,
    depth: u32,
    max_fan_out: usize,
    confidence_threshold: f64,
    kinds: &[SymbolKind],
) -> Result<GraphExpansion, RetrievalError> {
    let mut result = GraphExpansion::default();
    if depth == 0 || seeds.is_empty() {
        return Ok(result);
    }

    let mut visited: FxHashSet<String> = seeds.iter().map(|s| s.id.clone()).collect();
    let mut seen_edges: FxHashSet<String> = FxHashSet::default();
    let mut nodes: FxHashMap<String, Symbol> = FxHashMap::default();
    let mut frontier: Vec<String> = seeds.iter().map(|s| s.id.clone()).collect();

    for _hop in 0..depth {
        let mut next_frontier = Vec::new();

        for symbol_id in &frontier {
            result.expansions += 1;

            let mut candidates: Vec<Edge> = store.callers(symbol_id, branch)?;
            candidates.extend(store.callees(symbol_id, branch)?);
            candidates.retain(|e| e.confidence >= confidence_threshold);
            candidates.sort_by(|a, b| {
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.id.cmp(&b.id))
            });
            candidates.truncate(max_fan_out);

            for edge in candidates {
                let neighbor_id = if edge.target_id == *symbol_id {
                    edge.source_id.clone()
                } else {
                    edge.target_id.clone()
                };

                if seen_edges.insert(edge.id.clone()) {
                    result.edges.push(edge);
                }
                if !visited.insert(neighbor_id.clone()) {
                    continue;
                }

                let Some(neighbor) = store.symbol_by_id(&neighbor_id, branch)? else {
                    continue;
                };
                // The kind filter prunes nodes (and traversal through them);
                // retained edges stay in the result regardless.
                if !neighbor.matches_kinds(kinds) {
                    continue;
                }
                nodes.insert(neighbor_id.clone(), neighbor);
                next_frontier.push(neighbor_id);
            }
        }

        if next_frontier.is_empty() {
            break;
        }
        frontier = next_frontier;
    }

    let mut collected: Vec<Symbol> = nodes.into_values().collect();
    collected.sort_by(|a, b| a.id.cmp(&b.id));
    result.nodes = collected;
    Ok(result)
}
