//! The hybrid search pipeline.

use std::time::Instant;

use rustc_hash::FxHashMap;
use sema_core::config::RetrievalConfig;
use sema_core::constants::{GRAPH_DEPTH_MAX, GRAPH_SEED_COUNT};
use sema_core::errors::RetrievalError;
use sema_core::types::Symbol;
use sema_storage::Store;

use crate::expansion;
use crate::fusion;
use crate::packing;
use crate::query::{QueryMetadata, QueryResult, ResultConfidence, SearchQuery};

/// Synchronous, lock-free reader over the store. Construct once per engine
/// and share; all state lives in the store snapshot.
pub struct Retriever<'a> {
    store: &'a Store,
    config: &'a RetrievalConfig,
}

impl<'a> Retriever<'a> {
    pub fn new(store: &'a Store, config: &'a RetrievalConfig) -> Self {
        Self { store, config }
    }

    /// Run the full pipeline: parallel retrieval → RRF → hydration → graph
    /// expansion → token packing. Always returns a result; data-quality
    /// problems show up in `metadata.confidence`, not as errors.
    pub fn search(&self, query: &SearchQuery) -> Result<QueryResult, RetrievalError> {
        let started = Instant::now();

        if query.is_empty() {
            return Ok(QueryResult::empty(
                ResultConfidence::Low,
                started.elapsed().as_millis() as u64,
            ));
        }

        let branch = query.branch.as_str();
        let limit = query.limit.unwrap_or(self.config.retrieval_limit);

        // Step 1: both sources in parallel. Either may be absent or empty.
        let (vector_outcome, keyword_outcome) = rayon::join(
            || match &query.embedding {
                Some(embedding) => self
                    .store
                    .vector_search(embedding, limit, Some(branch))
                    .map(|hits| hits.into_iter().map(|h| h.symbol_id).collect::<Vec<_>>()),
                None => Ok(Vec::new()),
            },
            || match query.query_text.as_deref() {
                Some(text) if !text.trim().is_empty() => {
                    self.store.keyword_search(text, limit, Some(branch))
                }
                _ => Ok(Default::default()),
            },
        );
        let vector_ids = vector_outcome?;
        let keyword_search = keyword_outcome?;

        // Step 2/3: exact-name boost inside the keyword source, then fusion.
        let mut hydrated: FxHashMap<String, Symbol> = FxHashMap::default();
        let keyword_ids = self.rank_keyword_hits(
            &keyword_search.hits,
            query.query_text.as_deref().unwrap_or(""),
            branch,
            &mut hydrated,
        )?;

        let vector_hits = vector_ids.len();
        let keyword_hits = keyword_ids.len();
        let fused = fusion::fuse(&[vector_ids, keyword_ids], self.config.rrf_k);

        tracing::debug!(
            vector_hits,
            keyword_hits,
            fused = fused.len(),
            "retrieval sources fused"
        );

        // Step 4: hydrate the fused ranking, applying the kind filter.
        let mut symbols: Vec<Symbol> = Vec::new();
        for hit in &fused {
            let sym = match hydrated.remove(&hit.symbol_id) {
                Some(sym) => Some(sym),
                None => self.store.symbol_by_id(&hit.symbol_id, branch)?,
            };
            if let Some(sym) = sym {
                if sym.matches_kinds(&query.symbol_kinds) && !sym.is_external {
                    symbols.push(sym);
                }
            }
        }

        // Step 5: graph expansion around the strongest hits.
        let depth = query
            .graph_depth
            .unwrap_or(self.config.graph_depth)
            .min(GRAPH_DEPTH_MAX);
        let seeds: Vec<Symbol> = symbols.iter().take(GRAPH_SEED_COUNT).cloned().collect();
        let expanded = expansion::expand(
            self.store,
            &seeds,
            branch,
            depth,
            query.max_fan_out.unwrap_or(self.config.max_fan_out),
            query
                .confidence_threshold
                .unwrap_or(self.config.confidence_threshold),
            &query.symbol_kinds,
        )?;

        let known: rustc_hash::FxHashSet<&str> = symbols.iter().map(|s| s.id.as_str()).collect();
        let new_nodes: Vec<Symbol> = expanded
            .nodes
            .into_iter()
            .filter(|n| !known.contains(n.id.as_str()))
            .collect();
        symbols.extend(new_nodes);

        // Step 6: pack into the token budget, fused order first.
        let max_tokens = query.max_tokens.unwrap_or(self.config.max_tokens);
        let packed = packing::pack(&symbols, max_tokens);

        let confidence = grade_confidence(vector_hits, keyword_hits);
        Ok(QueryResult {
            symbols,
            edges: expanded.edges,
            context: packed.context,
            token_count: packed.token_count,
            metadata: QueryMetadata {
                query_time_ms: started.elapsed().as_millis() as u64,
                vector_hits,
                keyword_hits,
                graph_expansions: expanded.expansions,
                confidence,
                keyword_syntax_error: keyword_search.syntax_error,
            },
        })
    }

    /// Order keyword hits by boosted BM25 score. BM25 ranks are
    /// lower-is-better; exact name matches are doubled in score space before
    /// ranks are assigned, so the boost happens inside this source and never
    /// leaks into RRF.
    fn rank_keyword_hits(
        &self,
        hits: &[(String, f64)],
        query_text: &str,
        branch: &str,
        hydrated: &mut FxHashMap<String, Symbol>,
    ) -> Result<Vec<String>, RetrievalError> {
        let boost = self.config.exact_name_boost;
        let mut scored: Vec<(String, f64)> = Vec::with_capacity(hits.len());

        for (symbol_id, bm25_rank) in hits {
            let Some(sym) = self.store.symbol_by_id(symbol_id, branch)? else {
                continue;
            };
            // FTS5 bm25 is negative, more negative = better. Flip to
            // higher-is-better before boosting.
            let mut score = -bm25_rank;
            if sym.name == query_text {
                score *= boost;
            }
            hydrated.insert(symbol_id.clone(), sym);
            scored.push((symbol_id.clone(), score));
        }

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        Ok(scored.into_iter().map(|(id, _)| id).collect())
    }
}

/// High iff both sources contributed; medium when one source produced a
/// solid list on its own.
fn grade_confidence(vector_hits: usize, keyword_hits: usize) -> ResultConfidence {
    if vector_hits >= 1 && keyword_hits >= 1 {
        ResultConfidence::High
    } else if vector_hits + keyword_hits >= 5 {
        ResultConfidence::Medium
    } else {
        ResultConfidence::Low
    }
}
