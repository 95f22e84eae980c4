//! Query and result types for the retrieval pipeline.

use sema_core::types::{Edge, Symbol, SymbolKind};

/// A retrieval request. Any of the retrieval inputs may be absent: with only
/// `query_text` the pipeline is keyword-only, with only `embedding` it is
/// vector-only, with neither it returns an empty low-confidence result.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    /// Dense query vector, usually `embed(query text)`.
    pub embedding: Option<Vec<f32>>,
    /// Keyword query for the trigram BM25 index.
    pub query_text: Option<String>,
    /// Branch partition to search. Empty means the engine's current branch.
    pub branch: String,
    /// Overrides of the configured defaults.
    pub max_tokens: Option<usize>,
    pub graph_depth: Option<u32>,
    pub max_fan_out: Option<usize>,
    pub confidence_threshold: Option<f64>,
    /// Restrict results to these symbol kinds. Empty means all.
    pub symbol_kinds: Vec<SymbolKind>,
    pub limit: Option<usize>,
}

impl SearchQuery {
    pub fn is_empty(&self) -> bool {
        self.embedding.is_none()
            && self
                .query_text
                .as_deref()
                .map(|t| t.trim().is_empty())
                .unwrap_or(true)
    }
}

/// How much the result can be trusted, based on source agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultConfidence {
    /// Both retrieval sources contributed at least one hit.
    High,
    /// A single source contributed five or more hits.
    Medium,
    Low,
}

impl ResultConfidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultConfidence::High => "high",
            ResultConfidence::Medium => "medium",
            ResultConfidence::Low => "low",
        }
    }
}

/// Per-query diagnostics.
#[derive(Debug, Clone)]
pub struct QueryMetadata {
    pub query_time_ms: u64,
    pub vector_hits: usize,
    pub keyword_hits: usize,
    pub graph_expansions: usize,
    pub confidence: ResultConfidence,
    /// Set when the keyword query was syntactically malformed and degraded
    /// to an empty keyword list.
    pub keyword_syntax_error: bool,
}

/// The assembled answer: hydrated symbols in rank order, the edges that
/// connect them, and a token-budgeted context string.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub symbols: Vec<Symbol>,
    pub edges: Vec<Edge>,
    pub context: String,
    pub token_count: usize,
    pub metadata: QueryMetadata,
}

impl QueryResult {
    pub fn empty(confidence: ResultConfidence, query_time_ms: u64) -> Self {
        Self {
            symbols: Vec::new(),
            edges: Vec::new(),
            context: String::new(),
            token_count: 0,
            metadata: QueryMetadata {
                query_time_ms,
                vector_hits: 0,
                keyword_hits: 0,
                graph_expansions: 0,
                confidence,
                keyword_syntax_error: false,
            },
        }
    }
}
