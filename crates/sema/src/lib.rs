//! sema: a semantic code intelligence engine.
//!
//! Ingests a source tree, extracts a symbol graph (functions, classes,
//! interfaces, types and the call/import edges among them), embeds each
//! symbol as a dense vector, and answers natural-language and structural
//! queries by fusing vector similarity, keyword (BM25) search and
//! depth-limited graph traversal into a single token-budgeted context
//! bundle. Branch-aware, incrementally refreshed via a Merkle cache.
//!
//! The [`Engine`] is the single entry point; construct one per workspace
//! and call [`Engine::update`], [`Engine::search`], [`Engine::impact`] and
//! [`Engine::diff`].

mod engine;

pub use engine::{Engine, SimilarTarget};

pub use sema_analysis::{
    BranchDiff, DiffOptions, DiffSummary, ImpactConfidence, ImpactOptions, ImpactReport, RiskLevel,
};
pub use sema_core::config::SemaConfig;
pub use sema_core::errors::{
    AnalysisError, ConfigError, EmbedError, ExtractError, IndexError, RetrievalError, StorageError,
};
pub use sema_core::traits::{
    Embedder, IndexPhase, LanguageAdapter, NullProgress, ProgressEvent, ProgressSink,
    RelationshipSource,
};
pub use sema_core::types::{
    Edge, EdgeKind, EdgeOrigin, FileRecord, FileStatus, RawEdge, RawSymbol, RepoMapEntry, Symbol,
    SymbolKind,
};
pub use sema_index::{IndexStatus, UpdateSummary};
pub use sema_retrieval::{
    QueryMetadata, QueryResult, ResultConfidence, SearchQuery, SimilarResult,
};
