//! The engine facade: one value owning the store handle, the Merkle cache
//! and the embedder cache, constructed once per workspace and passed
//! explicitly to every operation. No singletons.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sema_analysis::{analyze_impact, diff_branches, BranchDiff, DiffOptions, ImpactOptions, ImpactReport};
use sema_core::config::SemaConfig;
use sema_core::errors::{AnalysisError, IndexError, RetrievalError};
use sema_core::traits::{Embedder, NullProgress, ProgressSink, RelationshipSource};
use sema_extract::ExtractorRegistry;
use sema_index::{CachingEmbedder, IndexManager, IndexStatus, UpdateSummary};
use sema_retrieval::{
    find_similar_at_location, find_similar_by_vector, Retriever, SearchQuery, SimilarResult,
};
use sema_retrieval::QueryResult;
use sema_storage::Store;

/// What to find similar symbols for.
#[derive(Debug, Clone)]
pub enum SimilarTarget {
    /// A free-standing code snippet, embedded on the fly.
    Code(String),
    /// An indexed location; uses the stored embedding of the symbol there.
    Location { path: String, line: u32 },
}

/// The engine: synchronous query/index API over one workspace.
pub struct Engine {
    config: SemaConfig,
    store: Arc<Store>,
    embedder: Arc<CachingEmbedder>,
    manager: IndexManager,
}

impl Engine {
    /// Open (or create) the engine for a workspace root.
    ///
    /// Configuration errors and store-schema problems fail here, fast;
    /// everything later degrades per operation.
    pub fn open(
        root: &Path,
        mut config: SemaConfig,
        embedder: Arc<dyn Embedder>,
        relationships: Option<Arc<dyn RelationshipSource>>,
        progress: Option<Arc<dyn ProgressSink>>,
    ) -> Result<Self, IndexError> {
        if config.branch.is_empty() {
            config.branch =
                sema_core::config::detect_branch(root).unwrap_or_else(|| "main".to_string());
        }
        config.validate()?;
        config.storage.db_path = absolutize(root, &config.storage.db_path);
        config.storage.cache_path = absolutize(root, &config.storage.cache_path);

        let store = Arc::new(Store::open(
            &config.storage.db_path,
            config.storage.read_pool_size,
        )?);
        let embedder = Arc::new(CachingEmbedder::new(
            embedder,
            config.index.embed_cache_capacity,
        ));
        let registry = Arc::new(ExtractorRegistry::with_builtin_adapters());
        let progress: Arc<dyn ProgressSink> = progress.unwrap_or_else(|| Arc::new(NullProgress));

        let manager = IndexManager::new(
            root,
            config.clone(),
            store.clone(),
            registry,
            embedder.clone(),
            relationships,
            progress,
        )?;

        tracing::info!(
            root = %root.display(),
            branch = %config.branch,
            db = %config.storage.db_path.display(),
            "engine open"
        );

        Ok(Self {
            config,
            store,
            embedder,
            manager,
        })
    }

    /// Convenience: open with configuration loaded from the workspace
    /// (`sema.toml`, `SEMA_*` environment, defaults).
    pub fn open_with_defaults(
        root: &Path,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, IndexError> {
        let config = SemaConfig::load(root)?;
        Self::open(root, config, embedder, None, None)
    }

    pub fn config(&self) -> &SemaConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn branch(&self) -> &str {
        &self.config.branch
    }

    // ── Index API ───────────────────────────────────────────────────────

    /// Incremental index update.
    pub fn update(&self) -> Result<UpdateSummary, IndexError> {
        self.manager.update()
    }

    /// Truncate the branch and re-index everything.
    pub fn rebuild(&self) -> Result<UpdateSummary, IndexError> {
        self.manager.rebuild()
    }

    /// Index health.
    pub fn status(&self) -> Result<IndexStatus, IndexError> {
        self.manager.status()
    }

    /// Cooperative cancellation of an in-flight indexing run.
    pub fn request_cancel(&self) {
        self.manager.request_cancel()
    }

    // ── Query API ───────────────────────────────────────────────────────

    /// Hybrid search. Auto-refreshes first (best-effort, bounded); the query
    /// itself runs against the store snapshot and always returns a result.
    pub fn search(&self, mut query: SearchQuery) -> Result<QueryResult, RetrievalError> {
        self.manager.ensure_fresh();
        if query.branch.is_empty() {
            query.branch = self.config.branch.clone();
        }
        Retriever::new(&self.store, &self.config.retrieval).search(&query)
    }

    /// Nearest symbols to a snippet or an indexed location.
    pub fn find_similar(
        &self,
        target: SimilarTarget,
        limit: usize,
    ) -> Result<Vec<SimilarResult>, RetrievalError> {
        self.manager.ensure_fresh();
        let branch = self.branch();
        match target {
            SimilarTarget::Code(code) => {
                let vector = self.embedder.embed(&code)?;
                find_similar_by_vector(&self.store, &vector, branch, limit, None)
            }
            SimilarTarget::Location { path, line } => {
                find_similar_at_location(&self.store, &path, line, branch, limit)
            }
        }
    }

    // ── Analysis API ────────────────────────────────────────────────────

    /// Transitive dependents of a symbol, with risk and data-quality grades.
    pub fn impact(
        &self,
        symbol_id: &str,
        options: &ImpactOptions,
    ) -> Result<ImpactReport, AnalysisError> {
        self.manager.ensure_fresh();
        analyze_impact(&self.store, symbol_id, self.branch(), options)
    }

    /// Symbol and edge changes between two branch partitions.
    pub fn diff(
        &self,
        source_branch: &str,
        target_branch: &str,
        options: &DiffOptions,
    ) -> Result<BranchDiff, AnalysisError> {
        self.manager.ensure_fresh();
        diff_branches(&self.store, source_branch, target_branch, options)
    }
}

fn absolutize(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
