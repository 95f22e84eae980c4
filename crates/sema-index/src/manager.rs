//! The index manager: discovery → change detection → extraction → embedding
//! → persistence, plus the auto-refresh hook the read path calls first.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use sema_core::config::SemaConfig;
use sema_core::constants::EXTERNAL_FILE_PATH;
use sema_core::errors::{IndexError, StorageError};
use sema_core::identity;
use sema_core::traits::{IndexPhase, ProgressEvent, ProgressSink, RelationshipSource};
use sema_core::types::{
    Edge, EdgeKind, FileRecord, FileStatus, RawEdge, RawSymbol, RepoMapEntry, Symbol, SymbolKind,
};
use sema_extract::{chunk_lines, ExtractorRegistry};
use sema_storage::{FileIndexBatch, Store};

use crate::embed_cache::CachingEmbedder;
use crate::merkle::MerkleCache;
use crate::walker::{discover_files, DiscoveredFile};

/// Result of an `update`/`rebuild` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub files_indexed: usize,
    pub chunks_added: usize,
    pub files_deleted: usize,
    pub duration_ms: u64,
}

/// Snapshot of index health for `status()`.
#[derive(Debug, Clone)]
pub struct IndexStatus {
    pub file_count: u64,
    pub chunk_count: u64,
    pub last_updated: Option<DateTime<Utc>>,
    pub is_indexing: bool,
    pub db_size_bytes: u64,
}

/// Outcome of indexing one file inside the parallel fan-out.
enum FileOutcome {
    Indexed {
        chunks: usize,
        /// Edges whose targets were not yet in the store when this file
        /// committed; resolved in a second pass after the fan-out.
        pending: Vec<(String, RawEdge)>,
    },
    Skipped,
    Failed,
    Fatal(StorageError),
}

/// Owns the write path. The store handle, Merkle cache and embedder cache
/// all live here and are passed explicitly to whoever needs them.
pub struct IndexManager {
    store: Arc<Store>,
    registry: Arc<ExtractorRegistry>,
    embedder: Arc<CachingEmbedder>,
    relationships: Option<Arc<dyn RelationshipSource>>,
    progress: Arc<dyn ProgressSink>,
    config: SemaConfig,
    root: PathBuf,
    merkle: Mutex<MerkleCache>,
    indexing: AtomicBool,
    cancel: AtomicBool,
    last_refresh: Mutex<Option<Instant>>,
}

impl IndexManager {
    /// Build a manager for one workspace. Loads the Merkle snapshot and
    /// records embedding metadata; a dimension mismatch fails fast here.
    pub fn new(
        root: &Path,
        config: SemaConfig,
        store: Arc<Store>,
        registry: Arc<ExtractorRegistry>,
        embedder: Arc<CachingEmbedder>,
        relationships: Option<Arc<dyn RelationshipSource>>,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<Self, IndexError> {
        store.register_embedding_dimension(embedder.dimension())?;
        let merkle = MerkleCache::load(&config.storage.cache_path);

        Ok(Self {
            store,
            registry,
            embedder,
            relationships,
            progress,
            config,
            root: root.to_path_buf(),
            merkle: Mutex::new(merkle),
            indexing: AtomicBool::new(false),
            cancel: AtomicBool::new(false),
            last_refresh: Mutex::new(None),
        })
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn branch(&self) -> &str {
        &self.config.branch
    }

    /// Incremental update: index exactly what changed since the last run.
    pub fn update(&self) -> Result<UpdateSummary, IndexError> {
        let _guard = self.begin()?;

        // A model swap invalidates every stored embedding.
        if self.store.needs_reembedding(self.embedder.model_id())? {
            tracing::warn!(
                model = self.embedder.model_id(),
                "embedding model changed, forcing full re-index"
            );
            self.reset_branch()?;
        }
        self.store.set_embedding_model(self.embedder.model_id())?;

        let files = self.discover()?;
        self.run_delta(&files)
    }

    /// Full rebuild: truncate the branch and the Merkle state, then index
    /// everything from scratch.
    pub fn rebuild(&self) -> Result<UpdateSummary, IndexError> {
        let _guard = self.begin()?;
        self.reset_branch()?;
        self.store.set_embedding_model(self.embedder.model_id())?;
        let files = self.discover()?;
        self.run_delta(&files)
    }

    /// Best-effort freshness check invoked by every read path. Bounded by a
    /// cooldown and a file-count ceiling; every failure is swallowed and
    /// logged so queries proceed on stale data.
    pub fn ensure_fresh(&self) {
        if !self.config.index.auto_refresh {
            return;
        }
        if self.indexing.load(Ordering::SeqCst) {
            return;
        }
        if !self.cooldown_elapsed() {
            return;
        }

        let files = match self.discover() {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(error = %e, "auto-refresh discovery failed, serving stale data");
                self.progress.report(ProgressEvent {
                    phase: IndexPhase::Scanning,
                    processed: 0,
                    total: 0,
                    warning: Some(format!("auto-refresh discovery failed: {e}")),
                });
                return;
            }
        };

        if files.len() > self.config.index.auto_refresh_max_files {
            tracing::debug!(
                files = files.len(),
                ceiling = self.config.index.auto_refresh_max_files,
                "workspace too large for auto-refresh"
            );
            return;
        }

        let _guard = match self.begin() {
            Ok(guard) => guard,
            // A concurrent update is already doing the work.
            Err(_) => return,
        };
        match self.run_delta(&files) {
            Ok(summary) if summary.files_indexed > 0 || summary.files_deleted > 0 => {
                tracing::info!(
                    files = summary.files_indexed,
                    deleted = summary.files_deleted,
                    "auto-refresh applied delta"
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "auto-refresh failed, serving stale data");
            }
        }
    }

    /// Request cooperative cancellation; takes effect between files.
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_indexing(&self) -> bool {
        self.indexing.load(Ordering::SeqCst)
    }

    /// Index health summary.
    pub fn status(&self) -> Result<IndexStatus, IndexError> {
        let branch = self.branch();
        Ok(IndexStatus {
            file_count: self.store.file_count(branch)?,
            chunk_count: self.store.symbol_count(Some(branch))?,
            last_updated: self
                .store
                .last_indexed_ms(branch)?
                .and_then(DateTime::<Utc>::from_timestamp_millis),
            is_indexing: self.is_indexing(),
            db_size_bytes: self.store.db_size_bytes()?,
        })
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn begin(&self) -> Result<IndexingGuard<'_>, IndexError> {
        if self
            .indexing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(IndexError::IndexingAlreadyInProgress);
        }
        self.cancel.store(false, Ordering::SeqCst);
        Ok(IndexingGuard(&self.indexing))
    }

    fn cooldown_elapsed(&self) -> bool {
        let cooldown = Duration::from_millis(self.config.index.auto_refresh_cooldown_ms);
        let mut last = match self.last_refresh.lock() {
            Ok(guard) => guard,
            Err(_) => return false,
        };
        match *last {
            Some(at) if at.elapsed() < cooldown => false,
            _ => {
                *last = Some(Instant::now());
                true
            }
        }
    }

    fn discover(&self) -> Result<Vec<DiscoveredFile>, IndexError> {
        self.progress.report(ProgressEvent {
            phase: IndexPhase::Scanning,
            processed: 0,
            total: 0,
            warning: None,
        });
        discover_files(
            &self.root,
            &self.config.index.include_patterns,
            &self.config.index.exclude_patterns,
            &self.registry,
        )
    }

    fn reset_branch(&self) -> Result<(), IndexError> {
        self.store.truncate_branch(self.branch())?;
        if let Ok(mut merkle) = self.merkle.lock() {
            merkle.clear();
        }
        let _ = std::fs::remove_file(&self.config.storage.cache_path);
        Ok(())
    }

    /// The shared delta pipeline behind `update`, `rebuild` and auto-refresh.
    /// The caller holds the indexing guard.
    fn run_delta(&self, files: &[DiscoveredFile]) -> Result<UpdateSummary, IndexError> {
        let started = Instant::now();
        let branch = self.branch().to_string();

        self.progress.report(ProgressEvent {
            phase: IndexPhase::Hashing,
            processed: 0,
            total: files.len(),
            warning: None,
        });

        let keyed: Vec<(String, PathBuf)> = files
            .iter()
            .map(|f| (f.rel_path.clone(), f.abs_path.clone()))
            .collect();

        let (changes, deleted) = {
            let mut merkle = self.merkle.lock().map_err(|_| IndexError::Merkle {
                message: "merkle lock poisoned".to_string(),
            })?;
            let deleted = merkle.find_deleted(&keyed);
            let changes = merkle.find_changed(&keyed);
            (changes, deleted)
        };

        for path in &deleted {
            self.store.delete_file_rows(path, &branch)?;
            if let Ok(mut merkle) = self.merkle.lock() {
                merkle.remove(path);
            }
        }

        let to_index: Vec<&str> = changes
            .added
            .iter()
            .chain(changes.modified.iter())
            .map(|s| s.as_str())
            .collect();

        let mut summary = UpdateSummary {
            files_deleted: deleted.len(),
            ..Default::default()
        };

        if to_index.is_empty() {
            self.finish_delta(&mut summary, started, deleted.is_empty())?;
            return Ok(summary);
        }

        let by_key: FxHashMap<&str, &Path> = files
            .iter()
            .map(|f| (f.rel_path.as_str(), f.abs_path.as_path()))
            .collect();
        let revision = self.store.next_revision()?;
        let processed = AtomicUsize::new(0);
        let total = to_index.len();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.index.parallelism.max(1))
            .build()
            .map_err(|e| IndexError::Merkle {
                message: format!("failed to build indexing pool: {e}"),
            })?;

        let outcomes: Vec<FileOutcome> = pool.install(|| {
            to_index
                .par_iter()
                .map(|rel_path| {
                    if self.cancel.load(Ordering::SeqCst) {
                        return FileOutcome::Skipped;
                    }
                    let outcome = match by_key.get(rel_path) {
                        Some(abs) => self.index_file(rel_path, abs, &branch, revision),
                        None => FileOutcome::Skipped,
                    };
                    let done = processed.fetch_add(1, Ordering::SeqCst) + 1;
                    self.progress.report(ProgressEvent {
                        phase: IndexPhase::Storing,
                        processed: done,
                        total,
                        warning: None,
                    });
                    outcome
                })
                .collect()
        });

        let mut pending_edges: Vec<(String, RawEdge)> = Vec::new();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Indexed { chunks, mut pending } => {
                    summary.files_indexed += 1;
                    summary.chunks_added += chunks;
                    pending_edges.append(&mut pending);
                }
                FileOutcome::Skipped | FileOutcome::Failed => {}
                FileOutcome::Fatal(e) => return Err(e.into()),
            }
        }

        // Second resolution pass: edges whose endpoints lived in files that
        // had not committed yet during the fan-out.
        if !pending_edges.is_empty() {
            let resolved = self.resolve_pending_edges(&pending_edges, &branch)?;
            if !resolved.is_empty() {
                self.store.upsert_edges(&resolved)?;
            }
        }

        self.finish_delta(&mut summary, started, false)?;
        Ok(summary)
    }

    /// Repo map, Merkle persistence, checkpoint and the final progress event.
    fn finish_delta(
        &self,
        summary: &mut UpdateSummary,
        started: Instant,
        nothing_changed: bool,
    ) -> Result<(), IndexError> {
        if !nothing_changed || summary.files_indexed > 0 || summary.files_deleted > 0 {
            if let Err(e) = self.refresh_repo_map() {
                tracing::warn!(error = %e, "repo map refresh failed");
            }
        }

        {
            let mut merkle = self.merkle.lock().map_err(|_| IndexError::Merkle {
                message: "merkle lock poisoned".to_string(),
            })?;
            if merkle.is_dirty() {
                merkle.build_tree();
                if let Err(e) = merkle.save(&self.config.storage.cache_path) {
                    tracing::warn!(error = %e, "failed to persist merkle cache");
                }
            }
        }

        if summary.files_indexed > 0 || summary.files_deleted > 0 {
            if let Err(e) = self.store.checkpoint() {
                tracing::debug!(error = %e, "checkpoint failed");
            }
        }

        summary.duration_ms = started.elapsed().as_millis() as u64;
        self.progress.report(ProgressEvent {
            phase: IndexPhase::Complete,
            processed: summary.files_indexed,
            total: summary.files_indexed,
            warning: None,
        });
        tracing::info!(
            files = summary.files_indexed,
            chunks = summary.chunks_added,
            deleted = summary.files_deleted,
            ms = summary.duration_ms,
            "indexing run complete"
        );
        Ok(())
    }

    /// Index one file. Transient failures mark the FileRecord and return
    /// `Failed`; only store-level failures escalate to `Fatal`.
    fn index_file(&self, rel_path: &str, abs_path: &Path, branch: &str, revision: i64) -> FileOutcome {
        let entry = {
            let merkle = match self.merkle.lock() {
                Ok(guard) => guard,
                Err(_) => return FileOutcome::Failed,
            };
            merkle.get(rel_path).cloned()
        };
        let Some(entry) = entry else {
            return FileOutcome::Skipped;
        };

        // Unchanged content that is already indexed needs no work.
        match self.store.file_by_path(rel_path, branch) {
            Ok(Some(record))
                if record.file_hash == entry.hash && record.status == FileStatus::Indexed =>
            {
                return FileOutcome::Skipped;
            }
            Ok(_) => {}
            Err(e) => return FileOutcome::Fatal(e),
        }

        let mut record = FileRecord::pending(rel_path, branch, &entry.hash, entry.mtime_ms, entry.size);
        record.language = self.registry.language_of(rel_path).map(|s| s.to_string());
        record.status = FileStatus::Indexing;
        if let Err(e) = self.store.upsert_file(&record) {
            return FileOutcome::Fatal(e);
        }

        let source = match std::fs::read_to_string(abs_path) {
            Ok(source) => source,
            Err(e) => {
                return self.fail_file(rel_path, branch, &format!("read failed: {e}"));
            }
        };

        let mut extraction = match self.registry.extract(&source, rel_path) {
            Ok(extraction) => extraction,
            Err(e) => {
                return self.fail_file(rel_path, branch, &e.to_string());
            }
        };

        // Fallback chunker for files without extractable symbols.
        if extraction.symbols.is_empty() {
            extraction.symbols = chunk_lines(
                &source,
                rel_path,
                self.config.index.max_chunk_lines,
                self.config.index.chunk_overlap,
            );
        }

        // The importing side of module-level edges is the file itself.
        if !extraction.edges.is_empty() {
            extraction
                .symbols
                .insert(0, module_symbol(rel_path, &source, &extraction.edges));
        }

        if let Some(source_provider) = &self.relationships {
            match source_provider.edges_for_file(rel_path, branch) {
                Ok(mut edges) => extraction.edges.append(&mut edges),
                Err(e) => {
                    tracing::warn!(file = rel_path, error = %e, "relationship source failed");
                }
            }
        }

        let language = record.language.clone().unwrap_or_else(|| "text".to_string());
        let now = Utc::now();
        let symbols: Vec<Symbol> = extraction
            .symbols
            .iter()
            .map(|raw| enrich_symbol(raw, rel_path, branch, &language, now, revision, self.embedder.model_id()))
            .collect();

        let (edges, externals, pending) =
            self.resolve_edges(&extraction.edges, &symbols, rel_path, branch, now);

        self.progress.report(ProgressEvent {
            phase: IndexPhase::Embedding,
            processed: 0,
            total: symbols.len(),
            warning: None,
        });
        let items: Vec<(String, String)> = symbols
            .iter()
            .map(|sym| (sym.content_hash.clone(), embedding_text(sym)))
            .collect();
        let vectors = match self
            .embedder
            .embed_batch(&items, self.config.index.embedding_batch_size)
        {
            Ok(vectors) => vectors,
            Err(e) => {
                return self.fail_file(rel_path, branch, &format!("embedding failed: {e}"));
            }
        };

        record.status = FileStatus::Indexed;
        record.symbol_count = symbols.len() as u32;
        record.last_indexed = Utc::now();
        record.error_message = None;

        let mut batch = FileIndexBatch {
            file: Some(record),
            vectors: symbols
                .iter()
                .zip(&vectors)
                .map(|(sym, vector)| (sym.id.clone(), vector.clone()))
                .collect(),
            symbols,
            edges,
        };
        batch.symbols.extend(externals);

        let chunk_count = batch.vectors.len();
        match self.store.commit_file_index(rel_path, branch, &batch) {
            Ok(()) => FileOutcome::Indexed {
                chunks: chunk_count,
                pending,
            },
            Err(e) => FileOutcome::Fatal(e),
        }
    }

    fn fail_file(&self, rel_path: &str, branch: &str, message: &str) -> FileOutcome {
        tracing::warn!(file = rel_path, error = message, "file indexing failed");
        match self
            .store
            .update_file_status(rel_path, branch, FileStatus::Error, Some(message))
        {
            Ok(()) => FileOutcome::Failed,
            Err(e) => FileOutcome::Fatal(e),
        }
    }

    /// Resolve raw edges against this file's symbols, then the store.
    /// Import targets the workspace does not define become external stubs.
    /// Edges whose targets cannot be resolved yet (their file may simply not
    /// have committed) come back in the pending list for the post-pass.
    fn resolve_edges(
        &self,
        raw_edges: &[RawEdge],
        local_symbols: &[Symbol],
        rel_path: &str,
        branch: &str,
        now: DateTime<Utc>,
    ) -> (Vec<Edge>, Vec<Symbol>, Vec<(String, RawEdge)>) {
        let mut edges = Vec::new();
        let mut externals: FxHashMap<String, Symbol> = FxHashMap::default();
        let mut pending = Vec::new();

        let by_qualified: FxHashMap<&str, &Symbol> = local_symbols
            .iter()
            .map(|s| (s.qualified_name.as_str(), s))
            .collect();
        let by_name: FxHashMap<&str, &Symbol> =
            local_symbols.iter().map(|s| (s.name.as_str(), s)).collect();
        let module = local_symbols.iter().find(|s| s.kind == SymbolKind::Module);

        for raw in raw_edges {
            let source = match raw.source.as_deref() {
                Some(name) => by_qualified
                    .get(name)
                    .or_else(|| by_name.get(name))
                    .map(|s| (*s).id.clone())
                    .or_else(|| self.lookup_symbol_id(name, branch)),
                None => module.map(|m| m.id.clone()),
            };
            let Some(source_id) = source else {
                pending.push((rel_path.to_string(), raw.clone()));
                continue;
            };

            let target_id = match by_qualified
                .get(raw.target.as_str())
                .or_else(|| by_name.get(raw.target.as_str()))
            {
                Some(local) => Some(local.id.clone()),
                None => {
                    let stem = specifier_stem(&raw.target);
                    match self.lookup_symbol_id(stem, branch) {
                        Some(id) => Some(id),
                        None if raw.kind == EdgeKind::Imports => {
                            let stub = externals.entry(raw.target.clone()).or_insert_with(|| {
                                external_stub(&raw.target, branch, now)
                            });
                            Some(stub.id.clone())
                        }
                        None => None,
                    }
                }
            };
            let Some(target_id) = target_id else {
                pending.push((rel_path.to_string(), raw.clone()));
                continue;
            };

            edges.push(build_edge(&source_id, &target_id, raw, branch, now));
        }

        (edges, externals.into_values().collect(), pending)
    }

    /// Post-fan-out resolution: by now every changed file has committed, so
    /// cross-file endpoints resolve through the store. Targets that still
    /// do not exist are dropped (tolerated, per the low-confidence edge
    /// policy).
    fn resolve_pending_edges(
        &self,
        pending: &[(String, RawEdge)],
        branch: &str,
    ) -> Result<Vec<Edge>, IndexError> {
        let now = Utc::now();
        let mut resolved = Vec::new();

        for (file, raw) in pending {
            let source_id = match raw.source.as_deref() {
                Some(name) => self
                    .store
                    .symbol_by_qualified_name(name, branch)?
                    .map(|s| s.id)
                    .or_else(|| self.lookup_symbol_id(name, branch)),
                // Module-level edge: the file's Module symbol is keyed by
                // the file path itself.
                None => self.store.symbol_by_qualified_name(file, branch)?.map(|s| s.id),
            };
            let Some(source_id) = source_id else {
                continue;
            };

            let target_id = self
                .store
                .symbol_by_qualified_name(&raw.target, branch)?
                .map(|s| s.id)
                .or_else(|| self.lookup_symbol_id(specifier_stem(&raw.target), branch));
            let Some(target_id) = target_id else {
                tracing::debug!(file = %file, target = %raw.target, "dropping unresolvable edge");
                continue;
            };

            resolved.push(build_edge(&source_id, &target_id, raw, branch, now));
        }

        Ok(resolved)
    }

    fn lookup_symbol_id(&self, name: &str, branch: &str) -> Option<String> {
        match self.store.symbols_by_name(name, branch) {
            Ok(mut found) => {
                found.sort_by(|a, b| a.file_path.cmp(&b.file_path));
                found.into_iter().next().map(|s| s.id)
            }
            Err(e) => {
                tracing::debug!(name, error = %e, "symbol lookup failed during edge resolution");
                None
            }
        }
    }

    /// Degree centrality over the import graph: files many others import
    /// rank high.
    fn refresh_repo_map(&self) -> Result<(), StorageError> {
        let branch = self.branch();
        let pairs = self.store.import_file_pairs(branch)?;

        let mut in_degree: FxHashMap<String, u32> = FxHashMap::default();
        let mut out_degree: FxHashMap<String, u32> = FxHashMap::default();
        for (source_file, target_file) in pairs {
            if source_file == target_file {
                continue;
            }
            *out_degree.entry(source_file).or_default() += 1;
            if target_file != EXTERNAL_FILE_PATH {
                *in_degree.entry(target_file).or_default() += 1;
            }
        }

        let max_in = in_degree.values().copied().max().unwrap_or(0).max(1) as f64;
        let max_out = out_degree.values().copied().max().unwrap_or(0).max(1) as f64;

        let entries: Vec<RepoMapEntry> = self
            .store
            .files_by_branch(branch)?
            .into_iter()
            .map(|record| {
                let fan_in = in_degree.get(&record.file_path).copied().unwrap_or(0);
                let fan_out = out_degree.get(&record.file_path).copied().unwrap_or(0);
                RepoMapEntry {
                    importance_score: 0.7 * (fan_in as f64 / max_in)
                        + 0.3 * (fan_out as f64 / max_out),
                    in_degree: fan_in,
                    out_degree: fan_out,
                    symbol_summary: None,
                    file_path: record.file_path,
                    branch: branch.to_string(),
                }
            })
            .collect();

        self.store.repo_map_replace(branch, &entries)
    }
}

fn build_edge(
    source_id: &str,
    target_id: &str,
    raw: &RawEdge,
    branch: &str,
    now: DateTime<Utc>,
) -> Edge {
    Edge {
        id: identity::edge_id(source_id, target_id, raw.kind, raw.origin),
        source_id: source_id.to_string(),
        target_id: target_id.to_string(),
        kind: raw.kind,
        confidence: Edge::clamped_confidence(raw.origin, raw.confidence),
        origin: raw.origin,
        branch: branch.to_string(),
        source_span: raw.line.map(|l| (l, l)),
        target_span: None,
        updated_at: now,
        metadata: None,
    }
}

/// Clears the indexing flag when the run ends, on any path out.
struct IndexingGuard<'a>(&'a AtomicBool);

impl Drop for IndexingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Apply canonical identity and branch enrichment to a raw symbol.
fn enrich_symbol(
    raw: &RawSymbol,
    file_path: &str,
    branch: &str,
    language: &str,
    now: DateTime<Utc>,
    revision: i64,
    model_id: &str,
) -> Symbol {
    Symbol {
        id: identity::symbol_id(&raw.qualified_name, raw.signature.as_deref(), language),
        name: raw.name.clone(),
        qualified_name: raw.qualified_name.clone(),
        kind: raw.kind,
        language: language.to_string(),
        file_path: file_path.to_string(),
        start_line: raw.start_line,
        end_line: raw.end_line,
        content: raw.content.clone(),
        signature: raw.signature.clone(),
        docstring: raw.docstring.clone(),
        content_hash: identity::content_hash(&raw.content),
        is_external: false,
        branch: branch.to_string(),
        embedding_model_id: Some(model_id.to_string()),
        updated_at: now,
        revision_id: revision,
    }
}

/// The file-level Module symbol that anchors import edges. Its content is
/// the import statements themselves, which embed meaningfully.
fn module_symbol(rel_path: &str, source: &str, edges: &[RawEdge]) -> RawSymbol {
    let lines: Vec<&str> = source.lines().collect();
    let import_lines: Vec<&str> = edges
        .iter()
        .filter_map(|e| e.line)
        .filter_map(|l| lines.get((l as usize).saturating_sub(1)).copied())
        .collect();
    let stem = rel_path
        .rsplit(['/', '\\'])
        .next()
        .and_then(|base| base.split('.').next())
        .unwrap_or(rel_path);

    RawSymbol {
        name: stem.to_string(),
        qualified_name: rel_path.to_string(),
        kind: SymbolKind::Module,
        start_line: 1,
        end_line: lines.len().max(1) as u32,
        content: import_lines.join("\n"),
        signature: None,
        docstring: None,
    }
}

/// Stub row for an import target the workspace does not define.
fn external_stub(specifier: &str, branch: &str, now: DateTime<Utc>) -> Symbol {
    Symbol {
        id: identity::symbol_id(specifier, None, "external"),
        name: specifier_stem(specifier).to_string(),
        qualified_name: specifier.to_string(),
        kind: SymbolKind::Module,
        language: "external".to_string(),
        file_path: EXTERNAL_FILE_PATH.to_string(),
        start_line: 0,
        end_line: 0,
        content: String::new(),
        signature: None,
        docstring: None,
        content_hash: identity::content_hash(""),
        is_external: true,
        branch: branch.to_string(),
        embedding_model_id: None,
        updated_at: now,
        revision_id: 0,
    }
}

/// Last meaningful segment of an import specifier: `./utils` → `utils`,
/// `a.b.C` → `C`, `std::fs` → `fs`.
fn specifier_stem(specifier: &str) -> &str {
    let after_slash = specifier.rsplit('/').next().unwrap_or(specifier);
    let after_colons = after_slash.rsplit("::").next().unwrap_or(after_slash);
    after_colons.rsplit('.').next().unwrap_or(after_colons)
}

/// Text sent to the embedder: docstring plus source, the way the symbol
/// reads to a human.
fn embedding_text(sym: &Symbol) -> String {
    match &sym.docstring {
        Some(doc) => format!("{doc}\n{}", sym.content),
        None => sym.content.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specifier_stems() {
        assert_eq!(specifier_stem("./utils"), "utils");
        assert_eq!(specifier_stem("../lib/helpers"), "helpers");
        assert_eq!(specifier_stem("java.util.List"), "List");
        assert_eq!(specifier_stem("std::collections::HashMap"), "HashMap");
        assert_eq!(specifier_stem("react"), "react");
    }

    #[test]
    fn module_symbol_content_is_the_import_block() {
        let source = "import a from 'a'\nimport b from 'b'\nconst x = 1\n";
        let edges = vec![
            RawEdge {
                source: None,
                target: "a".into(),
                kind: EdgeKind::Imports,
                origin: sema_core::types::EdgeOrigin::AstInference,
                confidence: 0.7,
                line: Some(1),
            },
            RawEdge {
                source: None,
                target: "b".into(),
                kind: EdgeKind::Imports,
                origin: sema_core::types::EdgeOrigin::AstInference,
                confidence: 0.7,
                line: Some(2),
            },
        ];
        let sym = module_symbol("src/app.ts", source, &edges);
        assert_eq!(sym.name, "app");
        assert_eq!(sym.qualified_name, "src/app.ts");
        assert_eq!(sym.content, "import a from 'a'\nimport b from 'b'");
        assert_eq!(sym.kind, SymbolKind::Module);
    }
}
