//! The `Store`: typed repository surface over the database manager.
//!
//! Batch operations run under a single transaction on the serialized writer
//! connection. Queries go through the read pool. Branch-filtered queries
//! never cross partitions.

use std::path::Path;

use rusqlite::Connection;
use sema_core::errors::StorageError;
use sema_core::types::{Edge, FileRecord, FileStatus, RepoMapEntry, Symbol, SymbolKind};

use crate::connection::DatabaseManager;
use crate::queries::{edges, files, keyword, metadata, repo_map, symbols, vectors};
pub use crate::queries::keyword::KeywordSearch;
pub use crate::queries::vectors::VectorHit;

/// Everything written for one file in one atomic transaction: symbols, their
/// vectors and FTS rows, edges, and the file record. A query can never
/// observe a symbol without its embedding and FTS row.
#[derive(Debug, Default)]
pub struct FileIndexBatch {
    pub file: Option<FileRecord>,
    pub symbols: Vec<Symbol>,
    /// `(symbol_id, embedding)` pairs; ids must appear in `symbols`.
    pub vectors: Vec<(String, Vec<f32>)>,
    pub edges: Vec<Edge>,
}

/// Branch-partitioned persistence for symbols, edges, files, FTS and vectors.
pub struct Store {
    db: DatabaseManager,
}

impl Store {
    /// Open (or create) the store at `path` and run pending migrations.
    pub fn open(path: &Path, read_pool_size: usize) -> Result<Self, StorageError> {
        Ok(Self {
            db: DatabaseManager::open(path, read_pool_size)?,
        })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self {
            db: DatabaseManager::open_in_memory()?,
        })
    }

    pub fn db(&self) -> &DatabaseManager {
        &self.db
    }

    // ── Schema metadata ─────────────────────────────────────────────────

    /// Record the embedding dimension at store creation. The dimension is
    /// immutable for the life of the store; a different embedder must use a
    /// fresh database.
    pub fn register_embedding_dimension(&self, dimension: u32) -> Result<(), StorageError> {
        self.db.with_writer(|conn| {
            if let Some(stored) = metadata::get(conn, metadata::KEY_EMBEDDING_DIMENSION)? {
                if let Ok(stored_dim) = stored.parse::<u32>() {
                    if stored_dim != dimension {
                        return Err(StorageError::DimensionMismatch {
                            expected: stored_dim,
                            actual: dimension,
                        });
                    }
                }
                Ok(())
            } else {
                metadata::set(conn, metadata::KEY_EMBEDDING_DIMENSION, &dimension.to_string())
            }
        })
    }

    /// Record which model produced the stored vectors. The index manager
    /// calls this after the re-embed decision, never at open.
    pub fn set_embedding_model(&self, model_id: &str) -> Result<(), StorageError> {
        self.db
            .with_writer(|conn| metadata::set(conn, metadata::KEY_EMBEDDING_MODEL, model_id))
    }

    pub fn needs_reembedding(&self, model_id: &str) -> Result<bool, StorageError> {
        self.db.with_reader(|conn| metadata::needs_reembedding(conn, model_id))
    }

    pub fn embedding_model_id(&self) -> Result<Option<String>, StorageError> {
        self.db.with_reader(|conn| metadata::get(conn, metadata::KEY_EMBEDDING_MODEL))
    }

    pub fn next_revision(&self) -> Result<i64, StorageError> {
        self.db.with_writer(metadata::next_revision)
    }

    // ── Symbols ─────────────────────────────────────────────────────────

    pub fn upsert_symbol(&self, sym: &Symbol) -> Result<(), StorageError> {
        self.db.with_writer(|conn| symbols::upsert(conn, sym))
    }

    /// Upsert many symbols in one transaction.
    pub fn upsert_symbols(&self, syms: &[Symbol]) -> Result<(), StorageError> {
        self.db.with_writer(|conn| {
            in_transaction(conn, |conn| {
                for sym in syms {
                    symbols::upsert(conn, sym)?;
                }
                Ok(())
            })
        })
    }

    pub fn symbol_by_id(&self, id: &str, branch: &str) -> Result<Option<Symbol>, StorageError> {
        self.db.with_reader(|conn| symbols::by_id(conn, id, branch))
    }

    pub fn symbols_by_file(&self, path: &str, branch: &str) -> Result<Vec<Symbol>, StorageError> {
        self.db.with_reader(|conn| symbols::by_file(conn, path, branch))
    }

    pub fn symbols_by_name(&self, name: &str, branch: &str) -> Result<Vec<Symbol>, StorageError> {
        self.db.with_reader(|conn| symbols::by_name(conn, name, branch))
    }

    pub fn symbol_by_qualified_name(
        &self,
        qualified_name: &str,
        branch: &str,
    ) -> Result<Option<Symbol>, StorageError> {
        self.db
            .with_reader(|conn| symbols::by_qualified(conn, qualified_name, branch))
    }

    pub fn symbols_by_kind(&self, kind: SymbolKind, branch: &str) -> Result<Vec<Symbol>, StorageError> {
        self.db.with_reader(|conn| symbols::by_kind(conn, kind, branch))
    }

    pub fn symbols_all(&self, branch: &str, limit: usize) -> Result<Vec<Symbol>, StorageError> {
        self.db.with_reader(|conn| symbols::all(conn, branch, limit))
    }

    pub fn symbol_at_location(
        &self,
        path: &str,
        line: u32,
        branch: &str,
    ) -> Result<Option<Symbol>, StorageError> {
        self.db.with_reader(|conn| symbols::at_location(conn, path, line, branch))
    }

    pub fn symbol_count(&self, branch: Option<&str>) -> Result<u64, StorageError> {
        self.db.with_reader(|conn| symbols::count(conn, branch))
    }

    pub fn branches(&self) -> Result<Vec<String>, StorageError> {
        self.db.with_reader(symbols::branches)
    }

    // ── Edges ───────────────────────────────────────────────────────────

    pub fn upsert_edges(&self, edge_list: &[Edge]) -> Result<(), StorageError> {
        self.db.with_writer(|conn| {
            in_transaction(conn, |conn| {
                for edge in edge_list {
                    edges::upsert(conn, edge)?;
                }
                Ok(())
            })
        })
    }

    pub fn callers(&self, target_id: &str, branch: &str) -> Result<Vec<Edge>, StorageError> {
        self.db.with_reader(|conn| edges::callers(conn, target_id, branch))
    }

    pub fn callees(&self, source_id: &str, branch: &str) -> Result<Vec<Edge>, StorageError> {
        self.db.with_reader(|conn| edges::callees(conn, source_id, branch))
    }

    pub fn edges_by_branch(&self, branch: &str) -> Result<Vec<Edge>, StorageError> {
        self.db.with_reader(|conn| edges::by_branch(conn, branch))
    }

    pub fn edge_count(&self, branch: Option<&str>) -> Result<u64, StorageError> {
        self.db.with_reader(|conn| edges::count(conn, branch))
    }

    /// `(source_file, target_file)` pairs of import edges, for the repo map.
    pub fn import_file_pairs(&self, branch: &str) -> Result<Vec<(String, String)>, StorageError> {
        self.db.with_reader(|conn| edges::import_degrees(conn, branch))
    }

    // ── Files ───────────────────────────────────────────────────────────

    pub fn upsert_file(&self, record: &FileRecord) -> Result<(), StorageError> {
        self.db.with_writer(|conn| files::upsert(conn, record))
    }

    pub fn file_by_path(&self, path: &str, branch: &str) -> Result<Option<FileRecord>, StorageError> {
        self.db.with_reader(|conn| files::by_path(conn, path, branch))
    }

    pub fn files_by_status(
        &self,
        status: FileStatus,
        branch: &str,
    ) -> Result<Vec<FileRecord>, StorageError> {
        self.db.with_reader(|conn| files::by_status(conn, status, branch))
    }

    pub fn files_by_branch(&self, branch: &str) -> Result<Vec<FileRecord>, StorageError> {
        self.db.with_reader(|conn| files::by_branch(conn, branch))
    }

    pub fn update_file_status(
        &self,
        path: &str,
        branch: &str,
        status: FileStatus,
        error_message: Option<&str>,
    ) -> Result<(), StorageError> {
        self.db
            .with_writer(|conn| files::update_status(conn, path, branch, status, error_message))
    }

    pub fn update_file_symbol_count(
        &self,
        path: &str,
        branch: &str,
        symbol_count: u32,
    ) -> Result<(), StorageError> {
        self.db
            .with_writer(|conn| files::update_symbol_count(conn, path, branch, symbol_count))
    }

    pub fn update_file_importance(
        &self,
        path: &str,
        branch: &str,
        rank: f64,
    ) -> Result<(), StorageError> {
        self.db.with_writer(|conn| files::update_importance(conn, path, branch, rank))
    }

    pub fn file_count(&self, branch: &str) -> Result<u64, StorageError> {
        self.db.with_reader(|conn| files::count(conn, branch))
    }

    pub fn last_indexed_ms(&self, branch: &str) -> Result<Option<i64>, StorageError> {
        self.db.with_reader(|conn| files::last_indexed(conn, branch))
    }

    // ── Keyword (FTS) ───────────────────────────────────────────────────

    pub fn keyword_search(
        &self,
        query: &str,
        limit: usize,
        branch: Option<&str>,
    ) -> Result<KeywordSearch, StorageError> {
        self.db.with_reader(|conn| keyword::search(conn, query, limit, branch))
    }

    pub fn keyword_rebuild(&self) -> Result<usize, StorageError> {
        self.db.with_writer(keyword::rebuild)
    }

    // ── Vectors ─────────────────────────────────────────────────────────

    pub fn vector_upsert(
        &self,
        symbol_id: &str,
        branch: &str,
        embedding: &[f32],
    ) -> Result<(), StorageError> {
        self.db.with_writer(|conn| vectors::upsert(conn, symbol_id, branch, embedding))
    }

    pub fn vector_search(
        &self,
        query: &[f32],
        k: usize,
        branch: Option<&str>,
    ) -> Result<Vec<VectorHit>, StorageError> {
        self.db.with_reader(|conn| vectors::search(conn, query, k, branch))
    }

    pub fn vector_get(&self, symbol_id: &str, branch: &str) -> Result<Option<Vec<f32>>, StorageError> {
        self.db.with_reader(|conn| vectors::get(conn, symbol_id, branch))
    }

    pub fn vector_count(&self, branch: Option<&str>) -> Result<u64, StorageError> {
        self.db.with_reader(|conn| vectors::count(conn, branch))
    }

    // ── Repo map ────────────────────────────────────────────────────────

    pub fn repo_map_replace(
        &self,
        branch: &str,
        entries: &[RepoMapEntry],
    ) -> Result<(), StorageError> {
        self.db.with_writer(|conn| {
            in_transaction(conn, |conn| {
                repo_map::delete_by_branch(conn, branch)?;
                for entry in entries {
                    repo_map::upsert(conn, entry)?;
                    files::update_importance(
                        conn,
                        &entry.file_path,
                        branch,
                        entry.importance_score,
                    )?;
                }
                Ok(())
            })
        })
    }

    pub fn repo_map_top(&self, branch: &str, limit: usize) -> Result<Vec<RepoMapEntry>, StorageError> {
        self.db.with_reader(|conn| repo_map::top(conn, branch, limit))
    }

    // ── Composite operations ────────────────────────────────────────────

    /// Commit everything extracted from one file atomically: clear the old
    /// rows for `(path, branch)`, then write symbols, vectors, FTS entries,
    /// edges and the file record in FK-safe order.
    pub fn commit_file_index(
        &self,
        path: &str,
        branch: &str,
        batch: &FileIndexBatch,
    ) -> Result<(), StorageError> {
        self.db.with_writer(|conn| {
            in_transaction(conn, |conn| {
                delete_file_rows_inner(conn, path, branch)?;
                for sym in &batch.symbols {
                    symbols::upsert(conn, sym)?;
                    // External stubs have no content worth indexing.
                    if !sym.is_external {
                        keyword::index_symbol(
                            conn,
                            &sym.id,
                            branch,
                            &sym.name,
                            &sym.qualified_name,
                            &sym.content,
                            &sym.file_path,
                        )?;
                    }
                }
                for (symbol_id, embedding) in &batch.vectors {
                    vectors::upsert(conn, symbol_id, branch, embedding)?;
                }
                for edge in &batch.edges {
                    edges::upsert(conn, edge)?;
                }
                if let Some(record) = &batch.file {
                    files::upsert(conn, record)?;
                }
                Ok(())
            })
        })
    }

    /// Remove every row belonging to a file on one branch, atomically.
    pub fn delete_file_rows(&self, path: &str, branch: &str) -> Result<(), StorageError> {
        self.db.with_writer(|conn| {
            in_transaction(conn, |conn| delete_file_rows_inner(conn, path, branch))
        })
    }

    /// Drop every row for a branch across all tables, atomically.
    pub fn truncate_branch(&self, branch: &str) -> Result<(), StorageError> {
        self.db.with_writer(|conn| {
            in_transaction(conn, |conn| {
                vectors::delete_by_branch(conn, branch)?;
                keyword::delete_by_branch(conn, branch)?;
                edges::delete_by_branch(conn, branch)?;
                symbols::delete_by_branch(conn, branch)?;
                files::delete_by_branch(conn, branch)?;
                repo_map::delete_by_branch(conn, branch)?;
                Ok(())
            })
        })
    }

    pub fn db_size_bytes(&self) -> Result<u64, StorageError> {
        self.db.size_bytes()
    }

    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.db.checkpoint()
    }
}

/// Vectors and FTS rows reference symbols, so they go first; edges join
/// through symbols for endpoint resolution, so they go before symbols too.
fn delete_file_rows_inner(conn: &Connection, path: &str, branch: &str) -> Result<(), StorageError> {
    vectors::delete_by_file(conn, path, branch)?;
    keyword::delete_by_file(conn, path, branch)?;
    edges::delete_by_file(conn, path, branch)?;
    symbols::delete_by_file(conn, path, branch)?;
    files::delete_by_path(conn, path, branch)?;
    Ok(())
}

/// Run `f` inside a transaction on the writer connection, rolling back on error.
fn in_transaction<F, T>(conn: &Connection, f: F) -> Result<T, StorageError>
where
    F: FnOnce(&Connection) -> Result<T, StorageError>,
{
    let tx = conn.unchecked_transaction().map_err(StorageError::sqlite)?;
    let result = f(&tx)?;
    tx.commit().map_err(StorageError::sqlite)?;
    Ok(result)
}
