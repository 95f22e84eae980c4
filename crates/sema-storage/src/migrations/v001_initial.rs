//! V001: relational tables — symbols, edges, files, repo_map, vectors,
//! schema_metadata.

pub const MIGRATION_SQL: &str = r#"
-- Symbols: one row per declaration per branch. The id is content-derived
-- (qualified_name + signature + language), so identical declarations share
-- an id across branches.
CREATE TABLE IF NOT EXISTS symbols (
    id TEXT NOT NULL,
    branch TEXT NOT NULL,
    name TEXT NOT NULL,
    qualified_name TEXT NOT NULL,
    kind TEXT NOT NULL,
    language TEXT NOT NULL,
    file_path TEXT NOT NULL,
    start_line INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    content TEXT NOT NULL,
    signature TEXT,
    docstring TEXT,
    content_hash TEXT NOT NULL,
    is_external INTEGER NOT NULL DEFAULT 0,
    embedding_model_id TEXT,
    updated_at INTEGER NOT NULL,
    revision_id INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (id, branch)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_symbols_file ON symbols(file_path, branch);
CREATE INDEX IF NOT EXISTS idx_symbols_name ON symbols(name, branch);
CREATE INDEX IF NOT EXISTS idx_symbols_kind ON symbols(kind, branch);
CREATE INDEX IF NOT EXISTS idx_symbols_qualified ON symbols(qualified_name, branch);

-- Edges: directed, typed relationships. Endpoints reference symbol ids in
-- the same branch; deletion follows the endpoints' files.
CREATE TABLE IF NOT EXISTS edges (
    id TEXT NOT NULL,
    branch TEXT NOT NULL,
    source_id TEXT NOT NULL,
    target_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    confidence REAL NOT NULL,
    origin TEXT NOT NULL,
    source_start INTEGER,
    source_end INTEGER,
    target_start INTEGER,
    target_end INTEGER,
    updated_at INTEGER NOT NULL,
    metadata TEXT,
    PRIMARY KEY (id, branch)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source_id, branch, kind);
CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target_id, branch, kind);

-- Per-branch file metadata and the indexing state machine.
CREATE TABLE IF NOT EXISTS files (
    file_path TEXT NOT NULL,
    branch TEXT NOT NULL,
    file_hash TEXT NOT NULL,
    mtime_ms INTEGER NOT NULL,
    size INTEGER NOT NULL,
    last_indexed INTEGER NOT NULL,
    language TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    symbol_count INTEGER NOT NULL DEFAULT 0,
    importance_rank REAL,
    error_message TEXT,
    PRIMARY KEY (file_path, branch)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_files_status ON files(status, branch);
CREATE INDEX IF NOT EXISTS idx_files_branch ON files(branch);

-- Per-file importance derived from the import graph.
CREATE TABLE IF NOT EXISTS repo_map (
    file_path TEXT NOT NULL,
    branch TEXT NOT NULL,
    importance_score REAL NOT NULL,
    in_degree INTEGER NOT NULL,
    out_degree INTEGER NOT NULL,
    symbol_summary TEXT,
    PRIMARY KEY (file_path, branch)
) STRICT;

-- One embedding per symbol per branch, little-endian f32 blob.
CREATE TABLE IF NOT EXISTS vectors (
    symbol_id TEXT NOT NULL,
    branch TEXT NOT NULL,
    embedding BLOB NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (symbol_id, branch)
) STRICT;

-- Store-level key/value metadata: schema details, embedding model id,
-- revision sequence.
CREATE TABLE IF NOT EXISTS schema_metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
) STRICT;
"#;
