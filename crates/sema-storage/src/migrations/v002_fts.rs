//! V002: trigram FTS5 index over symbol text.
//!
//! Rows are maintained explicitly by the keyword repository (delete-then-
//! insert inside the same transaction that upserts the symbol), not by
//! triggers, so the FTS table stays branch-aware.

pub const MIGRATION_SQL: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS fts_symbols USING fts5(
    name,
    qualified_name,
    content,
    file_path,
    symbol_id UNINDEXED,
    branch UNINDEXED,
    tokenize = 'trigram'
);
"#;
