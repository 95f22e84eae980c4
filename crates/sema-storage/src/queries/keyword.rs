//! Trigram FTS5 keyword queries.
//!
//! BM25 ranks come straight from the FTS5 `rank` column: lower is better.
//! Malformed user queries are caught here and degrade to an empty result,
//! never an error.

use rusqlite::{params, Connection};
use sema_core::errors::StorageError;

/// One keyword hit: `(symbol_id, bm25_rank)`, lower rank = better match.
pub type KeywordHit = (String, f64);

/// Result of a keyword search. `syntax_error` flags malformed FTS input so
/// callers can distinguish "nothing matched" from "query was unparseable".
#[derive(Debug, Clone, Default)]
pub struct KeywordSearch {
    pub hits: Vec<KeywordHit>,
    pub syntax_error: bool,
}

/// Index one symbol. Delete-then-insert keeps at most one row per
/// `(symbol_id, branch)`.
#[allow(clippy::too_many_arguments)]
pub fn index_symbol(
    conn: &Connection,
    symbol_id: &str,
    branch: &str,
    name: &str,
    qualified_name: &str,
    content: &str,
    file_path: &str,
) -> Result<(), StorageError> {
    delete(conn, symbol_id, branch)?;
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO fts_symbols (name, qualified_name, content, file_path, symbol_id, branch)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(StorageError::sqlite)?;
    stmt.execute(params![name, qualified_name, content, file_path, symbol_id, branch])
        .map_err(StorageError::sqlite)?;
    Ok(())
}

/// BM25 search. `branch` restricts hits to one partition.
pub fn search(
    conn: &Connection,
    query: &str,
    limit: usize,
    branch: Option<&str>,
) -> Result<KeywordSearch, StorageError> {
    if query.trim().is_empty() {
        return Ok(KeywordSearch::default());
    }

    let result = match branch {
        Some(branch) => run_match(
            conn,
            "SELECT symbol_id, rank FROM fts_symbols
             WHERE fts_symbols MATCH ?1 AND branch = ?2
             ORDER BY rank LIMIT ?3",
            params![query, branch, limit as i64],
        ),
        None => run_match(
            conn,
            "SELECT symbol_id, rank FROM fts_symbols
             WHERE fts_symbols MATCH ?1
             ORDER BY rank LIMIT ?2",
            params![query, limit as i64],
        ),
    };

    match result {
        Ok(hits) => Ok(KeywordSearch {
            hits,
            syntax_error: false,
        }),
        Err(e) if is_fts_syntax_error(&e) => Ok(KeywordSearch {
            hits: Vec::new(),
            syntax_error: true,
        }),
        Err(e) => Err(StorageError::sqlite(e)),
    }
}

fn run_match(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> rusqlite::Result<Vec<KeywordHit>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map(params, |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

/// FTS5 reports bad MATCH expressions as generic SQL errors; the message is
/// the only discriminator.
fn is_fts_syntax_error(e: &rusqlite::Error) -> bool {
    let message = e.to_string();
    message.contains("fts5: syntax error")
        || message.contains("unterminated string")
        || message.contains("unknown special query")
        || message.contains("malformed MATCH")
}

pub fn delete(conn: &Connection, symbol_id: &str, branch: &str) -> Result<(), StorageError> {
    conn.execute(
        "DELETE FROM fts_symbols WHERE symbol_id = ?1 AND branch = ?2",
        params![symbol_id, branch],
    )
    .map_err(StorageError::sqlite)?;
    Ok(())
}

/// Remove rows for every symbol defined in a file on one branch. Must run
/// before the symbols themselves are deleted.
pub fn delete_by_file(conn: &Connection, path: &str, branch: &str) -> Result<(), StorageError> {
    conn.execute(
        "DELETE FROM fts_symbols WHERE branch = ?2 AND symbol_id IN
             (SELECT id FROM symbols WHERE file_path = ?1 AND branch = ?2)",
        params![path, branch],
    )
    .map_err(StorageError::sqlite)?;
    Ok(())
}

pub fn delete_by_branch(conn: &Connection, branch: &str) -> Result<(), StorageError> {
    conn.execute("DELETE FROM fts_symbols WHERE branch = ?1", params![branch])
        .map_err(StorageError::sqlite)?;
    Ok(())
}

/// Drop and re-populate the FTS index from the symbols table.
pub fn rebuild(conn: &Connection) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM fts_symbols", [])
        .map_err(StorageError::sqlite)?;
    conn.execute(
        "INSERT INTO fts_symbols (name, qualified_name, content, file_path, symbol_id, branch)
         SELECT name, qualified_name, content, file_path, id, branch FROM symbols",
        [],
    )
    .map_err(StorageError::sqlite)
}
