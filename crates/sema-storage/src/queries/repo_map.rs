//! repo_map table queries.

use rusqlite::{params, Connection, Row};
use sema_core::errors::StorageError;
use sema_core::types::RepoMapEntry;

fn parse_entry_row(row: &Row<'_>) -> rusqlite::Result<RepoMapEntry> {
    Ok(RepoMapEntry {
        file_path: row.get(0)?,
        branch: row.get(1)?,
        importance_score: row.get(2)?,
        in_degree: row.get::<_, i64>(3)? as u32,
        out_degree: row.get::<_, i64>(4)? as u32,
        symbol_summary: row.get(5)?,
    })
}

pub fn upsert(conn: &Connection, entry: &RepoMapEntry) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO repo_map (file_path, branch, importance_score, in_degree, out_degree,
                 symbol_summary)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(file_path, branch) DO UPDATE SET
                importance_score = excluded.importance_score,
                in_degree = excluded.in_degree,
                out_degree = excluded.out_degree,
                symbol_summary = excluded.symbol_summary",
        )
        .map_err(StorageError::sqlite)?;
    stmt.execute(params![
        entry.file_path,
        entry.branch,
        entry.importance_score,
        entry.in_degree as i64,
        entry.out_degree as i64,
        entry.symbol_summary,
    ])
    .map_err(StorageError::sqlite)?;
    Ok(())
}

/// Highest-importance files first.
pub fn top(conn: &Connection, branch: &str, limit: usize) -> Result<Vec<RepoMapEntry>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT file_path, branch, importance_score, in_degree, out_degree, symbol_summary
             FROM repo_map WHERE branch = ?1
             ORDER BY importance_score DESC, file_path LIMIT ?2",
        )
        .map_err(StorageError::sqlite)?;
    let rows = stmt
        .query_map(params![branch, limit as i64], parse_entry_row)
        .map_err(StorageError::sqlite)?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(StorageError::sqlite)?);
    }
    Ok(result)
}

pub fn delete_by_branch(conn: &Connection, branch: &str) -> Result<(), StorageError> {
    conn.execute("DELETE FROM repo_map WHERE branch = ?1", params![branch])
        .map_err(StorageError::sqlite)?;
    Ok(())
}
