//! files table queries: per-branch metadata and the indexing state machine.

use rusqlite::{params, Connection, Row};
use sema_core::errors::StorageError;
use sema_core::types::{FileRecord, FileStatus};

use crate::{from_millis, to_millis};

fn parse_file_row(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    let status: String = row.get(7)?;
    Ok(FileRecord {
        file_path: row.get(0)?,
        branch: row.get(1)?,
        file_hash: row.get(2)?,
        mtime_ms: row.get(3)?,
        size: row.get::<_, i64>(4)? as u64,
        last_indexed: from_millis(row.get(5)?),
        language: row.get(6)?,
        status: FileStatus::parse(&status).unwrap_or(FileStatus::Pending),
        symbol_count: row.get::<_, i64>(8)? as u32,
        importance_rank: row.get(9)?,
        error_message: row.get(10)?,
    })
}

const FILE_COLUMNS: &str = "file_path, branch, file_hash, mtime_ms, size, last_indexed, \
     language, status, symbol_count, importance_rank, error_message";

pub fn upsert(conn: &Connection, record: &FileRecord) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO files (file_path, branch, file_hash, mtime_ms, size, last_indexed,
                 language, status, symbol_count, importance_rank, error_message)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(file_path, branch) DO UPDATE SET
                file_hash = excluded.file_hash,
                mtime_ms = excluded.mtime_ms,
                size = excluded.size,
                last_indexed = excluded.last_indexed,
                language = excluded.language,
                status = excluded.status,
                symbol_count = excluded.symbol_count,
                importance_rank = excluded.importance_rank,
                error_message = excluded.error_message",
        )
        .map_err(StorageError::sqlite)?;

    stmt.execute(params![
        record.file_path,
        record.branch,
        record.file_hash,
        record.mtime_ms,
        record.size as i64,
        to_millis(record.last_indexed),
        record.language,
        record.status.as_str(),
        record.symbol_count as i64,
        record.importance_rank,
        record.error_message,
    ])
    .map_err(StorageError::sqlite)?;
    Ok(())
}

pub fn by_path(
    conn: &Connection,
    path: &str,
    branch: &str,
) -> Result<Option<FileRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE file_path = ?1 AND branch = ?2"
        ))
        .map_err(StorageError::sqlite)?;
    let mut rows = stmt
        .query_map(params![path, branch], parse_file_row)
        .map_err(StorageError::sqlite)?;
    match rows.next() {
        Some(row) => Ok(Some(row.map_err(StorageError::sqlite)?)),
        None => Ok(None),
    }
}

pub fn by_status(
    conn: &Connection,
    status: FileStatus,
    branch: &str,
) -> Result<Vec<FileRecord>, StorageError> {
    query_files(
        conn,
        &format!("SELECT {FILE_COLUMNS} FROM files WHERE status = ?1 AND branch = ?2"),
        params![status.as_str(), branch],
    )
}

pub fn by_branch(conn: &Connection, branch: &str) -> Result<Vec<FileRecord>, StorageError> {
    query_files(
        conn,
        &format!("SELECT {FILE_COLUMNS} FROM files WHERE branch = ?1 ORDER BY file_path"),
        params![branch],
    )
}

/// Persist a state-machine transition.
pub fn update_status(
    conn: &Connection,
    path: &str,
    branch: &str,
    status: FileStatus,
    error_message: Option<&str>,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE files SET status = ?3, error_message = ?4 WHERE file_path = ?1 AND branch = ?2",
        params![path, branch, status.as_str(), error_message],
    )
    .map_err(StorageError::sqlite)?;
    Ok(())
}

pub fn update_symbol_count(
    conn: &Connection,
    path: &str,
    branch: &str,
    symbol_count: u32,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE files SET symbol_count = ?3 WHERE file_path = ?1 AND branch = ?2",
        params![path, branch, symbol_count as i64],
    )
    .map_err(StorageError::sqlite)?;
    Ok(())
}

pub fn update_importance(
    conn: &Connection,
    path: &str,
    branch: &str,
    rank: f64,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE files SET importance_rank = ?3 WHERE file_path = ?1 AND branch = ?2",
        params![path, branch, rank],
    )
    .map_err(StorageError::sqlite)?;
    Ok(())
}

pub fn delete_by_path(conn: &Connection, path: &str, branch: &str) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM files WHERE file_path = ?1 AND branch = ?2",
        params![path, branch],
    )
    .map_err(StorageError::sqlite)
}

pub fn delete_by_branch(conn: &Connection, branch: &str) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM files WHERE branch = ?1", params![branch])
        .map_err(StorageError::sqlite)
}

pub fn count(conn: &Connection, branch: &str) -> Result<u64, StorageError> {
    let n: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM files WHERE branch = ?1",
            params![branch],
            |row| row.get(0),
        )
        .map_err(StorageError::sqlite)?;
    Ok(n as u64)
}

/// Most recent `last_indexed` across the branch, if any file was indexed.
pub fn last_indexed(conn: &Connection, branch: &str) -> Result<Option<i64>, StorageError> {
    conn.query_row(
        "SELECT MAX(last_indexed) FROM files WHERE branch = ?1",
        params![branch],
        |row| row.get(0),
    )
    .map_err(StorageError::sqlite)
}

fn query_files(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<FileRecord>, StorageError> {
    let mut stmt = conn.prepare_cached(sql).map_err(StorageError::sqlite)?;
    let rows = stmt
        .query_map(params, parse_file_row)
        .map_err(StorageError::sqlite)?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(StorageError::sqlite)?);
    }
    Ok(result)
}
