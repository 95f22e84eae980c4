//! edges table queries.

use rusqlite::{params, Connection, Row};
use sema_core::errors::StorageError;
use sema_core::types::{Edge, EdgeKind, EdgeOrigin};

use crate::{from_millis, to_millis};

fn parse_edge_row(row: &Row<'_>) -> rusqlite::Result<Edge> {
    let kind: String = row.get(4)?;
    let origin: String = row.get(6)?;
    let source_start: Option<i64> = row.get(7)?;
    let source_end: Option<i64> = row.get(8)?;
    let target_start: Option<i64> = row.get(9)?;
    let target_end: Option<i64> = row.get(10)?;
    let metadata: Option<String> = row.get(12)?;
    Ok(Edge {
        id: row.get(0)?,
        branch: row.get(1)?,
        source_id: row.get(2)?,
        target_id: row.get(3)?,
        kind: EdgeKind::parse(&kind).unwrap_or(EdgeKind::Uses),
        confidence: row.get(5)?,
        origin: EdgeOrigin::parse(&origin).unwrap_or(EdgeOrigin::AstInference),
        source_span: match (source_start, source_end) {
            (Some(s), Some(e)) => Some((s as u32, e as u32)),
            _ => None,
        },
        target_span: match (target_start, target_end) {
            (Some(s), Some(e)) => Some((s as u32, e as u32)),
            _ => None,
        },
        updated_at: from_millis(row.get(11)?),
        metadata: metadata.and_then(|m| serde_json::from_str(&m).ok()),
    })
}

const EDGE_COLUMNS: &str = "id, branch, source_id, target_id, kind, confidence, origin, \
     source_start, source_end, target_start, target_end, updated_at, metadata";

pub fn upsert(conn: &Connection, edge: &Edge) -> Result<(), StorageError> {
    let metadata = match &edge.metadata {
        Some(value) => Some(serde_json::to_string(value).map_err(|e| StorageError::Sqlite {
            message: format!("serialize edge metadata: {e}"),
        })?),
        None => None,
    };
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO edges (id, branch, source_id, target_id, kind, confidence, origin,
                 source_start, source_end, target_start, target_end, updated_at, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT(id, branch) DO UPDATE SET
                confidence = excluded.confidence,
                source_start = excluded.source_start,
                source_end = excluded.source_end,
                target_start = excluded.target_start,
                target_end = excluded.target_end,
                updated_at = excluded.updated_at,
                metadata = excluded.metadata",
        )
        .map_err(StorageError::sqlite)?;

    stmt.execute(params![
        edge.id,
        edge.branch,
        edge.source_id,
        edge.target_id,
        edge.kind.as_str(),
        edge.confidence,
        edge.origin.as_str(),
        edge.source_span.map(|(s, _)| s as i64),
        edge.source_span.map(|(_, e)| e as i64),
        edge.target_span.map(|(s, _)| s as i64),
        edge.target_span.map(|(_, e)| e as i64),
        to_millis(edge.updated_at),
        metadata,
    ])
    .map_err(StorageError::sqlite)?;
    Ok(())
}

/// Edges whose target is `target_id`, restricted to CALLS. Indexed lookup.
pub fn callers(conn: &Connection, target_id: &str, branch: &str) -> Result<Vec<Edge>, StorageError> {
    query_edges(
        conn,
        &format!(
            "SELECT {EDGE_COLUMNS} FROM edges
             WHERE target_id = ?1 AND branch = ?2 AND kind = 'calls'
             ORDER BY confidence DESC"
        ),
        params![target_id, branch],
    )
}

/// Edges whose source is `source_id`, restricted to CALLS. Indexed lookup.
pub fn callees(conn: &Connection, source_id: &str, branch: &str) -> Result<Vec<Edge>, StorageError> {
    query_edges(
        conn,
        &format!(
            "SELECT {EDGE_COLUMNS} FROM edges
             WHERE source_id = ?1 AND branch = ?2 AND kind = 'calls'
             ORDER BY confidence DESC"
        ),
        params![source_id, branch],
    )
}

/// All edges touching a symbol, any kind, either direction.
pub fn by_symbol(conn: &Connection, symbol_id: &str, branch: &str) -> Result<Vec<Edge>, StorageError> {
    query_edges(
        conn,
        &format!(
            "SELECT {EDGE_COLUMNS} FROM edges
             WHERE (source_id = ?1 OR target_id = ?1) AND branch = ?2"
        ),
        params![symbol_id, branch],
    )
}

pub fn by_branch(conn: &Connection, branch: &str) -> Result<Vec<Edge>, StorageError> {
    query_edges(
        conn,
        &format!("SELECT {EDGE_COLUMNS} FROM edges WHERE branch = ?1"),
        params![branch],
    )
}

/// Import edges grouped per file, for repo-map degree computation.
pub fn import_degrees(
    conn: &Connection,
    branch: &str,
) -> Result<Vec<(String, String)>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT s.file_path, t.file_path
             FROM edges e
             JOIN symbols s ON s.id = e.source_id AND s.branch = e.branch
             JOIN symbols t ON t.id = e.target_id AND t.branch = e.branch
             WHERE e.branch = ?1 AND e.kind = 'imports'",
        )
        .map_err(StorageError::sqlite)?;
    let rows = stmt
        .query_map(params![branch], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(StorageError::sqlite)?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(StorageError::sqlite)?);
    }
    Ok(result)
}

/// Remove all edges with an endpoint defined in the given file. Runs before
/// the file's symbols are deleted so the endpoint subquery still resolves.
pub fn delete_by_file(conn: &Connection, path: &str, branch: &str) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM edges WHERE branch = ?2 AND (
             source_id IN (SELECT id FROM symbols WHERE file_path = ?1 AND branch = ?2)
             OR target_id IN (SELECT id FROM symbols WHERE file_path = ?1 AND branch = ?2))",
        params![path, branch],
    )
    .map_err(StorageError::sqlite)
}

pub fn delete_by_branch(conn: &Connection, branch: &str) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM edges WHERE branch = ?1", params![branch])
        .map_err(StorageError::sqlite)
}

pub fn count(conn: &Connection, branch: Option<&str>) -> Result<u64, StorageError> {
    let n: i64 = match branch {
        Some(branch) => conn
            .query_row(
                "SELECT COUNT(*) FROM edges WHERE branch = ?1",
                params![branch],
                |row| row.get(0),
            )
            .map_err(StorageError::sqlite)?,
        None => conn
            .query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))
            .map_err(StorageError::sqlite)?,
    };
    Ok(n as u64)
}

fn query_edges(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Edge>, StorageError> {
    let mut stmt = conn.prepare_cached(sql).map_err(StorageError::sqlite)?;
    let rows = stmt
        .query_map(params, parse_edge_row)
        .map_err(StorageError::sqlite)?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(StorageError::sqlite)?);
    }
    Ok(result)
}
