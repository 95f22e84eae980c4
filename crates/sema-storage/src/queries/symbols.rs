//! symbols table queries.

use rusqlite::{params, Connection, Row};
use sema_core::errors::StorageError;
use sema_core::types::{Symbol, SymbolKind};

use crate::{from_millis, to_millis};

pub(crate) fn parse_symbol_row(row: &Row<'_>) -> rusqlite::Result<Symbol> {
    let kind: String = row.get(4)?;
    Ok(Symbol {
        id: row.get(0)?,
        branch: row.get(1)?,
        name: row.get(2)?,
        qualified_name: row.get(3)?,
        kind: SymbolKind::parse(&kind).unwrap_or(SymbolKind::Variable),
        language: row.get(5)?,
        file_path: row.get(6)?,
        start_line: row.get::<_, i64>(7)? as u32,
        end_line: row.get::<_, i64>(8)? as u32,
        content: row.get(9)?,
        signature: row.get(10)?,
        docstring: row.get(11)?,
        content_hash: row.get(12)?,
        is_external: row.get::<_, i64>(13)? != 0,
        embedding_model_id: row.get(14)?,
        updated_at: from_millis(row.get(15)?),
        revision_id: row.get(16)?,
    })
}

const SYMBOL_COLUMNS: &str = "id, branch, name, qualified_name, kind, language, file_path, \
     start_line, end_line, content, signature, docstring, content_hash, \
     is_external, embedding_model_id, updated_at, revision_id";

/// Idempotent upsert keyed on `(id, branch)`.
pub fn upsert(conn: &Connection, sym: &Symbol) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO symbols (id, branch, name, qualified_name, kind, language, file_path,
                 start_line, end_line, content, signature, docstring, content_hash,
                 is_external, embedding_model_id, updated_at, revision_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
             ON CONFLICT(id, branch) DO UPDATE SET
                name = excluded.name,
                qualified_name = excluded.qualified_name,
                kind = excluded.kind,
                language = excluded.language,
                file_path = excluded.file_path,
                start_line = excluded.start_line,
                end_line = excluded.end_line,
                content = excluded.content,
                signature = excluded.signature,
                docstring = excluded.docstring,
                content_hash = excluded.content_hash,
                is_external = excluded.is_external,
                embedding_model_id = excluded.embedding_model_id,
                updated_at = excluded.updated_at,
                revision_id = excluded.revision_id",
        )
        .map_err(StorageError::sqlite)?;

    stmt.execute(params![
        sym.id,
        sym.branch,
        sym.name,
        sym.qualified_name,
        sym.kind.as_str(),
        sym.language,
        sym.file_path,
        sym.start_line as i64,
        sym.end_line as i64,
        sym.content,
        sym.signature,
        sym.docstring,
        sym.content_hash,
        sym.is_external as i64,
        sym.embedding_model_id,
        to_millis(sym.updated_at),
        sym.revision_id,
    ])
    .map_err(StorageError::sqlite)?;
    Ok(())
}

pub fn by_id(conn: &Connection, id: &str, branch: &str) -> Result<Option<Symbol>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {SYMBOL_COLUMNS} FROM symbols WHERE id = ?1 AND branch = ?2"
        ))
        .map_err(StorageError::sqlite)?;
    let mut rows = stmt
        .query_map(params![id, branch], parse_symbol_row)
        .map_err(StorageError::sqlite)?;
    match rows.next() {
        Some(row) => Ok(Some(row.map_err(StorageError::sqlite)?)),
        None => Ok(None),
    }
}

pub fn by_file(conn: &Connection, path: &str, branch: &str) -> Result<Vec<Symbol>, StorageError> {
    query_symbols(
        conn,
        &format!(
            "SELECT {SYMBOL_COLUMNS} FROM symbols
             WHERE file_path = ?1 AND branch = ?2 ORDER BY start_line"
        ),
        params![path, branch],
    )
}

pub fn by_qualified(
    conn: &Connection,
    qualified_name: &str,
    branch: &str,
) -> Result<Option<Symbol>, StorageError> {
    let mut found = query_symbols(
        conn,
        &format!(
            "SELECT {SYMBOL_COLUMNS} FROM symbols
             WHERE qualified_name = ?1 AND branch = ?2 LIMIT 1"
        ),
        params![qualified_name, branch],
    )?;
    Ok(found.pop())
}

pub fn by_name(conn: &Connection, name: &str, branch: &str) -> Result<Vec<Symbol>, StorageError> {
    query_symbols(
        conn,
        &format!("SELECT {SYMBOL_COLUMNS} FROM symbols WHERE name = ?1 AND branch = ?2"),
        params![name, branch],
    )
}

pub fn by_kind(
    conn: &Connection,
    kind: SymbolKind,
    branch: &str,
) -> Result<Vec<Symbol>, StorageError> {
    query_symbols(
        conn,
        &format!("SELECT {SYMBOL_COLUMNS} FROM symbols WHERE kind = ?1 AND branch = ?2"),
        params![kind.as_str(), branch],
    )
}

pub fn all(conn: &Connection, branch: &str, limit: usize) -> Result<Vec<Symbol>, StorageError> {
    query_symbols(
        conn,
        &format!(
            "SELECT {SYMBOL_COLUMNS} FROM symbols
             WHERE branch = ?1 ORDER BY file_path, start_line LIMIT ?2"
        ),
        params![branch, limit as i64],
    )
}

/// Symbol located at a line of a file, innermost declaration first.
pub fn at_location(
    conn: &Connection,
    path: &str,
    line: u32,
    branch: &str,
) -> Result<Option<Symbol>, StorageError> {
    let mut found = query_symbols(
        conn,
        &format!(
            "SELECT {SYMBOL_COLUMNS} FROM symbols
             WHERE file_path = ?1 AND branch = ?2
               AND start_line <= ?3 AND end_line >= ?3
             ORDER BY (end_line - start_line) ASC LIMIT 1"
        ),
        params![path, branch, line as i64],
    )?;
    Ok(found.pop())
}

pub fn delete_by_file(conn: &Connection, path: &str, branch: &str) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM symbols WHERE file_path = ?1 AND branch = ?2",
        params![path, branch],
    )
    .map_err(StorageError::sqlite)
}

pub fn delete_by_branch(conn: &Connection, branch: &str) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM symbols WHERE branch = ?1", params![branch])
        .map_err(StorageError::sqlite)
}

pub fn count(conn: &Connection, branch: Option<&str>) -> Result<u64, StorageError> {
    let n: i64 = match branch {
        Some(branch) => conn
            .query_row(
                "SELECT COUNT(*) FROM symbols WHERE branch = ?1",
                params![branch],
                |row| row.get(0),
            )
            .map_err(StorageError::sqlite)?,
        None => conn
            .query_row("SELECT COUNT(*) FROM symbols", [], |row| row.get(0))
            .map_err(StorageError::sqlite)?,
    };
    Ok(n as u64)
}

/// Distinct branches present in the store.
pub fn branches(conn: &Connection) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT DISTINCT branch FROM symbols ORDER BY branch")
        .map_err(StorageError::sqlite)?;
    let rows = stmt
        .query_map([], |row| row.get(0))
        .map_err(StorageError::sqlite)?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(StorageError::sqlite)?);
    }
    Ok(result)
}

fn query_symbols(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Symbol>, StorageError> {
    let mut stmt = conn.prepare_cached(sql).map_err(StorageError::sqlite)?;
    let rows = stmt
        .query_map(params, parse_symbol_row)
        .map_err(StorageError::sqlite)?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(StorageError::sqlite)?);
    }
    Ok(result)
}
