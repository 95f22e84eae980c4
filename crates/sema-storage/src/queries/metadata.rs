//! schema_metadata key/value queries.

use rusqlite::{params, Connection, OptionalExtension};
use sema_core::errors::StorageError;

pub const KEY_EMBEDDING_MODEL: &str = "embedding_model_id";
pub const KEY_EMBEDDING_DIMENSION: &str = "embedding_dimension";
pub const KEY_REVISION_SEQ: &str = "revision_seq";

pub fn get(conn: &Connection, key: &str) -> Result<Option<String>, StorageError> {
    conn.query_row(
        "SELECT value FROM schema_metadata WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(StorageError::sqlite)
}

pub fn set(conn: &Connection, key: &str, value: &str) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO schema_metadata (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )
    .map_err(StorageError::sqlite)?;
    Ok(())
}

/// Whether the stored embedding model differs from the one now in use.
/// A store that has never recorded a model does not need re-embedding.
pub fn needs_reembedding(conn: &Connection, model_id: &str) -> Result<bool, StorageError> {
    Ok(match get(conn, KEY_EMBEDDING_MODEL)? {
        Some(stored) => stored != model_id,
        None => false,
    })
}

/// Increment and return the store-wide revision sequence.
pub fn next_revision(conn: &Connection) -> Result<i64, StorageError> {
    let current: i64 = get(conn, KEY_REVISION_SEQ)?
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let next = current + 1;
    set(conn, KEY_REVISION_SEQ, &next.to_string())?;
    Ok(next)
}
