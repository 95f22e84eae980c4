//! PRAGMA configuration applied to every connection.
//!
//! WAL mode, NORMAL sync, 5s busy_timeout, foreign_keys ON.

use rusqlite::Connection;
use sema_core::errors::StorageError;

/// Apply performance and safety pragmas to a connection.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA cache_size = -32000;
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(StorageError::sqlite)
}

/// Pragmas for read-only pool connections.
pub fn apply_read_pragmas(conn: &Connection) -> Result<(), StorageError> {
    apply_pragmas(conn)?;
    conn.execute_batch("PRAGMA query_only = ON;")
        .map_err(StorageError::sqlite)
}
