//! Durable, branch-partitioned persistence for the sema engine.
//!
//! A single embedded SQLite database holds symbols, edges, file records, the
//! trigram FTS index, embedding vectors and schema metadata. Writes go
//! through one mutex-serialized connection; reads go through a small pool.
//! WAL mode gives readers a consistent snapshot while the writer commits.

pub mod connection;
pub mod migrations;
pub mod queries;
pub mod store;

pub use connection::DatabaseManager;
pub use store::{FileIndexBatch, Store};

use chrono::{DateTime, Utc};

/// Store timestamps as integer unix milliseconds.
pub(crate) fn to_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

/// Rows written by this crate always contain valid millis; anything else is
/// treated as the epoch rather than failing the read.
pub(crate) fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
