//! Fixed-size read connection pool.

use std::path::Path;
use std::sync::{Condvar, Mutex};

use rusqlite::Connection;
use sema_core::errors::StorageError;

use super::pragmas::apply_read_pragmas;

/// A bounded pool of read-only connections. `with_conn` blocks until a
/// connection is free; the pool never grows.
pub struct ReadPool {
    connections: Mutex<Vec<Connection>>,
    available: Condvar,
    size: usize,
}

impl ReadPool {
    /// Open `size` read connections against the database at `path`.
    pub fn open(path: &Path, size: usize) -> Result<Self, StorageError> {
        let mut connections = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = Connection::open(path).map_err(|e| StorageError::Open {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            apply_read_pragmas(&conn)?;
            connections.push(conn);
        }
        Ok(Self {
            connections: Mutex::new(connections),
            available: Condvar::new(),
            size,
        })
    }

    /// A pool with no connections; callers fall back to the writer.
    pub fn empty() -> Self {
        Self {
            connections: Mutex::new(Vec::new()),
            available: Condvar::new(),
            size: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Borrow a connection for the duration of `f`, blocking while the pool
    /// is exhausted.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let mut guard = self.connections.lock().map_err(|_| StorageError::Sqlite {
            message: "read pool lock poisoned".to_string(),
        })?;
        loop {
            if let Some(conn) = guard.pop() {
                drop(guard);
                let result = f(&conn);
                let mut guard = self.connections.lock().map_err(|_| StorageError::Sqlite {
                    message: "read pool lock poisoned".to_string(),
                })?;
                guard.push(conn);
                drop(guard);
                self.available.notify_one();
                return result;
            }
            guard = self
                .available
                .wait(guard)
                .map_err(|_| StorageError::Sqlite {
                    message: "read pool lock poisoned".to_string(),
                })?;
        }
    }
}
