//! vectors table queries: embedding persistence and cosine similarity scan.
//!
//! This is the pure-Rust fallback path for vector search: a brute-force
//! cosine scan over the branch-filtered table. The contract matches a native
//! vector extension (ids, distance, `similarity = 1 - distance`); only
//! latency differs.

use chrono::Utc;
use rusqlite::{params, Connection};
use sema_core::errors::StorageError;

use crate::to_millis;

/// One similarity hit.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    pub symbol_id: String,
    pub distance: f64,
    pub similarity: f64,
}

pub fn upsert(
    conn: &Connection,
    symbol_id: &str,
    branch: &str,
    embedding: &[f32],
) -> Result<(), StorageError> {
    let blob = f32_vec_to_bytes(embedding);
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO vectors (symbol_id, branch, embedding, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(symbol_id, branch) DO UPDATE SET
                embedding = excluded.embedding,
                updated_at = excluded.updated_at",
        )
        .map_err(StorageError::sqlite)?;
    stmt.execute(params![symbol_id, branch, blob, to_millis(Utc::now())])
        .map_err(StorageError::sqlite)?;
    Ok(())
}

/// Top-k cosine scan. A zero-norm query yields no hits.
pub fn search(
    conn: &Connection,
    query: &[f32],
    k: usize,
    branch: Option<&str>,
) -> Result<Vec<VectorHit>, StorageError> {
    let query_norm_sq: f64 = query.iter().map(|x| (*x as f64) * (*x as f64)).sum();
    if query_norm_sq == 0.0 || k == 0 {
        return Ok(Vec::new());
    }

    let mut scored: Vec<(String, f64)> = Vec::new();
    let mut scan = |symbol_id: String, blob: Vec<u8>| {
        if blob.len() != query.len() * 4 {
            return;
        }
        let stored = bytes_to_f32_vec(&blob);
        let sim = cosine_similarity(query, &stored);
        if sim > 0.0 {
            scored.push((symbol_id, sim));
        }
    };

    match branch {
        Some(branch) => {
            let mut stmt = conn
                .prepare_cached("SELECT symbol_id, embedding FROM vectors WHERE branch = ?1")
                .map_err(StorageError::sqlite)?;
            let rows = stmt
                .query_map(params![branch], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
                })
                .map_err(StorageError::sqlite)?;
            for row in rows {
                let (id, blob) = row.map_err(StorageError::sqlite)?;
                scan(id, blob);
            }
        }
        None => {
            let mut stmt = conn
                .prepare_cached("SELECT symbol_id, embedding FROM vectors")
                .map_err(StorageError::sqlite)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
                })
                .map_err(StorageError::sqlite)?;
            for row in rows {
                let (id, blob) = row.map_err(StorageError::sqlite)?;
                scan(id, blob);
            }
        }
    }

    // Similarity descending, symbol_id ascending on ties for determinism.
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(k);

    Ok(scored
        .into_iter()
        .map(|(symbol_id, similarity)| VectorHit {
            symbol_id,
            distance: 1.0 - similarity,
            similarity,
        })
        .collect())
}

/// Stored embedding for one symbol, when present.
pub fn get(
    conn: &Connection,
    symbol_id: &str,
    branch: &str,
) -> Result<Option<Vec<f32>>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT embedding FROM vectors WHERE symbol_id = ?1 AND branch = ?2")
        .map_err(StorageError::sqlite)?;
    let mut rows = stmt
        .query_map(params![symbol_id, branch], |row| row.get::<_, Vec<u8>>(0))
        .map_err(StorageError::sqlite)?;
    match rows.next() {
        Some(blob) => Ok(Some(bytes_to_f32_vec(&blob.map_err(StorageError::sqlite)?))),
        None => Ok(None),
    }
}

pub fn delete(conn: &Connection, symbol_id: &str, branch: &str) -> Result<(), StorageError> {
    conn.execute(
        "DELETE FROM vectors WHERE symbol_id = ?1 AND branch = ?2",
        params![symbol_id, branch],
    )
    .map_err(StorageError::sqlite)?;
    Ok(())
}

/// Remove vectors for every symbol defined in a file on one branch. Must run
/// before the symbols themselves are deleted.
pub fn delete_by_file(conn: &Connection, path: &str, branch: &str) -> Result<(), StorageError> {
    conn.execute(
        "DELETE FROM vectors WHERE branch = ?2 AND symbol_id IN
             (SELECT id FROM symbols WHERE file_path = ?1 AND branch = ?2)",
        params![path, branch],
    )
    .map_err(StorageError::sqlite)?;
    Ok(())
}

pub fn delete_by_branch(conn: &Connection, branch: &str) -> Result<(), StorageError> {
    conn.execute("DELETE FROM vectors WHERE branch = ?1", params![branch])
        .map_err(StorageError::sqlite)?;
    Ok(())
}

pub fn count(conn: &Connection, branch: Option<&str>) -> Result<u64, StorageError> {
    let n: i64 = match branch {
        Some(branch) => conn
            .query_row(
                "SELECT COUNT(*) FROM vectors WHERE branch = ?1",
                params![branch],
                |row| row.get(0),
            )
            .map_err(StorageError::sqlite)?,
        None => conn
            .query_row("SELECT COUNT(*) FROM vectors", [], |row| row.get(0))
            .map_err(StorageError::sqlite)?,
    };
    Ok(n as u64)
}

/// Convert f32 slice to bytes (little-endian).
pub fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes back to f32 vec.
pub fn bytes_to_f32_vec(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f32_round_trip() {
        let v = vec![0.5_f32, -1.25, 3.0];
        assert_eq!(bytes_to_f32_vec(&f32_vec_to_bytes(&v)), v);
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [1.0_f32, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn zero_norm_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
