//! Find-similar: nearest symbols to a vector or to an existing location.

use sema_core::errors::RetrievalError;
use sema_core::types::Symbol;
use sema_storage::Store;

/// One similarity hit, hydrated.
#[derive(Debug, Clone)]
pub struct SimilarResult {
    pub symbol: Symbol,
    pub similarity: f64,
}

/// Nearest symbols to `vector`, excluding `exclude_id` (the seed itself when
/// searching from an existing symbol).
pub fn find_similar_by_vector(
    store: &Store,
    vector: &[f32],
    branch: &str,
    limit: usize,
    exclude_id: Option<&str>,
) -> Result<Vec<SimilarResult>, RetrievalError> {
    // Over-fetch by one so the excluded seed never costs a slot.
    let hits = store.vector_search(vector, limit + 1, Some(branch))?;
    let mut results = Vec::with_capacity(limit);

    for hit in hits {
        if exclude_id == Some(hit.symbol_id.as_str()) {
            continue;
        }
        if let Some(symbol) = store.symbol_by_id(&hit.symbol_id, branch)? {
            results.push(SimilarResult {
                symbol,
                similarity: hit.similarity,
            });
        }
        if results.len() == limit {
            break;
        }
    }
    Ok(results)
}

/// Nearest symbols to whatever is declared at `path:line`, using its stored
/// embedding. Unknown locations are an error so callers can distinguish
/// "nothing similar" from "no such symbol".
pub fn find_similar_at_location(
    store: &Store,
    path: &str,
    line: u32,
    branch: &str,
    limit: usize,
) -> Result<Vec<SimilarResult>, RetrievalError> {
    let Some(seed) = store.symbol_at_location(path, line, branch)? else {
        return Err(RetrievalError::UnknownLocation {
            path: path.to_string(),
            line,
        });
    };
    let Some(vector) = store.vector_get(&seed.id, branch)? else {
        return Err(RetrievalError::UnknownLocation {
            path: path.to_string(),
            line,
        });
    };
    find_similar_by_vector(store, &vector, branch, limit, Some(&seed.id))
}
