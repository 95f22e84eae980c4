//! Caching wrapper around the external `Embedder`.
//!
//! Keys are content hashes, so identical symbol bodies across files and
//! branches hit the cache instead of the provider. Capacity is fixed at
//! construction; eviction is the cache's concern.

use std::sync::Arc;

use moka::sync::Cache;
use sema_core::errors::EmbedError;
use sema_core::identity;
use sema_core::traits::Embedder;

/// Process-wide embedding cache shared by every indexing run.
pub struct CachingEmbedder {
    inner: Arc<dyn Embedder>,
    cache: Cache<String, Vec<f32>>,
}

impl CachingEmbedder {
    pub fn new(inner: Arc<dyn Embedder>, capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::new(capacity),
        }
    }

    pub fn dimension(&self) -> u32 {
        self.inner.dimension()
    }

    pub fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    /// Embed one text, keyed by its content hash.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let key = identity::content_hash(text);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        let vector = self.inner.embed(text)?;
        self.cache.insert(key, vector.clone());
        Ok(vector)
    }

    /// Embed many `(content_hash, text)` pairs, batching provider calls at
    /// `batch_size` and serving duplicates from the cache. Output order
    /// matches input order.
    pub fn embed_batch(
        &self,
        items: &[(String, String)],
        batch_size: usize,
    ) -> Result<Vec<Vec<f32>>, EmbedError> {
        let mut results: Vec<Option<Vec<f32>>> = vec![None; items.len()];
        let mut misses: Vec<usize> = Vec::new();

        for (i, (key, _)) in items.iter().enumerate() {
            match self.cache.get(key) {
                Some(hit) => results[i] = Some(hit),
                None => misses.push(i),
            }
        }

        for chunk in misses.chunks(batch_size.max(1)) {
            let texts: Vec<String> = chunk.iter().map(|&i| items[i].1.clone()).collect();
            let vectors = self.inner.embed_batch(&texts)?;
            if vectors.len() != texts.len() {
                return Err(EmbedError::BatchShape {
                    expected: texts.len(),
                    actual: vectors.len(),
                });
            }
            for (&i, vector) in chunk.iter().zip(vectors) {
                self.cache.insert(items[i].0.clone(), vector.clone());
                results[i] = Some(vector);
            }
        }

        Ok(results.into_iter().flatten().collect())
    }

    /// Entries currently cached (approximate, per moka semantics).
    pub fn cached_entries(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts provider calls so tests can observe cache hits.
    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    impl Embedder for CountingEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![text.len() as f32, 1.0])
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn dimension(&self) -> u32 {
            2
        }

        fn model_id(&self) -> &str {
            "counting-test"
        }
    }

    #[test]
    fn repeated_embed_hits_cache() {
        let inner = Arc::new(CountingEmbedder { calls: AtomicUsize::new(0) });
        let cache = CachingEmbedder::new(inner.clone(), 100);

        cache.embed("hello").unwrap();
        cache.embed("hello").unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn batch_serves_duplicates_from_cache() {
        let inner = Arc::new(CountingEmbedder { calls: AtomicUsize::new(0) });
        let cache = CachingEmbedder::new(inner.clone(), 100);

        let items: Vec<(String, String)> = ["a", "b"]
            .iter()
            .map(|t| (identity::content_hash(t), t.to_string()))
            .collect();
        let first = cache.embed_batch(&items, 10).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);

        // Everything cached: no further provider calls.
        let second = cache.embed_batch(&items, 10).unwrap();
        assert_eq!(second, first);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn batch_respects_batch_size() {
        let inner = Arc::new(CountingEmbedder { calls: AtomicUsize::new(0) });
        let cache = CachingEmbedder::new(inner.clone(), 100);

        let items: Vec<(String, String)> = (0..5)
            .map(|i| {
                let text = format!("text-{i}");
                (identity::content_hash(&text), text)
            })
            .collect();
        cache.embed_batch(&items, 2).unwrap();
        // 5 misses at batch size 2 → 3 provider calls.
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }
}
