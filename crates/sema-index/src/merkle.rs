//! Merkle change-detection cache.
//!
//! Per-file `(hash, mtime, size)` fingerprints with an (mtime,size) fast
//! path: a file whose stat matches the cached entry is never re-read.
//! `build_tree` folds the sorted `(path, hash)` pairs into a blake3 Merkle
//! root that summarizes the indexed state, independent of insertion order.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

const CACHE_SCHEMA_VERSION: u32 = 1;

/// One cached file fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleEntry {
    pub hash: String,
    pub mtime_ms: i64,
    pub size: u64,
}

/// Result of a change scan against the cache.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub unchanged: Vec<String>,
}

impl ChangeSet {
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.modified.is_empty()
    }

    pub fn changed_count(&self) -> usize {
        self.added.len() + self.modified.len()
    }
}

/// Serialized snapshot layout. BTreeMap keeps the file deterministic.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    root_hash: Option<String>,
    files: BTreeMap<String, MerkleEntry>,
}

/// In-memory Merkle cache over the indexed file set.
#[derive(Debug, Default)]
pub struct MerkleCache {
    files: FxHashMap<String, MerkleEntry>,
    root_hash: Option<String>,
    dirty: bool,
}

impl MerkleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash one file, using the cached value when `(mtime, size)` are both
    /// unchanged. Updates the cache as a side effect.
    pub fn hash_file(&mut self, key: &str, path: &Path) -> std::io::Result<MerkleEntry> {
        let meta = std::fs::metadata(path)?;
        let mtime_ms = mtime_millis(&meta);
        let size = meta.len();

        if let Some(cached) = self.files.get(key) {
            if cached.mtime_ms == mtime_ms && cached.size == size {
                return Ok(cached.clone());
            }
        }

        let entry = MerkleEntry {
            hash: hash_file_content(path)?,
            mtime_ms,
            size,
        };
        self.files.insert(key.to_string(), entry.clone());
        self.dirty = true;
        Ok(entry)
    }

    /// Classify `current_files` against the cache: `added` are unknown keys,
    /// `modified` are known keys whose content hash differs, the rest are
    /// `unchanged`. The cache is updated as a side effect, so an immediate
    /// second call reports everything unchanged.
    pub fn find_changed(&mut self, current_files: &[(String, std::path::PathBuf)]) -> ChangeSet {
        let mut diff = ChangeSet::default();

        for (key, path) in current_files {
            let previous = self.files.get(key).map(|e| e.hash.clone());
            match self.hash_file(key, path) {
                Ok(entry) => match previous {
                    None => diff.added.push(key.clone()),
                    Some(old_hash) if old_hash != entry.hash => diff.modified.push(key.clone()),
                    Some(_) => diff.unchanged.push(key.clone()),
                },
                Err(e) => {
                    tracing::warn!(file = %key, error = %e, "failed to hash file, skipping");
                }
            }
        }

        diff.added.sort();
        diff.modified.sort();
        diff.unchanged.sort();
        diff
    }

    /// Keys present in the cache but absent from `current_files`.
    pub fn find_deleted(&self, current_files: &[(String, std::path::PathBuf)]) -> Vec<String> {
        let current: FxHashSet<&str> = current_files.iter().map(|(k, _)| k.as_str()).collect();
        let mut deleted: Vec<String> = self
            .files
            .keys()
            .filter(|key| !current.contains(key.as_str()))
            .cloned()
            .collect();
        deleted.sort();
        deleted
    }

    pub fn remove(&mut self, key: &str) {
        if self.files.remove(key).is_some() {
            self.dirty = true;
        }
    }

    pub fn get(&self, key: &str) -> Option<&MerkleEntry> {
        self.files.get(key)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.root_hash = None;
        self.dirty = true;
    }

    /// Fold the sorted `(path, hash)` pairs into a Merkle root. The last
    /// node is duplicated on odd levels. Deterministic for a given set of
    /// pairs regardless of insertion order. Clears the dirty flag.
    pub fn build_tree(&mut self) -> String {
        let sorted: BTreeMap<&String, &MerkleEntry> = self.files.iter().collect();
        let mut level: Vec<blake3::Hash> = sorted
            .iter()
            .map(|(path, entry)| {
                let mut hasher = blake3::Hasher::new();
                hasher.update(path.as_bytes());
                hasher.update(b"\0");
                hasher.update(entry.hash.as_bytes());
                hasher.finalize()
            })
            .collect();

        if level.is_empty() {
            let root = blake3::hash(b"").to_hex().to_string();
            self.root_hash = Some(root.clone());
            self.dirty = false;
            return root;
        }

        while level.len() > 1 {
            if level.len() % 2 == 1 {
                level.push(*level.last().expect("non-empty level"));
            }
            level = level
                .chunks(2)
                .map(|pair| {
                    let mut hasher = blake3::Hasher::new();
                    hasher.update(pair[0].as_bytes());
                    hasher.update(pair[1].as_bytes());
                    hasher.finalize()
                })
                .collect();
        }

        let root = level[0].to_hex().to_string();
        self.root_hash = Some(root.clone());
        self.dirty = false;
        root
    }

    pub fn root_hash(&self) -> Option<&str> {
        self.root_hash.as_deref()
    }

    /// Persist the cache as schema-versioned JSON.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let snapshot = Snapshot {
            version: CACHE_SCHEMA_VERSION,
            root_hash: self.root_hash.clone(),
            files: self.files.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        };
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// Load a snapshot. Missing files, unreadable JSON, or a schema-version
    /// mismatch all yield an empty cache; the next update simply re-indexes.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::new(),
        };
        let snapshot: Snapshot = match serde_json::from_str(&content) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable merkle cache, starting empty");
                return Self::new();
            }
        };
        if snapshot.version != CACHE_SCHEMA_VERSION {
            tracing::warn!(
                found = snapshot.version,
                expected = CACHE_SCHEMA_VERSION,
                "merkle cache schema mismatch, starting empty"
            );
            return Self::new();
        }
        Self {
            files: snapshot.files.into_iter().collect(),
            root_hash: snapshot.root_hash,
            dirty: false,
        }
    }
}

fn mtime_millis(meta: &std::fs::Metadata) -> i64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// xxh3 of the file content, streamed, as 16-hex.
fn hash_file_content(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(format!("{:016x}", xxh3_64(&buf)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn added_then_unchanged_then_modified() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.ts", "one");
        let files = vec![("a.ts".to_string(), path.clone())];
        let mut cache = MerkleCache::new();

        let diff = cache.find_changed(&files);
        assert_eq!(diff.added, vec!["a.ts"]);

        // Idempotent: a second scan reports no changes.
        let diff = cache.find_changed(&files);
        assert!(diff.added.is_empty() && diff.modified.is_empty());
        assert_eq!(diff.unchanged, vec!["a.ts"]);

        std::fs::write(&path, "two").unwrap();
        let diff = cache.find_changed(&files);
        assert_eq!(diff.modified, vec!["a.ts"]);
    }

    #[test]
    fn deleted_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.ts", "a");
        let b = write_file(dir.path(), "b.ts", "b");
        let mut cache = MerkleCache::new();
        cache.find_changed(&[("a.ts".into(), a.clone()), ("b.ts".into(), b)]);

        let deleted = cache.find_deleted(&[("a.ts".to_string(), a)]);
        assert_eq!(deleted, vec!["b.ts"]);
    }

    #[test]
    fn fast_path_skips_re_reading_when_stat_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.ts", "stable");
        let mut cache = MerkleCache::new();
        let first = cache.hash_file("a.ts", &path).unwrap();
        let second = cache.hash_file("a.ts", &path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn root_hash_is_order_independent() {
        let mut a = MerkleCache::new();
        let mut b = MerkleCache::new();
        let entries = [
            ("x.ts", "1111"),
            ("y.ts", "2222"),
            ("z.ts", "3333"),
        ];
        for (path, hash) in entries {
            a.files.insert(
                path.to_string(),
                MerkleEntry { hash: hash.to_string(), mtime_ms: 0, size: 0 },
            );
        }
        for (path, hash) in entries.iter().rev() {
            b.files.insert(
                path.to_string(),
                MerkleEntry { hash: hash.to_string(), mtime_ms: 9, size: 9 },
            );
        }
        assert_eq!(a.build_tree(), b.build_tree());
    }

    #[test]
    fn root_hash_changes_with_content() {
        let mut cache = MerkleCache::new();
        cache.files.insert(
            "x.ts".to_string(),
            MerkleEntry { hash: "aaaa".to_string(), mtime_ms: 0, size: 0 },
        );
        let first = cache.build_tree();
        cache.files.insert(
            "x.ts".to_string(),
            MerkleEntry { hash: "bbbb".to_string(), mtime_ms: 0, size: 0 },
        );
        assert_ne!(first, cache.build_tree());
    }

    #[test]
    fn dirty_flag_cleared_only_by_build_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.ts", "x");
        let mut cache = MerkleCache::new();
        cache.hash_file("a.ts", &path).unwrap();
        assert!(cache.is_dirty());
        cache.build_tree();
        assert!(!cache.is_dirty());
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_file(dir.path(), "a.ts", "content");
        let snapshot_path = dir.path().join("merkle-cache.json");

        let mut cache = MerkleCache::new();
        cache.hash_file("a.ts", &file).unwrap();
        cache.build_tree();
        cache.save(&snapshot_path).unwrap();

        let loaded = MerkleCache::load(&snapshot_path);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("a.ts"), cache.get("a.ts"));
        assert_eq!(loaded.root_hash(), cache.root_hash());
        assert!(!loaded.is_dirty());
    }

    #[test]
    fn unreadable_snapshot_yields_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "merkle-cache.json", "{not json");
        let cache = MerkleCache::load(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn missing_snapshot_yields_empty_cache() {
        let cache = MerkleCache::load(Path::new("/nonexistent/merkle.json"));
        assert!(cache.is_empty());
    }

    proptest! {
        #[test]
        fn build_tree_is_deterministic_over_any_set(
            entries in proptest::collection::btree_map("[a-z]{1,8}\\.ts", "[0-9a-f]{16}", 0..20)
        ) {
            let mut a = MerkleCache::new();
            let mut b = MerkleCache::new();
            for (path, hash) in &entries {
                a.files.insert(path.clone(), MerkleEntry { hash: hash.clone(), mtime_ms: 1, size: 2 });
            }
            for (path, hash) in entries.iter().rev() {
                b.files.insert(path.clone(), MerkleEntry { hash: hash.clone(), mtime_ms: 3, size: 4 });
            }
            prop_assert_eq!(a.build_tree(), b.build_tree());
        }
    }
}
