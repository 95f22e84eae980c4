//! Index manager integration tests: no-op updates, Merkle persistence
//! across restarts, model-change re-embedding, contention, auto-refresh
//! bounds.

use std::path::Path;
use std::sync::{Arc, Barrier};

use sema_core::config::SemaConfig;
use sema_core::errors::{EmbedError, IndexError};
use sema_core::traits::{Embedder, NullProgress};
use sema_extract::ExtractorRegistry;
use sema_index::{CachingEmbedder, IndexManager};
use sema_storage::Store;

struct StubEmbedder {
    model: String,
    gate: Option<Arc<Barrier>>,
}

impl StubEmbedder {
    fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            gate: None,
        }
    }

    fn gated(model: &str, gate: Arc<Barrier>) -> Self {
        Self {
            model: model.to_string(),
            gate: Some(gate),
        }
    }
}

impl Embedder for StubEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        Ok(vec![text.len() as f32, 1.0, 0.0, 0.0])
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if let Some(gate) = &self.gate {
            // Hold the indexing run open until the test releases it.
            gate.wait();
            gate.wait();
        }
        Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0, 0.0, 0.0]).collect())
    }

    fn dimension(&self) -> u32 {
        4
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn config_for(root: &Path) -> SemaConfig {
    let mut config = SemaConfig::default();
    config.branch = "main".to_string();
    config.storage.db_path = root.join("index.db");
    config.storage.cache_path = root.join("merkle-cache.json");
    config
}

fn manager_with(root: &Path, config: &SemaConfig, embedder: Arc<dyn Embedder>) -> IndexManager {
    let store = Arc::new(Store::open(&config.storage.db_path, 2).unwrap());
    IndexManager::new(
        root,
        config.clone(),
        store,
        Arc::new(ExtractorRegistry::with_builtin_adapters()),
        Arc::new(CachingEmbedder::new(embedder, 1000)),
        None,
        Arc::new(NullProgress),
    )
    .unwrap()
}

#[test]
fn second_update_on_unchanged_workspace_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.ts", "function one() { return 1 }\n");
    let config = config_for(dir.path());
    let manager = manager_with(dir.path(), &config, Arc::new(StubEmbedder::new("stub")));

    let first = manager.update().unwrap();
    assert_eq!(first.files_indexed, 1);

    let second = manager.update().unwrap();
    assert_eq!(second.files_indexed, 0);
    assert_eq!(second.chunks_added, 0);
    assert_eq!(second.files_deleted, 0);
}

#[test]
fn merkle_snapshot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.ts", "function one() { return 1 }\n");
    let config = config_for(dir.path());

    {
        let manager = manager_with(dir.path(), &config, Arc::new(StubEmbedder::new("stub")));
        assert_eq!(manager.update().unwrap().files_indexed, 1);
    }

    // A fresh manager over the same snapshot sees nothing to do.
    let manager = manager_with(dir.path(), &config, Arc::new(StubEmbedder::new("stub")));
    let summary = manager.update().unwrap();
    assert_eq!(summary.files_indexed, 0);
}

#[test]
fn model_change_forces_full_reindex() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.ts", "function one() { return 1 }\n");
    write(dir.path(), "b.ts", "function two() { return 2 }\n");
    let config = config_for(dir.path());

    {
        let manager = manager_with(dir.path(), &config, Arc::new(StubEmbedder::new("model-a")));
        assert_eq!(manager.update().unwrap().files_indexed, 2);
    }

    // Same workspace, new model: everything must re-embed even though the
    // Merkle snapshot says nothing changed.
    let manager = manager_with(dir.path(), &config, Arc::new(StubEmbedder::new("model-b")));
    let summary = manager.update().unwrap();
    assert_eq!(summary.files_indexed, 2);
}

#[test]
fn concurrent_update_reports_contention() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.ts", "function one() { return 1 }\n");
    let config = config_for(dir.path());

    let gate = Arc::new(Barrier::new(2));
    let manager = Arc::new(manager_with(
        dir.path(),
        &config,
        Arc::new(StubEmbedder::gated("stub", gate.clone())),
    ));

    let background = {
        let manager = manager.clone();
        std::thread::spawn(move || manager.update())
    };

    // Wait until the background run is parked inside the embedder, then try
    // to start a second run.
    gate.wait();
    assert!(manager.is_indexing());
    assert!(matches!(
        manager.update(),
        Err(IndexError::IndexingAlreadyInProgress)
    ));
    // ensure_fresh silently no-ops while indexing is active.
    manager.ensure_fresh();

    gate.wait();
    let summary = background.join().unwrap().unwrap();
    assert_eq!(summary.files_indexed, 1);
    assert!(!manager.is_indexing());
}

#[test]
fn auto_refresh_is_bounded_by_flag_and_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.ts", "function one() { return 1 }\n");

    // Disabled: nothing happens on the read path.
    let mut config = config_for(dir.path());
    config.index.auto_refresh = false;
    let manager = manager_with(dir.path(), &config, Arc::new(StubEmbedder::new("stub")));
    manager.ensure_fresh();
    assert_eq!(manager.store().symbol_count(Some("main")).unwrap(), 0);

    // Enabled but over the file ceiling: also skipped.
    let dir2 = tempfile::tempdir().unwrap();
    write(dir2.path(), "a.ts", "function one() { return 1 }\n");
    let mut config = config_for(dir2.path());
    config.index.auto_refresh_cooldown_ms = 0;
    config.index.auto_refresh_max_files = 0;
    let manager = manager_with(dir2.path(), &config, Arc::new(StubEmbedder::new("stub")));
    manager.ensure_fresh();
    assert_eq!(manager.store().symbol_count(Some("main")).unwrap(), 0);

    // Within bounds: the delta is applied.
    let dir3 = tempfile::tempdir().unwrap();
    write(dir3.path(), "a.ts", "function one() { return 1 }\n");
    let mut config = config_for(dir3.path());
    config.index.auto_refresh_cooldown_ms = 0;
    let manager = manager_with(dir3.path(), &config, Arc::new(StubEmbedder::new("stub")));
    manager.ensure_fresh();
    assert_eq!(manager.store().symbol_count(Some("main")).unwrap(), 1);
}

#[test]
fn cooldown_suppresses_back_to_back_refreshes() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.ts", "function one() { return 1 }\n");
    let mut config = config_for(dir.path());
    config.index.auto_refresh_cooldown_ms = 60_000;
    let manager = manager_with(dir.path(), &config, Arc::new(StubEmbedder::new("stub")));

    // First call claims the cooldown window and indexes.
    manager.ensure_fresh();
    assert_eq!(manager.store().symbol_count(Some("main")).unwrap(), 1);

    // A new file inside the window is not picked up.
    write(dir.path(), "b.ts", "function two() { return 2 }\n");
    manager.ensure_fresh();
    assert_eq!(manager.store().symbol_count(Some("main")).unwrap(), 1);
}

#[test]
fn status_tracks_the_store() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.ts", "function one() { return 1 }\n");
    let config = config_for(dir.path());
    let manager = manager_with(dir.path(), &config, Arc::new(StubEmbedder::new("stub")));

    let empty = manager.status().unwrap();
    assert_eq!(empty.file_count, 0);
    assert!(empty.last_updated.is_none());

    manager.update().unwrap();
    let status = manager.status().unwrap();
    assert_eq!(status.file_count, 1);
    assert_eq!(status.chunk_count, 1);
    assert!(status.last_updated.is_some());
}
