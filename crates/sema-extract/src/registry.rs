//! Adapter registry: file extension → language adapter.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use sema_core::errors::ExtractError;
use sema_core::traits::LanguageAdapter;
use sema_core::types::Extraction;

use crate::adapters::{GoAdapter, JavaAdapter, PythonAdapter, RustAdapter, TypeScriptAdapter};

/// Registry of language adapters keyed by file extension. Unknown extensions
/// yield an empty extraction; the indexer's fallback chunker takes over from
/// there.
pub struct ExtractorRegistry {
    by_extension: FxHashMap<String, Arc<dyn LanguageAdapter>>,
    languages_by_extension: FxHashMap<String, String>,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_builtin_adapters()
    }
}

impl ExtractorRegistry {
    /// Empty registry; callers register adapters explicitly.
    pub fn new() -> Self {
        Self {
            by_extension: FxHashMap::default(),
            languages_by_extension: FxHashMap::default(),
        }
    }

    /// Registry with every built-in adapter.
    pub fn with_builtin_adapters() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TypeScriptAdapter::new()));
        registry.register(Arc::new(PythonAdapter::new()));
        registry.register(Arc::new(RustAdapter::new()));
        registry.register(Arc::new(GoAdapter::new()));
        registry.register(Arc::new(JavaAdapter::new()));
        registry
    }

    /// Register an adapter for all its claimed extensions. Later
    /// registrations win on collision.
    pub fn register(&mut self, adapter: Arc<dyn LanguageAdapter>) {
        let default_language = adapter.languages().first().copied().unwrap_or("unknown");
        for ext in adapter.extensions() {
            let language = language_for_extension(ext).unwrap_or(default_language);
            self.by_extension.insert((*ext).to_string(), adapter.clone());
            self.languages_by_extension
                .insert((*ext).to_string(), language.to_string());
        }
    }

    /// Whether any adapter claims this file's extension.
    pub fn supports(&self, path: &str) -> bool {
        extension(path).is_some_and(|ext| self.by_extension.contains_key(ext))
    }

    /// Language name recorded for a file, when the extension is known.
    pub fn language_of(&self, path: &str) -> Option<&str> {
        extension(path).and_then(|ext| self.languages_by_extension.get(ext).map(|s| s.as_str()))
    }

    /// All claimed extensions, for discovery filtering.
    pub fn extensions(&self) -> Vec<&str> {
        self.by_extension.keys().map(|s| s.as_str()).collect()
    }

    /// Extract a file through its adapter. Unknown extensions yield an empty
    /// extraction.
    pub fn extract(&self, source: &str, path: &str) -> Result<Extraction, ExtractError> {
        match extension(path).and_then(|ext| self.by_extension.get(ext)) {
            Some(adapter) => adapter.extract(source, path),
            None => Ok(Extraction::default()),
        }
    }
}

/// TypeScript and JavaScript share one adapter; the recorded language still
/// distinguishes them by extension.
fn language_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "ts" | "tsx" | "mts" | "cts" => Some("typescript"),
        "js" | "jsx" | "mjs" | "cjs" => Some("javascript"),
        "py" | "pyi" => Some("python"),
        "rs" => Some("rust"),
        "go" => Some("go"),
        "java" => Some("java"),
        _ => None,
    }
}

fn extension(path: &str) -> Option<&str> {
    let base = path.rsplit(['/', '\\']).next()?;
    let (_, ext) = base.rsplit_once('.')?;
    (!ext.is_empty()).then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_by_extension() {
        let registry = ExtractorRegistry::with_builtin_adapters();
        assert!(registry.supports("src/app.ts"));
        assert!(registry.supports("lib/mod.rs"));
        assert!(!registry.supports("README.md"));
        assert!(!registry.supports("Makefile"));
    }

    #[test]
    fn language_follows_extension_not_adapter() {
        let registry = ExtractorRegistry::with_builtin_adapters();
        assert_eq!(registry.language_of("a.ts"), Some("typescript"));
        assert_eq!(registry.language_of("a.js"), Some("javascript"));
        assert_eq!(registry.language_of("a.py"), Some("python"));
        assert_eq!(registry.language_of("a.md"), None);
    }

    #[test]
    fn unknown_extension_extracts_nothing() {
        let registry = ExtractorRegistry::with_builtin_adapters();
        let out = registry.extract("# heading\nsome prose\n", "README.md").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn known_extension_extracts_symbols() {
        let registry = ExtractorRegistry::with_builtin_adapters();
        let out = registry
            .extract("export function ping() { return 'pong' }", "net.ts")
            .unwrap();
        assert_eq!(out.symbols.len(), 1);
        assert_eq!(out.symbols[0].name, "ping");
    }
}
