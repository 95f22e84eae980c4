//! Workspace discovery: gitignore-aware walk with include/exclude globs.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use sema_core::errors::{ConfigError, IndexError};
use sema_extract::ExtractorRegistry;

/// Directories never worth indexing, on top of whatever .gitignore says.
const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    "out",
    "target",
    "vendor",
    "coverage",
    ".git",
    ".next",
    ".venv",
    "__pycache__",
];

/// One discovered workspace file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Path relative to the workspace root, `/`-separated. This is the key
    /// used across the store and the Merkle cache.
    pub rel_path: String,
    pub abs_path: PathBuf,
}

/// Walk the workspace and return the de-duplicated, sorted candidate list.
///
/// A file qualifies when an adapter claims its extension, or when it matches
/// an explicit include pattern. Exclude patterns and the built-in directory
/// list always win.
pub fn discover_files(
    root: &Path,
    include_patterns: &[String],
    exclude_patterns: &[String],
    registry: &ExtractorRegistry,
) -> Result<Vec<DiscoveredFile>, IndexError> {
    if !root.is_dir() {
        return Err(IndexError::MissingRoot {
            path: root.display().to_string(),
        });
    }

    let include = build_globset(include_patterns)?;
    let exclude = build_globset(exclude_patterns)?;

    let mut files = Vec::new();
    let walk = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(false)
        .follow_links(false)
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !DEFAULT_EXCLUDED_DIRS.contains(&name.as_ref())
        })
        .build();

    for entry in walk {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        let rel_path = match entry.path().strip_prefix(root) {
            Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
            Err(_) => continue,
        };

        if let Some(exclude) = &exclude {
            if exclude.is_match(&rel_path) {
                continue;
            }
        }

        let included = match &include {
            Some(include) => include.is_match(&rel_path),
            None => registry.supports(&rel_path),
        };
        if !included {
            continue;
        }

        files.push(DiscoveredFile {
            rel_path,
            abs_path: entry.into_path(),
        });
    }

    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    files.dedup_by(|a, b| a.rel_path == b.rel_path);
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, IndexError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            IndexError::Config(ConfigError::BadGlob {
                pattern: pattern.clone(),
                message: e.to_string(),
            })
        })?;
        builder.add(glob);
    }
    let set = builder.build().map_err(|e| {
        IndexError::Config(ConfigError::BadGlob {
            pattern: patterns.join(", "),
            message: e.to_string(),
        })
    })?;
    Ok(Some(set))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "content").unwrap();
    }

    #[test]
    fn discovers_supported_files_and_skips_junk_dirs() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/app.ts");
        touch(dir.path(), "src/util.py");
        touch(dir.path(), "README.md");
        touch(dir.path(), "node_modules/lib/index.js");
        touch(dir.path(), "dist/bundle.js");

        let registry = ExtractorRegistry::with_builtin_adapters();
        let files = discover_files(dir.path(), &[], &[], &registry).unwrap();
        let rels: Vec<&str> = files.iter().map(|f| f.rel_path.as_str()).collect();
        assert_eq!(rels, vec!["src/app.ts", "src/util.py"]);
    }

    #[test]
    fn include_patterns_override_adapter_extensions() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "docs/guide.md");
        touch(dir.path(), "src/app.ts");

        let registry = ExtractorRegistry::with_builtin_adapters();
        let files = discover_files(dir.path(), &["docs/**/*.md".to_string()], &[], &registry).unwrap();
        let rels: Vec<&str> = files.iter().map(|f| f.rel_path.as_str()).collect();
        assert_eq!(rels, vec!["docs/guide.md"]);
    }

    #[test]
    fn exclude_patterns_win() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/app.ts");
        touch(dir.path(), "src/generated/api.ts");

        let registry = ExtractorRegistry::with_builtin_adapters();
        let files = discover_files(
            dir.path(),
            &[],
            &["src/generated/**".to_string()],
            &registry,
        )
        .unwrap();
        let rels: Vec<&str> = files.iter().map(|f| f.rel_path.as_str()).collect();
        assert_eq!(rels, vec!["src/app.ts"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let registry = ExtractorRegistry::with_builtin_adapters();
        let result = discover_files(Path::new("/definitely/not/here"), &[], &[], &registry);
        assert!(matches!(result, Err(IndexError::MissingRoot { .. })));
    }

    #[test]
    fn bad_glob_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ExtractorRegistry::with_builtin_adapters();
        let result = discover_files(dir.path(), &["[".to_string()], &[], &registry);
        assert!(matches!(result, Err(IndexError::Config(_))));
    }
}
