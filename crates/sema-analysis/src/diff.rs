//! Branch diff: compare two branch partitions of the same store.
//!
//! Symbols are keyed by `qualified_name` (the stable cross-branch identity),
//! edges by `(source_id, target_id, kind)`.

use std::time::Instant;

use rustc_hash::{FxHashMap, FxHashSet};
use sema_core::errors::AnalysisError;
use sema_core::types::{Edge, EdgeKind, Symbol};
use sema_storage::Store;

/// Pagination for the change lists. Summary counts always cover the full
/// diff regardless of the window.
#[derive(Debug, Clone)]
pub struct DiffOptions {
    pub offset: usize,
    pub limit: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 100,
        }
    }
}

/// What changed about one symbol present in both branches.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolChange {
    pub qualified_name: String,
    pub file_path: String,
    pub content_changed: bool,
    pub signature_changed: bool,
    pub location_changed: bool,
}

/// Full-diff counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub edges_added: usize,
    pub edges_removed: usize,
    pub affected_files: usize,
}

/// The diff of `source_branch` relative to `target_branch`.
#[derive(Debug, Clone)]
pub struct BranchDiff {
    pub source_branch: String,
    pub target_branch: String,
    pub summary: DiffSummary,
    /// Symbols whose qualified name exists only in the source branch.
    pub added: Vec<Symbol>,
    /// Symbols whose qualified name exists only in the target branch.
    pub removed: Vec<Symbol>,
    pub modified: Vec<SymbolChange>,
    pub affected_files: Vec<String>,
    pub compute_time_ms: u64,
}

/// Compute the branch diff. External stubs are ignored; they carry no
/// source of their own.
pub fn diff_branches(
    store: &Store,
    source_branch: &str,
    target_branch: &str,
    options: &DiffOptions,
) -> Result<BranchDiff, AnalysisError> {
    let started = Instant::now();

    let source_symbols = load_symbols(store, source_branch)?;
    let target_symbols = load_symbols(store, target_branch)?;

    let target_by_name: FxHashMap<&str, &Symbol> = target_symbols
        .iter()
        .map(|s| (s.qualified_name.as_str(), s))
        .collect();
    let source_by_name: FxHashMap<&str, &Symbol> = source_symbols
        .iter()
        .map(|s| (s.qualified_name.as_str(), s))
        .collect();

    let mut added: Vec<Symbol> = Vec::new();
    let mut modified: Vec<SymbolChange> = Vec::new();
    let mut affected_files: FxHashSet<String> = FxHashSet::default();

    for sym in &source_symbols {
        match target_by_name.get(sym.qualified_name.as_str()) {
            None => {
                affected_files.insert(sym.file_path.clone());
                added.push(sym.clone());
            }
            Some(counterpart) => {
                if sym.content_hash != counterpart.content_hash {
                    affected_files.insert(sym.file_path.clone());
                    modified.push(SymbolChange {
                        qualified_name: sym.qualified_name.clone(),
                        file_path: sym.file_path.clone(),
                        content_changed: true,
                        signature_changed: sym.signature != counterpart.signature,
                        location_changed: sym.start_line != counterpart.start_line
                            || sym.end_line != counterpart.end_line
                            || sym.file_path != counterpart.file_path,
                    });
                }
            }
        }
    }

    let mut removed: Vec<Symbol> = Vec::new();
    for sym in &target_symbols {
        if !source_by_name.contains_key(sym.qualified_name.as_str()) {
            affected_files.insert(sym.file_path.clone());
            removed.push(sym.clone());
        }
    }

    // Edge diff, keyed by (source_id, target_id, kind).
    let source_edges = edge_keys(store.edges_by_branch(source_branch)?);
    let target_edges = edge_keys(store.edges_by_branch(target_branch)?);
    let edges_added = source_edges.difference(&target_edges).count();
    let edges_removed = target_edges.difference(&source_edges).count();

    added.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
    removed.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
    modified.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
    let mut affected_files: Vec<String> = affected_files.into_iter().collect();
    affected_files.sort();

    let summary = DiffSummary {
        added: added.len(),
        removed: removed.len(),
        modified: modified.len(),
        edges_added,
        edges_removed,
        affected_files: affected_files.len(),
    };

    tracing::debug!(
        source = source_branch,
        target = target_branch,
        added = summary.added,
        removed = summary.removed,
        modified = summary.modified,
        "branch diff complete"
    );

    Ok(BranchDiff {
        source_branch: source_branch.to_string(),
        target_branch: target_branch.to_string(),
        summary,
        added: paginate(added, options),
        removed: paginate(removed, options),
        modified: paginate(modified, options),
        affected_files,
        compute_time_ms: started.elapsed().as_millis() as u64,
    })
}

fn load_symbols(store: &Store, branch: &str) -> Result<Vec<Symbol>, AnalysisError> {
    let mut symbols = store.symbols_all(branch, u32::MAX as usize)?;
    symbols.retain(|s| !s.is_external);
    Ok(symbols)
}

fn edge_keys(edges: Vec<Edge>) -> FxHashSet<(String, String, EdgeKind)> {
    edges
        .into_iter()
        .map(|e| (e.source_id, e.target_id, e.kind))
        .collect()
}

fn paginate<T>(items: Vec<T>, options: &DiffOptions) -> Vec<T> {
    items
        .into_iter()
        .skip(options.offset)
        .take(options.limit)
        .collect()
}
