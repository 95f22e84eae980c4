//! Impact and branch-diff integration tests over an in-memory store.

use chrono::{Duration, Utc};
use sema_analysis::{analyze_impact, diff_branches, DiffOptions, ImpactConfidence, ImpactOptions, RiskLevel};
use sema_core::identity;
use sema_core::types::{Edge, EdgeKind, EdgeOrigin, Symbol, SymbolKind};
use sema_storage::Store;

fn make_symbol(name: &str, file: &str, branch: &str, content: &str) -> Symbol {
    let qualified_name = format!("{file}:{name}");
    Symbol {
        id: identity::symbol_id(&qualified_name, Some("()"), "typescript"),
        name: name.to_string(),
        qualified_name,
        kind: SymbolKind::Function,
        language: "typescript".to_string(),
        file_path: file.to_string(),
        start_line: 1,
        end_line: 5,
        content: content.to_string(),
        signature: Some("()".to_string()),
        docstring: None,
        content_hash: identity::content_hash(content),
        is_external: false,
        branch: branch.to_string(),
        embedding_model_id: None,
        updated_at: Utc::now(),
        revision_id: 1,
    }
}

fn call_edge(source: &Symbol, target: &Symbol, confidence: f64) -> Edge {
    Edge {
        id: identity::edge_id(&source.id, &target.id, EdgeKind::Calls, EdgeOrigin::Lsp),
        source_id: source.id.clone(),
        target_id: target.id.clone(),
        kind: EdgeKind::Calls,
        confidence,
        origin: EdgeOrigin::Lsp,
        branch: source.branch.clone(),
        source_span: None,
        target_span: None,
        updated_at: Utc::now(),
        metadata: None,
    }
}

// ── Impact ─────────────────────────────────────────────────────────────────

#[test]
fn twelve_transitive_callers_grade_high_risk() {
    let store = Store::open_in_memory().unwrap();
    let seed = make_symbol("parseConfig", "config.ts", "main", "fn parseConfig");
    store.upsert_symbol(&seed).unwrap();

    // 4 direct callers, each with 2 callers of their own: 12 transitive.
    let mut edges = Vec::new();
    for i in 0..4 {
        let direct = make_symbol(&format!("direct{i}"), "d.ts", "main", &format!("d{i}"));
        store.upsert_symbol(&direct).unwrap();
        edges.push(call_edge(&direct, &seed, 0.9));
        for j in 0..2 {
            let indirect =
                make_symbol(&format!("indirect{i}_{j}"), "i.ts", "main", &format!("i{i}{j}"));
            store.upsert_symbol(&indirect).unwrap();
            edges.push(call_edge(&indirect, &direct, 0.9));
        }
    }
    store.upsert_edges(&edges).unwrap();

    let report = analyze_impact(&store, &seed.id, "main", &ImpactOptions::default()).unwrap();
    assert_eq!(report.direct_dependents, 4);
    assert_eq!(report.transitive_dependents, 12);
    assert_eq!(report.risk, RiskLevel::High);
    assert_eq!(report.confidence, ImpactConfidence::High);

    // Every dependent carries its discovery path back to the seed.
    let depth2: Vec<_> = report.dependents.iter().filter(|d| d.depth == 2).collect();
    assert_eq!(depth2.len(), 8);
    assert!(depth2.iter().all(|d| d.path.len() == 3));
    assert!(depth2
        .iter()
        .all(|d| d.path[0] == "config.ts:parseConfig"));
}

#[test]
fn low_confidence_edges_are_ignored() {
    let store = Store::open_in_memory().unwrap();
    let seed = make_symbol("target", "t.ts", "main", "t");
    let weak = make_symbol("weakCaller", "w.ts", "main", "w");
    let strong = make_symbol("strongCaller", "s.ts", "main", "s");
    store.upsert_symbols(&[seed.clone(), weak.clone(), strong.clone()]).unwrap();
    store
        .upsert_edges(&[call_edge(&weak, &seed, 0.3), call_edge(&strong, &seed, 0.9)])
        .unwrap();

    let report = analyze_impact(&store, &seed.id, "main", &ImpactOptions::default()).unwrap();
    assert_eq!(report.direct_dependents, 1);
    assert_eq!(report.dependents[0].qualified_name, "s.ts:strongCaller");
    assert_eq!(report.risk, RiskLevel::Low);
}

#[test]
fn stale_symbols_degrade_confidence() {
    let store = Store::open_in_memory().unwrap();
    let seed = make_symbol("core", "c.ts", "main", "c");
    let mut caller = make_symbol("caller", "k.ts", "main", "k");
    let mut edge = call_edge(&caller, &seed, 0.9);
    // The caller was re-indexed after the edge was recorded.
    edge.updated_at = Utc::now() - Duration::hours(2);
    caller.updated_at = Utc::now();
    store.upsert_symbols(&[seed.clone(), caller]).unwrap();
    store.upsert_edges(&[edge]).unwrap();

    let report = analyze_impact(&store, &seed.id, "main", &ImpactOptions::default()).unwrap();
    assert_eq!(report.confidence, ImpactConfidence::Degraded);
}

#[test]
fn depth_cap_truncates_and_downgrades() {
    let store = Store::open_in_memory().unwrap();
    // Chain: c3 -> c2 -> c1 -> seed.
    let seed = make_symbol("seed", "s.ts", "main", "s");
    let c1 = make_symbol("c1", "1.ts", "main", "1");
    let c2 = make_symbol("c2", "2.ts", "main", "2");
    let c3 = make_symbol("c3", "3.ts", "main", "3");
    store
        .upsert_symbols(&[seed.clone(), c1.clone(), c2.clone(), c3.clone()])
        .unwrap();
    store
        .upsert_edges(&[
            call_edge(&c1, &seed, 0.9),
            call_edge(&c2, &c1, 0.9),
            call_edge(&c3, &c2, 0.9),
        ])
        .unwrap();

    let options = ImpactOptions {
        max_depth: 2,
        ..ImpactOptions::default()
    };
    let report = analyze_impact(&store, &seed.id, "main", &options).unwrap();
    assert_eq!(report.transitive_dependents, 2);
    assert_eq!(report.confidence, ImpactConfidence::Medium);
}

#[test]
fn cyclic_call_graphs_terminate() {
    let store = Store::open_in_memory().unwrap();
    let a = make_symbol("a", "a.ts", "main", "a");
    let b = make_symbol("b", "b.ts", "main", "b");
    store.upsert_symbols(&[a.clone(), b.clone()]).unwrap();
    // Mutual recursion: a calls b, b calls a.
    store
        .upsert_edges(&[call_edge(&a, &b, 0.9), call_edge(&b, &a, 0.9)])
        .unwrap();

    let report = analyze_impact(&store, &a.id, "main", &ImpactOptions::default()).unwrap();
    assert_eq!(report.transitive_dependents, 1);
}

#[test]
fn missing_symbol_is_an_error() {
    let store = Store::open_in_memory().unwrap();
    let result = analyze_impact(&store, "ffffffffffffffff", "main", &ImpactOptions::default());
    assert!(result.is_err());
}

// ── Branch diff ────────────────────────────────────────────────────────────

#[test]
fn diff_reports_added_modified_removed() {
    let store = Store::open_in_memory().unwrap();

    // main: sharedFunc (H1). feature: sharedFunc (H2) + newFunc.
    let shared_main = make_symbol("sharedFunc", "shared.ts", "main", "function sharedFunc() { return 1 }");
    let shared_feature =
        make_symbol("sharedFunc", "shared.ts", "feature", "function sharedFunc() { return 2 }");
    let new_feature = make_symbol("newFunc", "new.ts", "feature", "function newFunc() {}");
    store
        .upsert_symbols(&[shared_main, shared_feature, new_feature])
        .unwrap();

    let diff = diff_branches(&store, "feature", "main", &DiffOptions::default()).unwrap();
    assert_eq!(diff.summary.added, 1);
    assert_eq!(diff.summary.modified, 1);
    assert_eq!(diff.summary.removed, 0);
    assert_eq!(diff.added[0].qualified_name, "new.ts:newFunc");
    assert!(diff.modified[0].content_changed);
    assert!(!diff.modified[0].signature_changed);
    assert!(!diff.modified[0].location_changed);
    assert_eq!(diff.affected_files, vec!["new.ts", "shared.ts"]);
    assert_eq!(diff.summary.affected_files, 2);
}

#[test]
fn diff_sees_removed_symbols_from_the_target_side() {
    let store = Store::open_in_memory().unwrap();
    let old_only = make_symbol("legacy", "old.ts", "main", "legacy body");
    store.upsert_symbol(&old_only).unwrap();

    let diff = diff_branches(&store, "feature", "main", &DiffOptions::default()).unwrap();
    assert_eq!(diff.summary.added, 0);
    assert_eq!(diff.summary.removed, 1);
    assert_eq!(diff.removed[0].qualified_name, "old.ts:legacy");
}

#[test]
fn signature_and_location_changes_are_flagged() {
    let store = Store::open_in_memory().unwrap();
    let mut on_main = make_symbol("moved", "m.ts", "main", "v1");
    on_main.signature = Some("(a)".to_string());
    let mut on_feature = make_symbol("moved", "m.ts", "feature", "v2");
    on_feature.signature = Some("(a, b)".to_string());
    on_feature.start_line = 40;
    on_feature.end_line = 44;
    store.upsert_symbols(&[on_main, on_feature]).unwrap();

    let diff = diff_branches(&store, "feature", "main", &DiffOptions::default()).unwrap();
    assert_eq!(diff.summary.modified, 1);
    let change = &diff.modified[0];
    assert!(change.content_changed);
    assert!(change.signature_changed);
    assert!(change.location_changed);
}

#[test]
fn edge_diff_counts_by_endpoint_key() {
    let store = Store::open_in_memory().unwrap();
    let a_main = make_symbol("a", "a.ts", "main", "a");
    let b_main = make_symbol("b", "b.ts", "main", "b");
    let a_feat = make_symbol("a", "a.ts", "feature", "a");
    let b_feat = make_symbol("b", "b.ts", "feature", "b");
    let c_feat = make_symbol("c", "c.ts", "feature", "c");
    store
        .upsert_symbols(&[a_main.clone(), b_main.clone(), a_feat.clone(), b_feat.clone(), c_feat.clone()])
        .unwrap();
    // Shared edge a->b on both branches; feature adds a->c.
    store
        .upsert_edges(&[
            call_edge(&a_main, &b_main, 0.9),
            call_edge(&a_feat, &b_feat, 0.9),
            call_edge(&a_feat, &c_feat, 0.9),
        ])
        .unwrap();

    let diff = diff_branches(&store, "feature", "main", &DiffOptions::default()).unwrap();
    assert_eq!(diff.summary.edges_added, 1);
    assert_eq!(diff.summary.edges_removed, 0);
}

#[test]
fn pagination_windows_the_lists_but_not_the_summary() {
    let store = Store::open_in_memory().unwrap();
    for i in 0..10 {
        let sym = make_symbol(&format!("added{i}"), "n.ts", "feature", &format!("body{i}"));
        store.upsert_symbol(&sym).unwrap();
    }

    let options = DiffOptions { offset: 2, limit: 3 };
    let diff = diff_branches(&store, "feature", "main", &options).unwrap();
    assert_eq!(diff.summary.added, 10);
    assert_eq!(diff.added.len(), 3);
    assert_eq!(diff.added[0].qualified_name, "n.ts:added2");
}

#[test]
fn identical_branches_diff_empty() {
    let store = Store::open_in_memory().unwrap();
    for branch in ["main", "feature"] {
        let sym = make_symbol("same", "s.ts", branch, "identical body");
        store.upsert_symbol(&sym).unwrap();
    }
    let diff = diff_branches(&store, "feature", "main", &DiffOptions::default()).unwrap();
    assert_eq!(diff.summary, sema_analysis::DiffSummary::default());
}
