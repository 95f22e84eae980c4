use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The relationship a directed edge expresses between two symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Calls,
    Imports,
    Extends,
    Implements,
    Uses,
    Defines,
    Reexports,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Calls => "calls",
            EdgeKind::Imports => "imports",
            EdgeKind::Extends => "extends",
            EdgeKind::Implements => "implements",
            EdgeKind::Uses => "uses",
            EdgeKind::Defines => "defines",
            EdgeKind::Reexports => "reexports",
        }
    }

    pub fn parse(s: &str) -> Option<EdgeKind> {
        match s {
            "calls" => Some(EdgeKind::Calls),
            "imports" => Some(EdgeKind::Imports),
            "extends" => Some(EdgeKind::Extends),
            "implements" => Some(EdgeKind::Implements),
            "uses" => Some(EdgeKind::Uses),
            "defines" => Some(EdgeKind::Defines),
            "reexports" => Some(EdgeKind::Reexports),
            _ => None,
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an edge came from. The origin bounds how much the relationship can
/// be trusted: compiler-backed sources may claim full confidence, lexical
/// inference may not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeOrigin {
    Lsp,
    Scip,
    AstInference,
}

impl EdgeOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeOrigin::Lsp => "lsp",
            EdgeOrigin::Scip => "scip",
            EdgeOrigin::AstInference => "ast-inference",
        }
    }

    pub fn parse(s: &str) -> Option<EdgeOrigin> {
        match s {
            "lsp" => Some(EdgeOrigin::Lsp),
            "scip" => Some(EdgeOrigin::Scip),
            "ast-inference" => Some(EdgeOrigin::AstInference),
            _ => None,
        }
    }

    /// Upper bound on `confidence` for edges of this origin.
    pub fn max_confidence(&self) -> f64 {
        match self {
            EdgeOrigin::Lsp | EdgeOrigin::Scip => 1.0,
            EdgeOrigin::AstInference => 0.7,
        }
    }
}

impl std::fmt::Display for EdgeOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed, typed relationship between two symbols in one branch.
///
/// Endpoints are referenced by symbol id only; the store guarantees both
/// exist in `branch` (or are marked external) and removes the edge when
/// either endpoint's file is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub kind: EdgeKind,
    /// Trust in the relationship, clamped to `origin.max_confidence()`.
    pub confidence: f64,
    pub origin: EdgeOrigin,
    pub branch: String,
    /// Line span of the referencing site, when known.
    pub source_span: Option<(u32, u32)>,
    /// Line span of the referenced declaration, when known.
    pub target_span: Option<(u32, u32)>,
    pub updated_at: DateTime<Utc>,
    pub metadata: Option<serde_json::Value>,
}

impl Edge {
    /// Clamp `confidence` into `[0, origin.max_confidence()]`.
    pub fn clamped_confidence(origin: EdgeOrigin, confidence: f64) -> f64 {
        confidence.clamp(0.0, origin.max_confidence())
    }
}
