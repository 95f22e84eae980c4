use serde::{Deserialize, Serialize};

use super::edge::{EdgeKind, EdgeOrigin};
use super::symbol::SymbolKind;

/// A symbol as emitted by a language adapter, before canonical identity and
/// branch enrichment are applied by the index manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSymbol {
    pub name: String,
    pub qualified_name: String,
    pub kind: SymbolKind,
    pub start_line: u32,
    pub end_line: u32,
    pub content: String,
    pub signature: Option<String>,
    pub docstring: Option<String>,
}

/// A relationship as emitted by an adapter or an external relationship
/// source. Endpoints are named, not yet resolved to symbol ids; the index
/// manager resolves what it can and marks the rest external.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEdge {
    /// Qualified name of the referencing symbol, when the adapter knows it;
    /// otherwise the file-level module symbol is used.
    pub source: Option<String>,
    /// Referenced name as written at the use site.
    pub target: String,
    pub kind: EdgeKind,
    pub origin: EdgeOrigin,
    pub confidence: f64,
    pub line: Option<u32>,
}

/// The full output of extracting one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub symbols: Vec<RawSymbol>,
    pub edges: Vec<RawEdge>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && self.edges.is_empty()
    }
}
