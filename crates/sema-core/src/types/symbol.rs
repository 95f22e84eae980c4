use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of source declaration a symbol represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Interface,
    TypeAlias,
    Enum,
    Variable,
    Module,
}

impl SymbolKind {
    /// Stable lowercase name used in SQL rows and query filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::TypeAlias => "type_alias",
            SymbolKind::Enum => "enum",
            SymbolKind::Variable => "variable",
            SymbolKind::Module => "module",
        }
    }

    /// Parse a stored kind string. Unknown strings map to `None`.
    pub fn parse(s: &str) -> Option<SymbolKind> {
        match s {
            "function" => Some(SymbolKind::Function),
            "method" => Some(SymbolKind::Method),
            "class" => Some(SymbolKind::Class),
            "interface" => Some(SymbolKind::Interface),
            "type_alias" => Some(SymbolKind::TypeAlias),
            "enum" => Some(SymbolKind::Enum),
            "variable" => Some(SymbolKind::Variable),
            "module" => Some(SymbolKind::Module),
            _ => None,
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, addressable piece of source.
///
/// Identity is content-derived: `id = hex16(blake3(qualified_name, signature,
/// language))`, so the same declaration produces the same id on every branch.
/// Rows are partitioned by `branch`; `(id, branch)` is the primary key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    /// 16-hex content-derived identifier.
    pub id: String,
    pub name: String,
    /// `file_path:name`, with nested scopes joined by `.`.
    pub qualified_name: String,
    pub kind: SymbolKind,
    pub language: String,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    /// Verbatim source text of the declaration.
    pub content: String,
    pub signature: Option<String>,
    pub docstring: Option<String>,
    /// 16-hex blake3 of `content`.
    pub content_hash: String,
    /// True for symbols referenced by edges but not defined in the workspace.
    pub is_external: bool,
    pub branch: String,
    pub embedding_model_id: Option<String>,
    pub updated_at: DateTime<Utc>,
    /// Monotonically increasing per-store revision stamp.
    pub revision_id: i64,
}

impl Symbol {
    /// Whether this symbol would pass the given kind filter.
    pub fn matches_kinds(&self, kinds: &[SymbolKind]) -> bool {
        kinds.is_empty() || kinds.contains(&self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            SymbolKind::Function,
            SymbolKind::Method,
            SymbolKind::Class,
            SymbolKind::Interface,
            SymbolKind::TypeAlias,
            SymbolKind::Enum,
            SymbolKind::Variable,
            SymbolKind::Module,
        ] {
            assert_eq!(SymbolKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn unknown_kind_is_none() {
        assert_eq!(SymbolKind::parse("macro"), None);
    }

    #[test]
    fn empty_kind_filter_matches_all() {
        let sym = Symbol {
            id: "a".into(),
            name: "f".into(),
            qualified_name: "x.ts:f".into(),
            kind: SymbolKind::Function,
            language: "typescript".into(),
            file_path: "x.ts".into(),
            start_line: 1,
            end_line: 2,
            content: String::new(),
            signature: None,
            docstring: None,
            content_hash: String::new(),
            is_external: false,
            branch: "main".into(),
            embedding_model_id: None,
            updated_at: Utc::now(),
            revision_id: 0,
        };
        assert!(sym.matches_kinds(&[]));
        assert!(sym.matches_kinds(&[SymbolKind::Function]));
        assert!(!sym.matches_kinds(&[SymbolKind::Class]));
    }
}
