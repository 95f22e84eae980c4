use crate::errors::ExtractError;
use crate::types::{EdgeOrigin, RawEdge};

/// Optional external source of relationship edges (LSP, SCIP, ast-grep).
///
/// When present, the index manager consumes its output per file and tags the
/// resulting edges with `origin()`; those edges may claim full confidence,
/// unlike lexical inference.
pub trait RelationshipSource: Send + Sync {
    /// Edges for one file on one branch. Targets may be unresolved names.
    fn edges_for_file(&self, path: &str, branch: &str) -> Result<Vec<RawEdge>, ExtractError>;

    /// Origin tag applied to every edge this source produces.
    fn origin(&self) -> EdgeOrigin;
}
