//! Per-language lexical adapters.

pub mod go;
pub mod java;
pub mod python;
pub mod rust;
pub mod typescript;

pub use go::GoAdapter;
pub use java::JavaAdapter;
pub use python::PythonAdapter;
pub use rust::RustAdapter;
pub use typescript::TypeScriptAdapter;

use sema_core::types::{RawSymbol, SymbolKind};

/// Assemble a `RawSymbol` from a line range. `start`/`end` are 0-based and
/// inclusive; stored lines are 1-based.
pub(crate) fn make_symbol(
    lines: &[&str],
    name: &str,
    qualified_name: String,
    kind: SymbolKind,
    start: usize,
    end: usize,
    signature: Option<String>,
    docstring: Option<String>,
) -> RawSymbol {
    let end = end.min(lines.len().saturating_sub(1));
    RawSymbol {
        name: name.to_string(),
        qualified_name,
        kind,
        start_line: (start + 1) as u32,
        end_line: (end + 1) as u32,
        content: lines[start..=end].join("\n"),
        signature,
        docstring,
    }
}

/// Signature text from a declaration line: everything from the first `(`
/// through the end of the line, minus the body opener. Multi-line parameter
/// lists degrade to the visible first line.
pub(crate) fn line_signature(line: &str) -> Option<String> {
    let open = line.find('(')?;
    let mut sig = line[open..].trim_end().to_string();
    if let Some(brace) = sig.find('{') {
        sig.truncate(brace);
    }
    let sig = sig.trim_end().trim_end_matches("=>").trim_end().to_string();
    (!sig.is_empty()).then_some(sig)
}
