//! Go adapter. func/type/const/var declarations and import blocks.

use once_cell::sync::Lazy;
use regex::Regex;
use sema_core::errors::ExtractError;
use sema_core::traits::LanguageAdapter;
use sema_core::types::{EdgeKind, EdgeOrigin, Extraction, RawEdge, SymbolKind};

use crate::block::{brace_block_end, docstring_above};

use super::{line_signature, make_symbol};

static FUNC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^func\s+([A-Za-z_][\w]*)\s*\(").expect("static regex"));
static METHOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^func\s+\(\s*\w+\s+\*?([A-Za-z_][\w]*)\s*\)\s+([A-Za-z_][\w]*)\s*\(")
        .expect("static regex")
});
static TYPE_STRUCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^type\s+([A-Za-z_][\w]*)\s+struct\b").expect("static regex"));
static TYPE_INTERFACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^type\s+([A-Za-z_][\w]*)\s+interface\b").expect("static regex"));
static TYPE_ALIAS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^type\s+([A-Za-z_][\w]*)\s+").expect("static regex"));
static CONST_VAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:const|var)\s+([A-Za-z_][\w]*)\s").expect("static regex"));
static IMPORT_SINGLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^import\s+(?:\w+\s+)?"([^"]+)""#).expect("static regex"));
static IMPORT_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(?:\w+\s+)?"([^"]+)"$"#).expect("static regex"));

pub struct GoAdapter;

impl Default for GoAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl GoAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageAdapter for GoAdapter {
    fn languages(&self) -> &[&str] {
        &["go"]
    }

    fn extensions(&self) -> &[&str] {
        &["go"]
    }

    fn extract(&self, source: &str, path: &str) -> Result<Extraction, ExtractError> {
        let lines: Vec<&str> = source.lines().collect();
        let mut out = Extraction::default();
        let mut i = 0;

        while i < lines.len() {
            let trimmed = lines[i].trim_start();

            if trimmed.starts_with("import (") {
                let end = brace_block_end_paren(&lines, i).min(lines.len() - 1);
                for (offset, line) in lines.iter().take(end + 1).skip(i + 1).enumerate() {
                    if let Some(cap) = IMPORT_LINE_RE.captures(line.trim()) {
                        out.edges.push(import_edge(
                            cap.get(1).map(|m| m.as_str()).unwrap_or_default(),
                            i + 1 + offset,
                        ));
                    }
                }
                i = end + 1;
                continue;
            }
            if let Some(cap) = IMPORT_SINGLE_RE.captures(trimmed) {
                out.edges.push(import_edge(cap.get(1).map(|m| m.as_str()).unwrap_or_default(), i));
                i += 1;
                continue;
            }

            if let Some(cap) = METHOD_RE.captures(trimmed) {
                let receiver = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
                let name = cap.get(2).map(|m| m.as_str()).unwrap_or_default();
                let end = brace_block_end(&lines, i);
                out.symbols.push(make_symbol(
                    &lines,
                    name,
                    format!("{path}:{receiver}.{name}"),
                    SymbolKind::Method,
                    i,
                    end,
                    line_signature(trimmed),
                    docstring_above(&lines, i),
                ));
                i = end + 1;
                continue;
            }

            if let Some(cap) = FUNC_RE.captures(trimmed) {
                let name = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
                let end = brace_block_end(&lines, i);
                out.symbols.push(make_symbol(
                    &lines,
                    name,
                    format!("{path}:{name}"),
                    SymbolKind::Function,
                    i,
                    end,
                    line_signature(trimmed),
                    docstring_above(&lines, i),
                ));
                i = end + 1;
                continue;
            }

            let type_match = TYPE_STRUCT_RE
                .captures(trimmed)
                .map(|cap| (cap, SymbolKind::Class))
                .or_else(|| TYPE_INTERFACE_RE.captures(trimmed).map(|cap| (cap, SymbolKind::Interface)))
                .or_else(|| TYPE_ALIAS_RE.captures(trimmed).map(|cap| (cap, SymbolKind::TypeAlias)));

            if let Some((cap, kind)) = type_match {
                let name = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
                let end = brace_block_end(&lines, i);
                out.symbols.push(make_symbol(
                    &lines,
                    name,
                    format!("{path}:{name}"),
                    kind,
                    i,
                    end,
                    None,
                    docstring_above(&lines, i),
                ));
                i = end + 1;
                continue;
            }

            if let Some(cap) = CONST_VAR_RE.captures(trimmed) {
                let name = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
                let end = brace_block_end(&lines, i);
                out.symbols.push(make_symbol(
                    &lines,
                    name,
                    format!("{path}:{name}"),
                    SymbolKind::Variable,
                    i,
                    end,
                    None,
                    None,
                ));
                i = end + 1;
                continue;
            }

            i += 1;
        }

        Ok(out)
    }
}

/// `import (` blocks are paren-delimited; find the closing `)` line.
fn brace_block_end_paren(lines: &[&str], start: usize) -> usize {
    let mut depth: i32 = 0;
    for (offset, line) in lines[start..].iter().enumerate() {
        for ch in line.chars() {
            match ch {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
        }
        if depth <= 0 {
            return start + offset;
        }
    }
    lines.len().saturating_sub(1)
}

fn import_edge(target: &str, line: usize) -> RawEdge {
    RawEdge {
        source: None,
        target: target.to_string(),
        kind: EdgeKind::Imports,
        origin: EdgeOrigin::AstInference,
        confidence: 0.7,
        line: Some((line + 1) as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Extraction {
        GoAdapter::new().extract(source, "main.go").unwrap()
    }

    #[test]
    fn function_and_method() {
        let out = extract(
            "func Handle(w http.ResponseWriter) {\n}\n\nfunc (s *Server) Start() error {\n\treturn nil\n}\n",
        );
        let names: Vec<&str> = out.symbols.iter().map(|s| s.qualified_name.as_str()).collect();
        assert!(names.contains(&"main.go:Handle"));
        assert!(names.contains(&"main.go:Server.Start"));
        let method = out.symbols.iter().find(|s| s.name == "Start").unwrap();
        assert_eq!(method.kind, SymbolKind::Method);
    }

    #[test]
    fn struct_and_interface() {
        let out = extract(
            "type Server struct {\n\tport int\n}\n\ntype Handler interface {\n\tServe()\n}\n",
        );
        let kinds: Vec<SymbolKind> = out.symbols.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SymbolKind::Class, SymbolKind::Interface]);
    }

    #[test]
    fn import_block() {
        let out = extract("import (\n\t\"fmt\"\n\tlog \"github.com/sirupsen/logrus\"\n)\n");
        let targets: Vec<&str> = out.edges.iter().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["fmt", "github.com/sirupsen/logrus"]);
    }

    #[test]
    fn single_import() {
        let out = extract("import \"strings\"\n");
        assert_eq!(out.edges[0].target, "strings");
    }
}
