//! Python adapter. Indentation-delimited blocks, `def`/`class` declarations,
//! lexical `import`/`from` scanning.

use once_cell::sync::Lazy;
use regex::Regex;
use sema_core::errors::ExtractError;
use sema_core::traits::LanguageAdapter;
use sema_core::types::{EdgeKind, EdgeOrigin, Extraction, RawEdge, SymbolKind};

use crate::block::{indent_block_end, indent_width, python_docstring};

use super::{line_signature, make_symbol};

static DEF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:async\s+)?def\s+([A-Za-z_][\w]*)").expect("static regex"));
static CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^class\s+([A-Za-z_][\w]*)").expect("static regex"));
static IMPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^import\s+([\w.]+)").expect("static regex"));
static FROM_IMPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^from\s+([\w.]+)\s+import\b").expect("static regex"));
static MODULE_VAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][A-Z0-9_]*)\s*(?::[^=]+)?=").expect("static regex"));

pub struct PythonAdapter;

impl Default for PythonAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PythonAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageAdapter for PythonAdapter {
    fn languages(&self) -> &[&str] {
        &["python"]
    }

    fn extensions(&self) -> &[&str] {
        &["py", "pyi"]
    }

    fn extract(&self, source: &str, path: &str) -> Result<Extraction, ExtractError> {
        let lines: Vec<&str> = source.lines().collect();
        let mut out = Extraction::default();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            let trimmed = line.trim_start();

            if indent_width(line) == 0 {
                if let Some(cap) = IMPORT_RE.captures(trimmed) {
                    out.edges.push(import_edge(cap.get(1).map(|m| m.as_str()).unwrap_or_default(), i));
                    i += 1;
                    continue;
                }
                if let Some(cap) = FROM_IMPORT_RE.captures(trimmed) {
                    out.edges.push(import_edge(cap.get(1).map(|m| m.as_str()).unwrap_or_default(), i));
                    i += 1;
                    continue;
                }
            }

            if let Some(cap) = CLASS_RE.captures(trimmed) {
                if indent_width(line) == 0 {
                    let name = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
                    let end = indent_block_end(&lines, i);
                    out.symbols.push(make_symbol(
                        &lines,
                        name,
                        format!("{path}:{name}"),
                        SymbolKind::Class,
                        i,
                        end,
                        None,
                        python_docstring(&lines, i, end),
                    ));
                    extract_methods(&lines, i, end, name, path, &mut out);
                    i = end + 1;
                    continue;
                }
            }

            if let Some(cap) = DEF_RE.captures(trimmed) {
                if indent_width(line) == 0 {
                    let name = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
                    let end = indent_block_end(&lines, i);
                    out.symbols.push(make_symbol(
                        &lines,
                        name,
                        format!("{path}:{name}"),
                        SymbolKind::Function,
                        i,
                        end,
                        line_signature(trimmed),
                        python_docstring(&lines, i, end),
                    ));
                    i = end + 1;
                    continue;
                }
            }

            // Module-level constants: UPPER_CASE assignments at zero indent.
            if indent_width(line) == 0 {
                if let Some(cap) = MODULE_VAR_RE.captures(trimmed) {
                    let name = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
                    out.symbols.push(make_symbol(
                        &lines,
                        name,
                        format!("{path}:{name}"),
                        SymbolKind::Variable,
                        i,
                        i,
                        None,
                        None,
                    ));
                }
            }

            i += 1;
        }

        Ok(out)
    }
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

/// Methods: `def` declarations indented inside a class block.
fn extract_methods(
    lines: &[&str],
    class_start: usize,
    class_end: usize,
    class_name: &str,
    path: &str,
    out: &mut Extraction,
) {
    let class_indent = indent_width(lines[class_start]);
    let mut i = class_start + 1;

    while i <= class_end.min(lines.len().saturating_sub(1)) {
        let line = lines[i];
        if line.trim().is_empty() || indent_width(line) <= class_indent {
            i += 1;
            continue;
        }
        if let Some(cap) = DEF_RE.captures(line.trim_start()) {
            let name = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
            let end = indent_block_end(lines, i).min(class_end);
            out.symbols.push(make_symbol(
                lines,
                name,
                format!("{path}:{class_name}.{name}"),
                SymbolKind::Method,
                i,
                end,
                line_signature(line.trim_start()),
                python_docstring(lines, i, end),
            ));
            i = end + 1;
            continue;
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Extraction {
        PythonAdapter::new().extract(source, "app.py").unwrap()
    }

    #[test]
    fn function_with_docstring() {
        let out = extract("def parse_config(path):\n    \"\"\"Load configuration.\"\"\"\n    return path\n");
        assert_eq!(out.symbols.len(), 1);
        let sym = &out.symbols[0];
        assert_eq!(sym.name, "parse_config");
        assert_eq!(sym.kind, SymbolKind::Function);
        assert_eq!(sym.qualified_name, "app.py:parse_config");
        assert_eq!((sym.start_line, sym.end_line), (1, 3));
        assert_eq!(sym.docstring.as_deref(), Some("Load configuration."));
        assert_eq!(sym.signature.as_deref(), Some("(path):"));
    }

    #[test]
    fn class_with_methods() {
        let out = extract(
            "class Server:\n    def __init__(self, port):\n        self.port = port\n\n    def start(self):\n        return self.port\n",
        );
        let names: Vec<&str> = out.symbols.iter().map(|s| s.qualified_name.as_str()).collect();
        assert!(names.contains(&"app.py:Server"));
        assert!(names.contains(&"app.py:Server.__init__"));
        assert!(names.contains(&"app.py:Server.start"));
    }

    #[test]
    fn nested_function_is_not_top_level() {
        let out = extract("def outer():\n    def inner():\n        pass\n    return inner\n");
        assert_eq!(out.symbols.len(), 1);
        assert_eq!(out.symbols[0].name, "outer");
    }

    #[test]
    fn imports_and_constants() {
        let out = extract("import os\nfrom pathlib import Path\n\nMAX_RETRIES = 3\n");
        let targets: Vec<&str> = out.edges.iter().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["os", "pathlib"]);
        assert_eq!(out.symbols.len(), 1);
        assert_eq!(out.symbols[0].name, "MAX_RETRIES");
        assert_eq!(out.symbols[0].kind, SymbolKind::Variable);
    }

    #[test]
    fn async_def_is_extracted() {
        let out = extract("async def fetch(url):\n    return url\n");
        assert_eq!(out.symbols[0].name, "fetch");
    }
}
