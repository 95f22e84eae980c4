//! TypeScript / JavaScript adapter.
//!
//! Covers functions (declarations and arrow consts), classes with methods,
//! interfaces, type aliases, enums and top-level variables, plus lexical
//! import/export scanning.

use once_cell::sync::Lazy;
use regex::Regex;
use sema_core::errors::ExtractError;
use sema_core::traits::LanguageAdapter;
use sema_core::types::{EdgeKind, EdgeOrigin, Extraction, RawEdge, SymbolKind};

use crate::block::{brace_block_end, docstring_above, indent_width};

use super::{line_signature, make_symbol};

static FUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)")
        .expect("static regex")
});
static ARROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:\([^)]*\)?|[A-Za-z_$][\w$]*)\s*(?::[^=>{]+)?=>",
    )
    .expect("static regex")
});
static CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)")
        .expect("static regex")
});
static INTERFACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:export\s+)?interface\s+([A-Za-z_$][\w$]*)").expect("static regex")
});
static TYPE_ALIAS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:export\s+)?type\s+([A-Za-z_$][\w$]*)\s*(?:<[^>]*>)?\s*=").expect("static regex")
});
static ENUM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:export\s+)?(?:const\s+)?enum\s+([A-Za-z_$][\w$]*)").expect("static regex")
});
static VARIABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)").expect("static regex")
});
static METHOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:public\s+|private\s+|protected\s+|static\s+|readonly\s+|override\s+|async\s+|get\s+|set\s+)*([A-Za-z_$][\w$]*)\s*(?:<[^>]*>)?\s*\([^)]*\)?",
    )
    .expect("static regex")
});
static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:import|export)\s+(?:[^'"]*\s+from\s+)?['"]([^'"]+)['"]"#).expect("static regex")
});
static REQUIRE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"require\(\s*['"]([^'"]+)['"]\s*\)"#).expect("static regex")
});

const METHOD_KEYWORD_BLOCKLIST: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "new", "function", "typeof", "await",
    "else", "do", "try", "throw", "delete", "void", "yield", "in", "of", "case",
];

pub struct TypeScriptAdapter;

impl Default for TypeScriptAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeScriptAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageAdapter for TypeScriptAdapter {
    fn languages(&self) -> &[&str] {
        &["typescript", "javascript"]
    }

    fn extensions(&self) -> &[&str] {
        &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"]
    }

    fn extract(&self, source: &str, path: &str) -> Result<Extraction, ExtractError> {
        let lines: Vec<&str> = source.lines().collect();
        let mut out = Extraction::default();
        let mut i = 0;

        while i < lines.len() {
            let trimmed = lines[i].trim_start();

            if let Some(target) = scan_import(trimmed) {
                out.edges.push(import_edge(target, i));
                i += 1;
                continue;
            }

            if let Some(cap) = CLASS_RE.captures(trimmed) {
                let name = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
                let end = brace_block_end(&lines, i);
                out.symbols.push(make_symbol(
                    &lines,
                    name,
                    format!("{path}:{name}"),
                    SymbolKind::Class,
                    i,
                    end,
                    None,
                    docstring_above(&lines, i),
                ));
                extract_methods(&lines, i, end, name, path, &mut out);
                i = end + 1;
                continue;
            }

            if let Some(cap) = INTERFACE_RE.captures(trimmed) {
                let name = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
                let end = brace_block_end(&lines, i);
                out.symbols.push(make_symbol(
                    &lines,
                    name,
                    format!("{path}:{name}"),
                    SymbolKind::Interface,
                    i,
                    end,
                    None,
                    docstring_above(&lines, i),
                ));
                i = end + 1;
                continue;
            }

            if let Some(cap) = ENUM_RE.captures(trimmed) {
                let name = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
                let end = brace_block_end(&lines, i);
                out.symbols.push(make_symbol(
                    &lines,
                    name,
                    format!("{path}:{name}"),
                    SymbolKind::Enum,
                    i,
                    end,
                    None,
                    docstring_above(&lines, i),
                ));
                i = end + 1;
                continue;
            }

            if let Some(cap) = FUNCTION_RE.captures(trimmed) {
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

            if let Some(cap) = TYPE_ALIAS_RE.captures(trimmed) {
                let name = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
                let end = brace_block_end(&lines, i);
                out.symbols.push(make_symbol(
                    &lines,
                    name,
                    format!("{path}:{name}"),
                    SymbolKind::TypeAlias,
                    i,
                    end,
                    None,
                    docstring_above(&lines, i),
                ));
                i = end + 1;
                continue;
            }

            if let Some(cap) = ARROW_RE.captures(trimmed) {
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

            // Plain top-level variable, only at zero indent so locals inside
            // skipped blocks never surface.
            if indent_width(lines[i]) == 0 {
                if let Some(cap) = VARIABLE_RE.captures(trimmed) {
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
                        docstring_above(&lines, i),
                    ));
                    i = end + 1;
                    continue;
                }
            }

            i += 1;
        }

        Ok(out)
    }
}

fn scan_import(trimmed: &str) -> Option<&str> {
    if let Some(cap) = IMPORT_RE.captures(trimmed) {
        return cap.get(1).map(|m| m.as_str());
    }
    if let Some(cap) = REQUIRE_RE.captures(trimmed) {
        return cap.get(1).map(|m| m.as_str());
    }
    None
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

/// Scan a class body for method declarations one indent level in.
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

    while i < class_end.min(lines.len()) {
        let line = lines[i];
        let trimmed = line.trim_start();
        if trimmed.is_empty() || indent_width(line) <= class_indent {
            i += 1;
            continue;
        }

        let looks_like_method = METHOD_RE
            .captures(trimmed)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str())
            .filter(|name| !METHOD_KEYWORD_BLOCKLIST.contains(name));

        if let Some(name) = looks_like_method {
            // Only take declarations that open a body, skipping call sites.
            let opens_body = trimmed.contains('{')
                || lines
                    .get(i + 1)
                    .map(|next| next.trim_start().starts_with('{'))
                    .unwrap_or(false)
                || trimmed.trim_end().ends_with('(');
            if opens_body {
                let end = brace_block_end(lines, i).min(class_end);
                out.symbols.push(make_symbol(
                    lines,
                    name,
                    format!("{path}:{class_name}.{name}"),
                    SymbolKind::Method,
                    i,
                    end,
                    line_signature(trimmed),
                    docstring_above(lines, i),
                ));
                i = end + 1;
                continue;
            }
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Extraction {
        TypeScriptAdapter::new().extract(source, "test.ts").unwrap()
    }

    #[test]
    fn single_function_with_signature() {
        let out = extract("function calculateTax(amount: number): number { return amount * 0.1 }");
        assert_eq!(out.symbols.len(), 1);
        let sym = &out.symbols[0];
        assert_eq!(sym.name, "calculateTax");
        assert_eq!(sym.kind, SymbolKind::Function);
        assert_eq!(sym.qualified_name, "test.ts:calculateTax");
        assert_eq!(sym.start_line, 1);
        assert_eq!(sym.end_line, 1);
        assert_eq!(sym.signature.as_deref(), Some("(amount: number): number"));
    }

    #[test]
    fn class_with_methods_gets_nested_names() {
        let out = extract(
            "class LogManager {\n  private level = 0\n\n  constructor(level: number) {\n    this.level = level\n  }\n\n  log(message: string): void {\n    console.log(message)\n  }\n}",
        );
        let names: Vec<&str> = out.symbols.iter().map(|s| s.qualified_name.as_str()).collect();
        assert!(names.contains(&"test.ts:LogManager"));
        assert!(names.contains(&"test.ts:LogManager.constructor"));
        assert!(names.contains(&"test.ts:LogManager.log"));
        let class = out.symbols.iter().find(|s| s.name == "LogManager").unwrap();
        assert_eq!(class.kind, SymbolKind::Class);
        assert_eq!((class.start_line, class.end_line), (1, 11));
        let method = out.symbols.iter().find(|s| s.name == "log").unwrap();
        assert_eq!(method.kind, SymbolKind::Method);
    }

    #[test]
    fn arrow_const_is_a_function() {
        let out = extract("export const createLogger = (name: string) => {\n  return console\n}");
        assert_eq!(out.symbols.len(), 1);
        assert_eq!(out.symbols[0].name, "createLogger");
        assert_eq!(out.symbols[0].kind, SymbolKind::Function);
    }

    #[test]
    fn interface_type_enum_variable() {
        let out = extract(
            "export interface Config {\n  port: number\n}\ntype Alias = string;\nenum Color {\n  Red,\n}\nconst DEFAULT_PORT = 8080;",
        );
        let kinds: Vec<SymbolKind> = out.symbols.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SymbolKind::Interface,
                SymbolKind::TypeAlias,
                SymbolKind::Enum,
                SymbolKind::Variable,
            ]
        );
    }

    #[test]
    fn doc_comment_is_captured() {
        let out = extract("/** Computes sales tax. */\nfunction tax() { return 0 }");
        assert_eq!(out.symbols[0].docstring.as_deref(), Some("Computes sales tax."));
    }

    #[test]
    fn imports_become_edges() {
        let out = extract(
            "import { readFile } from 'fs'\nimport express from \"express\"\nconst lodash = require('lodash');\nexport { helper } from './helpers'\n",
        );
        let targets: Vec<&str> = out.edges.iter().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["fs", "express", "lodash", "./helpers"]);
        assert!(out
            .edges
            .iter()
            .all(|e| e.kind == EdgeKind::Imports && e.origin == EdgeOrigin::AstInference));
        assert!(out.edges.iter().all(|e| e.confidence <= 0.7));
    }

    #[test]
    fn locals_inside_functions_are_not_symbols() {
        let out = extract("function outer() {\n  const local = 1\n  return local\n}");
        assert_eq!(out.symbols.len(), 1);
        assert_eq!(out.symbols[0].name, "outer");
    }

    #[test]
    fn re_extraction_is_identical() {
        let source = "function stable() {\n  return 42\n}";
        assert_eq!(extract(source), extract(source));
    }

    #[test]
    fn empty_source_is_empty() {
        let out = extract("");
        assert!(out.is_empty());
    }
}
