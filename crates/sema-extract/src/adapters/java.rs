//! Java adapter. Classes, interfaces, enums, methods, imports.

use once_cell::sync::Lazy;
use regex::Regex;
use sema_core::errors::ExtractError;
use sema_core::traits::LanguageAdapter;
use sema_core::types::{EdgeKind, EdgeOrigin, Extraction, RawEdge, SymbolKind};

use crate::block::{brace_block_end, docstring_above, indent_width};

use super::{line_signature, make_symbol};

static CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:public\s+|protected\s+|private\s+|abstract\s+|final\s+|static\s+)*class\s+([A-Za-z_$][\w$]*)")
        .expect("static regex")
});
static INTERFACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:public\s+|protected\s+|private\s+)*interface\s+([A-Za-z_$][\w$]*)")
        .expect("static regex")
});
static ENUM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:public\s+|protected\s+|private\s+)*enum\s+([A-Za-z_$][\w$]*)").expect("static regex")
});
static METHOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:public\s+|protected\s+|private\s+|static\s+|final\s+|abstract\s+|synchronized\s+)*(?:<[^>]+>\s+)?[\w$<>\[\],.\s]+\s+([A-Za-z_$][\w$]*)\s*\([^)]*\)?",
    )
    .expect("static regex")
});
static IMPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^import\s+(?:static\s+)?([\w.]+(?:\.\*)?)\s*;").expect("static regex"));

const METHOD_KEYWORD_BLOCKLIST: &[&str] =
    &["if", "for", "while", "switch", "catch", "return", "new", "else", "do", "try", "throw"];

pub struct JavaAdapter;

impl Default for JavaAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl JavaAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageAdapter for JavaAdapter {
    fn languages(&self) -> &[&str] {
        &["java"]
    }

    fn extensions(&self) -> &[&str] {
        &["java"]
    }

    fn extract(&self, source: &str, path: &str) -> Result<Extraction, ExtractError> {
        let lines: Vec<&str> = source.lines().collect();
        let mut out = Extraction::default();
        let mut i = 0;

        while i < lines.len() {
            let trimmed = lines[i].trim_start();

            if let Some(cap) = IMPORT_RE.captures(trimmed) {
                out.edges.push(RawEdge {
                    source: None,
                    target: cap.get(1).map(|m| m.as_str()).unwrap_or_default().to_string(),
                    kind: EdgeKind::Imports,
                    origin: EdgeOrigin::AstInference,
                    confidence: 0.7,
                    line: Some((i + 1) as u32),
                });
                i += 1;
                continue;
            }

            let container = CLASS_RE
                .captures(trimmed)
                .map(|cap| (cap, SymbolKind::Class))
                .or_else(|| INTERFACE_RE.captures(trimmed).map(|cap| (cap, SymbolKind::Interface)))
                .or_else(|| ENUM_RE.captures(trimmed).map(|cap| (cap, SymbolKind::Enum)));

            if let Some((cap, kind)) = container {
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
                if kind == SymbolKind::Class {
                    extract_methods(&lines, i, end, name, path, &mut out);
                }
                i = end + 1;
                continue;
            }

            i += 1;
        }

        Ok(out)
    }
}

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

        let name = METHOD_RE
            .captures(trimmed)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str())
            .filter(|name| !METHOD_KEYWORD_BLOCKLIST.contains(name));

        if let Some(name) = name {
            let opens_body = trimmed.contains('{')
                || lines
                    .get(i + 1)
                    .map(|next| next.trim_start().starts_with('{'))
                    .unwrap_or(false);
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
        JavaAdapter::new().extract(source, "App.java").unwrap()
    }

    #[test]
    fn class_with_method() {
        let out = extract(
            "public class App {\n    public static void main(String[] args) {\n        run();\n    }\n}\n",
        );
        let names: Vec<&str> = out.symbols.iter().map(|s| s.qualified_name.as_str()).collect();
        assert!(names.contains(&"App.java:App"));
        assert!(names.contains(&"App.java:App.main"));
    }

    #[test]
    fn interface_and_enum() {
        let out = extract("interface Runner {\n    void run();\n}\nenum State { ON, OFF }\n");
        let kinds: Vec<SymbolKind> = out.symbols.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SymbolKind::Interface, SymbolKind::Enum]);
    }

    #[test]
    fn imports() {
        let out = extract("import java.util.List;\nimport static java.lang.Math.max;\n");
        let targets: Vec<&str> = out.edges.iter().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["java.util.List", "java.lang.Math.max"]);
    }
}
