//! Rust adapter. fn/struct/enum/trait/type/const/static declarations plus
//! `use` scanning. `impl` blocks contribute methods under `Type.method`.

use once_cell::sync::Lazy;
use regex::Regex;
use sema_core::errors::ExtractError;
use sema_core::traits::LanguageAdapter;
use sema_core::types::{EdgeKind, EdgeOrigin, Extraction, RawEdge, SymbolKind};

use crate::block::{brace_block_end, docstring_above, indent_width};

use super::{line_signature, make_symbol};

static FN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+\S+\s+)?fn\s+([A-Za-z_][\w]*)")
        .expect("static regex")
});
static STRUCT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:pub(?:\([^)]*\))?\s+)?struct\s+([A-Za-z_][\w]*)").expect("static regex")
});
static ENUM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:pub(?:\([^)]*\))?\s+)?enum\s+([A-Za-z_][\w]*)").expect("static regex")
});
static TRAIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:pub(?:\([^)]*\))?\s+)?(?:unsafe\s+)?trait\s+([A-Za-z_][\w]*)").expect("static regex")
});
static TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:pub(?:\([^)]*\))?\s+)?type\s+([A-Za-z_][\w]*)").expect("static regex")
});
static CONST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:pub(?:\([^)]*\))?\s+)?(?:const|static)\s+([A-Za-z_][\w]*)\s*:").expect("static regex")
});
static IMPL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^impl(?:<[^>]*>)?\s+(?:[\w:]+\s+for\s+)?([A-Za-z_][\w]*)").expect("static regex")
});
static MOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:pub(?:\([^)]*\))?\s+)?mod\s+([A-Za-z_][\w]*)\s*\{").expect("static regex")
});
static USE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:pub\s+)?use\s+([\w:]+)").expect("static regex")
});

pub struct RustAdapter;

impl Default for RustAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl RustAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageAdapter for RustAdapter {
    fn languages(&self) -> &[&str] {
        &["rust"]
    }

    fn extensions(&self) -> &[&str] {
        &["rs"]
    }

    fn extract(&self, source: &str, path: &str) -> Result<Extraction, ExtractError> {
        let lines: Vec<&str> = source.lines().collect();
        let mut out = Extraction::default();
        let mut i = 0;

        while i < lines.len() {
            let trimmed = lines[i].trim_start();

            if let Some(cap) = USE_RE.captures(trimmed) {
                let target = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
                // Skip self-imports like `use super::*`.
                if !target.starts_with("self") && !target.starts_with("super") && !target.starts_with("crate") {
                    out.edges.push(RawEdge {
                        source: None,
                        target: target.to_string(),
                        kind: EdgeKind::Imports,
                        origin: EdgeOrigin::AstInference,
                        confidence: 0.7,
                        line: Some((i + 1) as u32),
                    });
                }
                i += 1;
                continue;
            }

            if let Some(cap) = IMPL_RE.captures(trimmed) {
                let type_name = cap.get(1).map(|m| m.as_str()).unwrap_or_default().to_string();
                let end = brace_block_end(&lines, i);
                extract_impl_methods(&lines, i, end, &type_name, path, &mut out);
                i = end + 1;
                continue;
            }

            let matched = [
                (&*STRUCT_RE, SymbolKind::Class),
                (&*ENUM_RE, SymbolKind::Enum),
                (&*TRAIT_RE, SymbolKind::Interface),
                (&*FN_RE, SymbolKind::Function),
                (&*TYPE_RE, SymbolKind::TypeAlias),
                (&*CONST_RE, SymbolKind::Variable),
                (&*MOD_RE, SymbolKind::Module),
            ]
            .iter()
            .find_map(|(re, kind)| {
                re.captures(trimmed)
                    .and_then(|cap| cap.get(1))
                    .map(|m| (m.as_str().to_string(), *kind))
            });

            if let Some((name, kind)) = matched {
                let end = brace_block_end(&lines, i);
                let signature = (kind == SymbolKind::Function)
                    .then(|| line_signature(trimmed))
                    .flatten();
                out.symbols.push(make_symbol(
                    &lines,
                    &name,
                    format!("{path}:{name}"),
                    kind,
                    i,
                    end,
                    signature,
                    docstring_above(&lines, i),
                ));
                i = end + 1;
                continue;
            }

            i += 1;
        }

        Ok(out)
    }
}

fn extract_impl_methods(
    lines: &[&str],
    impl_start: usize,
    impl_end: usize,
    type_name: &str,
    path: &str,
    out: &mut Extraction,
) {
    let impl_indent = indent_width(lines[impl_start]);
    let mut i = impl_start + 1;

    while i < impl_end.min(lines.len()) {
        let line = lines[i];
        if line.trim().is_empty() || indent_width(line) <= impl_indent {
            i += 1;
            continue;
        }
        if let Some(cap) = FN_RE.captures(line.trim_start()) {
            let name = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
            let end = brace_block_end(lines, i).min(impl_end);
            out.symbols.push(make_symbol(
                lines,
                name,
                format!("{path}:{type_name}.{name}"),
                SymbolKind::Method,
                i,
                end,
                line_signature(line.trim_start()),
                docstring_above(lines, i),
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
        RustAdapter::new().extract(source, "lib.rs").unwrap()
    }

    #[test]
    fn free_function() {
        let out = extract("pub fn parse(input: &str) -> u32 {\n    input.len() as u32\n}\n");
        assert_eq!(out.symbols.len(), 1);
        assert_eq!(out.symbols[0].name, "parse");
        assert_eq!(out.symbols[0].kind, SymbolKind::Function);
        assert_eq!(out.symbols[0].signature.as_deref(), Some("(input: &str) -> u32"));
    }

    #[test]
    fn struct_with_impl_methods() {
        let out = extract(
            "pub struct Server {\n    port: u16,\n}\n\nimpl Server {\n    pub fn new(port: u16) -> Self {\n        Self { port }\n    }\n}\n",
        );
        let names: Vec<&str> = out.symbols.iter().map(|s| s.qualified_name.as_str()).collect();
        assert!(names.contains(&"lib.rs:Server"));
        assert!(names.contains(&"lib.rs:Server.new"));
        let method = out.symbols.iter().find(|s| s.name == "new").unwrap();
        assert_eq!(method.kind, SymbolKind::Method);
    }

    #[test]
    fn trait_impl_methods_attach_to_the_type() {
        let out = extract(
            "impl Display for Token {\n    fn fmt(&self, f: &mut Formatter) -> Result {\n        Ok(())\n    }\n}\n",
        );
        assert_eq!(out.symbols.len(), 1);
        assert_eq!(out.symbols[0].qualified_name, "lib.rs:Token.fmt");
    }

    #[test]
    fn doc_comment_is_captured() {
        let out = extract("/// Parses a header line.\nfn parse_header() {}\n");
        assert_eq!(out.symbols[0].docstring.as_deref(), Some("Parses a header line."));
    }

    #[test]
    fn use_statements_become_import_edges() {
        let out = extract("use std::collections::HashMap;\nuse serde::Serialize;\nuse crate::util;\n");
        let targets: Vec<&str> = out.edges.iter().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["std::collections::HashMap", "serde::Serialize"]);
    }

    #[test]
    fn const_and_type_alias() {
        let out = extract("pub const MAX: usize = 10;\ntype Result2 = std::result::Result<u8, u8>;\n");
        let kinds: Vec<SymbolKind> = out.symbols.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SymbolKind::Variable, SymbolKind::TypeAlias]);
    }
}
