//! Canonical identity hashing.
//!
//! Symbol ids are derived from `(qualified_name, signature, language)` so
//! that re-extracting an unchanged declaration, on any branch, always
//! yields the same id. Content hashes are derived from the verbatim source
//! text. Both are the first 16 hex characters of a blake3 digest.

use crate::types::{EdgeKind, EdgeOrigin};

/// Number of hex characters kept from the digest (64 bits).
pub const ID_HEX_LEN: usize = 16;

/// Truncate a blake3 digest to its 16-hex prefix.
fn hex16(hasher: blake3::Hasher) -> String {
    let mut hex = hasher.finalize().to_hex().to_string();
    hex.truncate(ID_HEX_LEN);
    hex
}

/// Canonical symbol id: `hex16(blake3(qualified_name ∥ signature ∥ language))`.
///
/// Fields are NUL-separated so `("ab", "c")` and `("a", "bc")` cannot collide.
pub fn symbol_id(qualified_name: &str, signature: Option<&str>, language: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(qualified_name.as_bytes());
    hasher.update(b"\0");
    hasher.update(signature.unwrap_or("").as_bytes());
    hasher.update(b"\0");
    hasher.update(language.as_bytes());
    hex16(hasher)
}

/// Content hash of a symbol's verbatim source text.
pub fn content_hash(content: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(content.as_bytes());
    hex16(hasher)
}

/// Deterministic edge id over the resolved endpoints.
pub fn edge_id(source_id: &str, target_id: &str, kind: EdgeKind, origin: EdgeOrigin) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(source_id.as_bytes());
    hasher.update(b"\0");
    hasher.update(target_id.as_bytes());
    hasher.update(b"\0");
    hasher.update(kind.as_str().as_bytes());
    hasher.update(b"\0");
    hasher.update(origin.as_str().as_bytes());
    hex16(hasher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_id_is_stable() {
        let a = symbol_id("tax.ts:calculateTax", Some("(amount: number): number"), "typescript");
        let b = symbol_id("tax.ts:calculateTax", Some("(amount: number): number"), "typescript");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn signature_changes_the_id() {
        let a = symbol_id("x.ts:f", Some("(a: number)"), "typescript");
        let b = symbol_id("x.ts:f", Some("(a: string)"), "typescript");
        assert_ne!(a, b);
    }

    #[test]
    fn missing_signature_is_distinct_from_empty_fields_shifting() {
        // NUL separators prevent boundary ambiguity between fields.
        let a = symbol_id("ab", Some("c"), "go");
        let b = symbol_id("a", Some("bc"), "go");
        assert_ne!(a, b);
    }

    #[test]
    fn edge_id_depends_on_all_inputs() {
        let base = edge_id("s1", "t1", EdgeKind::Calls, EdgeOrigin::AstInference);
        assert_ne!(base, edge_id("s2", "t1", EdgeKind::Calls, EdgeOrigin::AstInference));
        assert_ne!(base, edge_id("s1", "t2", EdgeKind::Calls, EdgeOrigin::AstInference));
        assert_ne!(base, edge_id("s1", "t1", EdgeKind::Imports, EdgeOrigin::AstInference));
        assert_ne!(base, edge_id("s1", "t1", EdgeKind::Calls, EdgeOrigin::Lsp));
    }

    #[test]
    fn content_hash_tracks_content() {
        assert_eq!(content_hash("fn a() {}"), content_hash("fn a() {}"));
        assert_ne!(content_hash("fn a() {}"), content_hash("fn a() { 1 }"));
    }
}
