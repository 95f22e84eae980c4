//! Token-budget packing: format symbols into a context string, best first,
//! until the budget runs out.
//!
//! Token counts are estimated as ⌈chars/4⌉, the usual approximation for
//! code. When a block does not fit whole it is truncated to the remaining
//! budget, but only if at least `MIN_TRUNCATED_TOKENS` remain; after a
//! truncation nothing further is added.

use sema_core::constants::MIN_TRUNCATED_TOKENS;
use sema_core::types::Symbol;

/// Result of packing: the assembled context and its estimated token count.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedContext {
    pub context: String,
    pub token_count: usize,
    /// Symbols that were dropped because the budget was exhausted.
    pub skipped: usize,
}

/// Estimate tokens for a string: ⌈len/4⌉.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// Pack symbols in the given order into at most `max_tokens` tokens.
pub fn pack(symbols: &[Symbol], max_tokens: usize) -> PackedContext {
    let mut context = String::new();
    let mut used = 0usize;
    let mut skipped = 0usize;
    let mut budget_exhausted = false;

    for sym in symbols {
        if budget_exhausted {
            skipped += 1;
            continue;
        }

        let block = format_block(sym);
        let block_tokens = estimate_tokens(&block);
        let remaining = max_tokens.saturating_sub(used);

        if block_tokens <= remaining {
            context.push_str(&block);
            used += block_tokens;
            continue;
        }

        // Partial fit: truncate into the remaining budget when it is worth
        // anything, then stop taking symbols.
        if remaining >= MIN_TRUNCATED_TOKENS {
            let truncated = truncate_to_tokens(&block, remaining);
            used += estimate_tokens(&truncated);
            context.push_str(&truncated);
        } else {
            skipped += 1;
        }
        budget_exhausted = true;
    }

    PackedContext {
        context,
        token_count: used,
        skipped,
    }
}

/// One formatted context block: header, location, signature, doc, fenced
/// source.
fn format_block(sym: &Symbol) -> String {
    let mut block = String::new();
    block.push_str(&format!("### {} {}\n", sym.kind, sym.qualified_name));
    block.push_str(&format!(
        "{}:{}-{}\n",
        sym.file_path, sym.start_line, sym.end_line
    ));
    if let Some(signature) = &sym.signature {
        block.push_str(&format!("Signature: {signature}\n"));
    }
    if let Some(docstring) = &sym.docstring {
        block.push_str(&format!("Doc: {docstring}\n"));
    }
    block.push_str(&format!("```{}\n{}\n```\n\n", sym.language, sym.content));
    block
}

/// Cut a block to roughly `tokens` tokens on a char boundary, marking the
/// cut.
fn truncate_to_tokens(block: &str, tokens: usize) -> String {
    const MARKER: &str = "\n… [truncated]\n";
    let budget_chars = tokens.saturating_mul(4).saturating_sub(MARKER.len());
    let mut cut = budget_chars.min(block.len());
    while cut > 0 && !block.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut out = block[..cut].to_string();
    out.push_str(MARKER);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sema_core::types::SymbolKind;

    fn symbol_with_content(name: &str, content: &str) -> Symbol {
        Symbol {
            id: name.to_string(),
            name: name.to_string(),
            qualified_name: format!("f.ts:{name}"),
            kind: SymbolKind::Function,
            language: "typescript".to_string(),
            file_path: "f.ts".to_string(),
            start_line: 1,
            end_line: 10,
            content: content.to_string(),
            signature: Some("()".to_string()),
            docstring: None,
            content_hash: "0".repeat(16),
            is_external: false,
            branch: "main".to_string(),
            embedding_model_id: None,
            updated_at: Utc::now(),
            revision_id: 0,
        }
    }

    #[test]
    fn estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn everything_fits_in_a_large_budget() {
        let symbols = vec![
            symbol_with_content("a", "const a = 1"),
            symbol_with_content("b", "const b = 2"),
        ];
        let packed = pack(&symbols, 8_000);
        assert_eq!(packed.skipped, 0);
        assert!(packed.context.contains("f.ts:a"));
        assert!(packed.context.contains("f.ts:b"));
        assert!(packed.token_count > 0 && packed.token_count <= 8_000);
    }

    #[test]
    fn tiny_budget_truncates_the_first_block_and_skips_the_rest() {
        let big = "x".repeat(4_000);
        let symbols = vec![
            symbol_with_content("first", &big),
            symbol_with_content("second", &big),
        ];
        let packed = pack(&symbols, 200);
        assert!(packed.context.contains("[truncated]"));
        assert!(packed.token_count <= 200);
        assert_eq!(packed.skipped, 1);
        assert!(!packed.context.contains("f.ts:second"));
    }

    #[test]
    fn sub_minimum_remainder_skips_instead_of_truncating() {
        let big = "y".repeat(4_000);
        let symbols = vec![symbol_with_content("only", &big)];
        let packed = pack(&symbols, 50);
        assert_eq!(packed.context, "");
        assert_eq!(packed.token_count, 0);
        assert_eq!(packed.skipped, 1);
    }

    #[test]
    fn zero_budget_packs_nothing() {
        let symbols = vec![symbol_with_content("a", "body")];
        let packed = pack(&symbols, 0);
        assert_eq!(packed.token_count, 0);
        assert_eq!(packed.skipped, 1);
    }
}
