//! Fallback chunker: bounded, overlapping runs of source lines for files
//! where no adapter produced symbols.

use sema_core::types::{RawSymbol, SymbolKind};

/// Split a file into Module-kind chunks of at most `max_lines` lines with
/// `overlap` lines of context carried between neighbors.
pub fn chunk_lines(source: &str, path: &str, max_lines: u32, overlap: u32) -> Vec<RawSymbol> {
    let lines: Vec<&str> = source.lines().collect();
    if lines.is_empty() {
        return Vec::new();
    }

    let max_lines = max_lines.max(1) as usize;
    let overlap = (overlap as usize).min(max_lines - 1);
    let step = max_lines - overlap;
    let stem = file_stem(path);

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut index = 0;

    while start < lines.len() {
        let end = (start + max_lines).min(lines.len());
        chunks.push(RawSymbol {
            name: format!("{stem}#{index}"),
            qualified_name: format!("{path}#{index}"),
            kind: SymbolKind::Module,
            start_line: (start + 1) as u32,
            end_line: end as u32,
            content: lines[start..end].join("\n"),
            signature: None,
            docstring: None,
        });
        if end == lines.len() {
            break;
        }
        start += step;
        index += 1;
    }

    chunks
}

fn file_stem(path: &str) -> &str {
    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
    base.split_once('.').map(|(stem, _)| stem).unwrap_or(base)
}
