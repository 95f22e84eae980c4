//! Block termination: where does a declaration end?
//!
//! Brace-delimited languages use balanced `{}`/`()` counting starting at the
//! declaration line. Indentation-delimited languages (Python) end at the
//! last line whose indent strictly exceeds the declaration's indent.

/// Find the 0-based line index where a brace-delimited block ends.
///
/// Balanced `{}`/`()` counting starting at the declaration: the block ends
/// on the line where brace depth returns to zero after having opened (with
/// no parens left open). Declarations that never open a brace (`type A = B;`,
/// `const x = 5`) end at the first line that terminates the statement: a
/// trailing `;`, or any line that does not end mid-expression.
pub fn brace_block_end(lines: &[&str], start: usize) -> usize {
    let mut braces: i32 = 0;
    let mut parens: i32 = 0;
    let mut brace_opened = false;

    for (offset, line) in lines[start..].iter().enumerate() {
        let idx = start + offset;
        for ch in strip_line_noise(line).chars() {
            match ch {
                '{' => {
                    braces += 1;
                    brace_opened = true;
                }
                '}' => braces -= 1,
                '(' => parens += 1,
                ')' => parens -= 1,
                _ => {}
            }
        }
        if brace_opened && braces <= 0 && parens <= 0 {
            return idx;
        }
        if !brace_opened && parens <= 0 {
            let trimmed = line.trim_end();
            if trimmed.ends_with(';') {
                return idx;
            }
            let next_opens_block = lines
                .get(idx + 1..)
                .and_then(|rest| rest.iter().find(|l| !l.trim().is_empty()))
                .map(|l| l.trim_start().starts_with('{'))
                .unwrap_or(false);
            if !ends_mid_expression(trimmed.trim_start()) && !next_opens_block {
                return idx;
            }
        }
    }
    lines.len().saturating_sub(1)
}

/// Whether a statement line ends in the middle of an expression and the
/// block therefore continues on the next line.
fn ends_mid_expression(trimmed: &str) -> bool {
    if trimmed.is_empty() || trimmed.ends_with("=>") {
        return true;
    }
    matches!(
        trimmed.chars().next_back(),
        Some(',' | '(' | '[' | '=' | '+' | '-' | '*' | '/' | ':' | '&' | '|' | '?' | '.' | '<')
    )
}

/// Find the 0-based line index where an indentation-delimited block ends:
/// the last line whose indent strictly exceeds the declaration's indent.
/// Blank lines inside the block do not terminate it.
pub fn indent_block_end(lines: &[&str], start: usize) -> usize {
    let decl_indent = indent_width(lines[start]);
    let mut last_in_block = start;

    for (offset, line) in lines[start + 1..].iter().enumerate() {
        let idx = start + 1 + offset;
        if line.trim().is_empty() {
            continue;
        }
        if indent_width(line) > decl_indent {
            last_in_block = idx;
        } else {
            break;
        }
    }
    last_in_block
}

/// Column width of leading whitespace; tabs count as 4.
pub fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for ch in line.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += 4,
            _ => break,
        }
    }
    width
}

/// Strip string literals and trailing line comments so braces inside them do
/// not skew the depth count. Heuristic, not a lexer: escapes inside strings
/// are honored, block comments are not tracked across lines.
fn strip_line_noise(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    let mut in_string: Option<char> = None;

    while let Some(ch) = chars.next() {
        match in_string {
            Some(quote) => {
                if ch == '\\' {
                    chars.next();
                } else if ch == quote {
                    in_string = None;
                }
            }
            None => match ch {
                '"' | '\'' | '`' => in_string = Some(ch),
                '/' if chars.peek() == Some(&'/') => break,
                '#' => break,
                _ => out.push(ch),
            },
        }
    }
    out
}

/// Collect the doc comment immediately above a declaration line: contiguous
/// `//`, `///`, `#`, `*`-continuation or `/** ... */` lines, stopped by the
/// first non-comment line.
pub fn docstring_above(lines: &[&str], decl: usize) -> Option<String> {
    let mut collected: Vec<&str> = Vec::new();
    let mut idx = decl;

    while idx > 0 {
        idx -= 1;
        let trimmed = lines[idx].trim();
        let is_comment = trimmed.starts_with("///")
            || trimmed.starts_with("//")
            || trimmed.starts_with('#')
            || trimmed.starts_with("/*")
            || trimmed.starts_with('*');
        if !is_comment {
            break;
        }
        collected.push(trimmed);
        if trimmed.starts_with("/*") {
            break;
        }
    }

    if collected.is_empty() {
        return None;
    }
    collected.reverse();

    let cleaned: Vec<String> = collected
        .iter()
        .filter(|line| !matches!(**line, "/**" | "/*" | "*/"))
        .map(|line| {
            line.trim_start_matches("///")
                .trim_start_matches("//")
                .trim_start_matches("/**")
                .trim_start_matches("/*")
                .trim_end_matches("*/")
                .trim_start_matches('*')
                .trim_start_matches('#')
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.join(" "))
    }
}

/// Python-style docstring: the `"""..."""` block directly inside the body.
pub fn python_docstring(lines: &[&str], decl: usize, end: usize) -> Option<String> {
    let body_start = decl + 1;
    if body_start > end || body_start >= lines.len() {
        return None;
    }
    let first = lines[body_start].trim();
    let quote = if first.starts_with("\"\"\"") {
        "\"\"\""
    } else if first.starts_with("'''") {
        "'''"
    } else {
        return None;
    };

    let inner = first.trim_start_matches(quote);
    if inner.contains(quote) {
        let text = inner.trim_end_matches(quote).trim();
        return (!text.is_empty()).then(|| text.to_string());
    }

    let mut parts = vec![inner.trim().to_string()];
    for line in lines.iter().take(end + 1).skip(body_start + 1) {
        let trimmed = line.trim();
        if let Some(stripped) = trimmed.strip_suffix(quote) {
            parts.push(stripped.trim().to_string());
            break;
        }
        parts.push(trimmed.to_string());
    }
    let text = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}
