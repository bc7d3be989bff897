// Docstring detection and string-literal unquoting

use crate::parser::{NodeIndex, NodeRole, ParseTree};

/// Leading string-literal statement of a body, without quotes.
///
/// Comments before the statement are skipped. Returns `None` when the first
/// statement is anything other than an expression statement holding a
/// single string literal.
pub fn leading_docstring(tree: &ParseTree, body: NodeIndex) -> Option<String> {
    let first = tree
        .children(body)
        .iter()
        .copied()
        .find(|c| tree.role(*c) != NodeRole::Comment)?;

    if tree.role(first) != NodeRole::ExpressionStatement {
        return None;
    }

    let mut inner = tree
        .children(first)
        .iter()
        .copied()
        .filter(|c| tree.role(*c) != NodeRole::Comment);

    match (inner.next(), inner.next()) {
        (Some(only), None) if tree.role(only) == NodeRole::StringLiteral => {
            Some(strip_quotes(tree.text(only)).to_string())
        }
        _ => None,
    }
}

/// Remove string prefixes, raw-string hashes and quotes from a literal.
///
/// Text that does not look like a quoted literal is returned unchanged.
pub fn strip_quotes(text: &str) -> &str {
    let body = text.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let hashes = body.len() - body.trim_start_matches('#').len();
    let fence = &body[..hashes];
    let inner = match body[hashes..].strip_suffix(fence) {
        Some(inner) => inner,
        None => return text,
    };

    for quote in ["\"\"\"", "'''", "\"", "'", "`"] {
        if inner.len() >= quote.len() * 2 && inner.starts_with(quote) && inner.ends_with(quote) {
            return &inner[quote.len()..inner.len() - quote.len()];
        }
    }
    text
}

/// Whether a captured module path is written as a string literal
pub fn is_quoted(text: &str) -> bool {
    text.starts_with(['"', '\'', '`'])
}
