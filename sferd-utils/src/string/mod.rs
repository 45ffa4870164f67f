//! String helpers for diagram labels and identifiers

use regex::Regex;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

const ELLIPSIS: &str = "...";

/// Truncate `text` to at most `max_len` graphemes.
///
/// Text that has to be cut keeps `max_len - 3` graphemes followed by `...`,
/// so a 25 grapheme budget yields 22 characters of content plus the ellipsis.
/// Budgets of three or less cut without an ellipsis.
#[must_use]
pub fn safe_truncate(text: &str, max_len: usize) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= max_len {
        return text.to_string();
    }

    if max_len <= ELLIPSIS.len() {
        return graphemes[..max_len].concat();
    }

    let mut truncated = graphemes[..max_len - ELLIPSIS.len()].concat();
    truncated.push_str(ELLIPSIS);
    truncated
}

fn whitespace_regex() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

fn non_identifier_regex() -> &'static Regex {
    static NON_IDENT: OnceLock<Regex> = OnceLock::new();
    NON_IDENT.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").expect("static regex"))
}

/// Collapse runs of whitespace (including newlines) into single spaces and trim.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    whitespace_regex().replace_all(text, " ").trim().to_string()
}

/// Reduce `name` to `[A-Za-z0-9_]`, prefixing `_` when it would start with a digit.
#[must_use]
pub fn sanitize_identifier(name: &str) -> String {
    let mut ident = non_identifier_regex().replace_all(name, "_").into_owned();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}
