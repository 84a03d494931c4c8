//! Title normalization
//!
//! Reduces a free-text title to the form every comparison runs on:
//! accents removed, lower-case, no parentheticals, `&` spelled out,
//! only `[a-z0-9 ]` with single spaces.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref PARENTHETICAL: Regex = Regex::new(r"\([^)]*\)").unwrap();
}

/// Canonicalize a title for matching.
///
/// `"Amélie (2001)"` → `"amelie"`, `"Fast & Furious"` → `"fast and furious"`.
/// Empty input yields an empty string.
pub fn normalize_title(title: &str) -> String {
    if title.is_empty() {
        return String::new();
    }

    let stripped: String = title.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let lowered = stripped.to_lowercase();
    let without_parens = PARENTHETICAL.replace_all(&lowered, "");
    let spelled = without_parens.replace('&', "and");

    let kept: String = spelled
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .collect();

    collapse_whitespace(&kept)
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
