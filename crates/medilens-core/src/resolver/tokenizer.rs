//! Candidate extraction from noisy OCR text.
//!
//! Handles:
//! - Whitespace collapsing and character allow-listing
//! - Alphabetic runs of three or more letters ("Azee")
//! - Dose-qualified compounds ("Azee-500", "Dolo 650", "Thyronorm 25mcg")

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Tokens shorter than this (in characters) are discarded.
pub const MIN_TOKEN_LEN: usize = 3;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}0-9\s\-()/.,:]").expect("valid regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static ALPHA_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{L}{3,}").expect("valid regex"));

static COMPOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\p{L}+[- ]?[0-9]+(?:\.[0-9]+)?(?: ?(?i:mcg|mg|ml)\b)?").expect("valid regex")
});

/// Strip characters outside the allow-list and collapse whitespace.
pub fn clean_text(raw: &str) -> String {
    let stripped = DISALLOWED.replace_all(raw, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Split raw text into candidate medicine tokens.
///
/// Alphabetic runs come first, then compounds, each in order of appearance;
/// repeats keep their first position.
pub fn tokenize(raw_text: &str) -> Vec<String> {
    let cleaned = clean_text(raw_text);

    let words = ALPHA_RUN.find_iter(&cleaned).map(|m| m.as_str());
    let compounds = COMPOUND.find_iter(&cleaned).map(|m| m.as_str());

    let mut seen = HashSet::new();
    words
        .chain(compounds)
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .filter(|t| seen.insert(*t))
        .map(str::to_string)
        .collect()
}
