//! Answer normalization shared by generation and grading.
//!
//! Every blank stores `normalize_answer(original)` in the rendered page, and the
//! page grades user input with [`CLIENT_NORMALIZE_JS`]. The two must agree
//! character for character, so both are defined here and tested together:
//!
//! 1. lowercase (Unicode default case mapping)
//! 2. canonical decomposition (NFD)
//! 3. drop every combining mark (General_Category = Mark)
//! 4. keep only word characters (Alphabetic, Numeric, `_`)

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// JavaScript twin of [`normalize_answer`], embedded in every exercise page.
///
/// `\p{Alphabetic}` and `\p{N}` mirror `char::is_alphabetic` and
/// `char::is_numeric`; `\p{M}` mirrors `is_combining_mark`.
pub const CLIENT_NORMALIZE_JS: &str = r#"function normalizeText(text) {
    return text.toLowerCase()
        .normalize('NFD')
        .replace(/\p{M}/gu, '')
        .replace(/[^\p{Alphabetic}\p{N}_]/gu, '');
}"#;

/// Word character in the Unicode sense: letters, digits and underscore
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Normalize a word or a typed answer into its grading key
pub fn normalize_answer(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .filter(|ch| is_word_char(*ch))
        .collect()
}

/// Check a typed answer against a stored key
pub fn is_correct(typed: &str, normalized_answer: &str) -> bool {
    normalize_answer(typed) == normalized_answer
}
