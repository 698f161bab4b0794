//! Word tokenizer shared by the scorer and the confidence model.

use once_cell::sync::Lazy;
use regex::Regex;

// Maximal runs of word characters plus apostrophes, so contractions like
// "couldn't" stay one token. Everything else (punctuation, emoji, whitespace)
// is a separator.
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[\w']+\b").expect("tokenizer regex"));

/// Split `text` into lower-cased word tokens, in input order.
///
/// Empty input yields an empty vector; there are no error conditions.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}
