use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_'-]*|\p{N}+").expect("valid regex");
    static ref ANALYZED: Regex = Regex::new(r"(?u)\b\w\w+\b").expect("valid regex");
}

/// Split text into word tokens, keeping case and order.
pub fn words(text: &str) -> Vec<&str> {
    WORD.find_iter(text).map(|m| m.as_str()).collect()
}

/// Vectorizer-style term analysis: NFKC, lowercase, tokens of two or more word characters.
pub fn analyze(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    ANALYZED.find_iter(&normalized).map(|m| m.as_str().to_string()).collect()
}
