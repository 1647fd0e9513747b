use std::collections::HashSet;

use unicode_segmentation::UnicodeSegmentation;

/// Split `text` into trimmed, non-empty sentences (UAX #29 boundaries).
///
/// Line breaks are ignored when finding boundaries; the returned slices still
/// borrow the original text verbatim.
pub fn split_sentences(text: &str) -> Vec<&str> {
    // Same byte length as `text`: only single-byte chars are replaced.
    let flattened: String = text.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }).collect();
    flattened
        .split_sentence_bound_indices()
        .map(|(start, s)| text[start..start + s.len()].trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Distinct lowercase whitespace-separated words.
pub fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Number of distinct words of `sentence` that appear in `keywords`.
pub fn overlap_score(sentence: &str, keywords: &HashSet<String>) -> usize {
    word_set(sentence).intersection(keywords).count()
}
