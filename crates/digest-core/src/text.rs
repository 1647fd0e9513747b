//! Small string normalizers used on titles and snippets.

use crate::types::UNTITLED_SECTION;

pub const ELLIPSIS: &str = "...";

/// Trim a title and drop any trailing run of `: , ; . -` and whitespace.
pub fn clean_title(title: &str) -> String {
    let cleaned = title
        .trim()
        .trim_end_matches(|c: char| matches!(c, ':' | ',' | ';' | '.' | '-') || c.is_whitespace());
    if cleaned.is_empty() {
        UNTITLED_SECTION.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Cap `text` at `max_chars` characters, ending in `...` when cut.
///
/// The result never exceeds `max_chars` characters (ellipsis included).
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let head: String = text.chars().take(keep).collect();
    format!("{}{}", head.trim_end(), ELLIPSIS)
}

/// Collapse newline runs to one `\n` and space/tab runs to one space, then cap.
pub fn clean_refined_text(text: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for c in text.chars() {
        let c = if c == '\t' { ' ' } else { c };
        match (prev, c) {
            (Some('\n'), '\n') | (Some(' '), ' ') => continue,
            _ => {}
        }
        out.push(c);
        prev = Some(c);
    }
    truncate_with_ellipsis(&out, max_chars)
}
