//! Character-safe text helpers shared by the tools and the agent loop.

/// Keep at most `max_chars` characters of `text`, appending `marker` when
/// anything was cut. Never splits a UTF-8 code point.
pub fn truncate_chars(text: &str, max_chars: usize, marker: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{marker}", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// First `max_chars` characters of `text`, without a marker.
pub fn prefix_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
