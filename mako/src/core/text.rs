//! Character-safe truncation for terminal previews and log snippets.

/// Operator-facing preview length for tool results.
pub const RESULT_PREVIEW_CHARS: usize = 600;

/// Snippet length for call-log entries.
pub const LOG_SNIPPET_CHARS: usize = 120;

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
