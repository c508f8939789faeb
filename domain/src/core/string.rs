//! String utilities for the domain layer.

/// Cut a string down to at most `max_chars` characters, appending an
/// ellipsis when anything was removed.
///
/// Counts characters rather than bytes so multi-byte text is never split
/// inside a code point. Prefers to cut at the last whitespace before the
/// limit so excerpts end on a word.
pub fn excerpt(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }

    let end = s
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len());
    let head = &s[..end];
    let cut = match head.rfind(char::is_whitespace) {
        Some(ws) if ws > end / 2 => &head[..ws],
        _ => head,
    };
    format!("{}…", cut.trim_end())
}

/// Normalise whitespace: collapse runs of whitespace into single spaces.
pub fn squash_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
