/// Truncate a string to at most `max_len` bytes without splitting a character,
/// noting how much was cut.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &s[..end], s.len())
}

/// Remove a literal label such as `ID: ` from the front of a text node,
/// then trim. Text without the label is only trimmed.
pub fn strip_label<'a>(text: &'a str, label: &str) -> &'a str {
    let text = text.trim();
    let label = label.trim();
    if label.is_empty() {
        return text;
    }
    text.strip_prefix(label).unwrap_or(text).trim()
}

/// Collapse runs of whitespace into single spaces
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
