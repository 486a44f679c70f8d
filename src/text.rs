//! Plain-text helpers shared by the CLI tables and the dashboard.

/// Shortens `s` to at most `max_len` characters, ending in "..." when cut.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Horizontal bar scaled so `max` fills `width` cells.
pub fn bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return " ".repeat(width);
    }
    let filled = (count * width / max).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
