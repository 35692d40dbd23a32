//! Common display utilities and helpers

/// Truncate string to max characters with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Render a flag as a check mark for tables
pub fn check(flag: bool) -> String {
    if flag { "✓".to_string() } else { String::new() }
}
