//! Reusable formatting utilities for CLI output
//!
//! Sizes, ages and waits shown by the status and cache commands.

use std::time::Duration;

use chrono::{DateTime, Local, Utc};

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Format a wait as `1m 30s` / `45s`, rounding up to whole seconds.
pub fn format_wait(wait: Duration) -> String {
    let mut secs = wait.as_secs();
    if wait.subsec_nanos() > 0 {
        secs += 1;
    }

    let mins = secs / 60;
    let rem = secs % 60;
    match (mins, rem) {
        (0, s) => format!("{}s", s),
        (m, 0) => format!("{}m", m),
        (m, s) => format!("{}m {}s", m, s),
    }
}

/// Format a past instant as local time plus a relative age.
///
/// # Example output
/// `2026-10-19 14:30 (5m ago)`
pub fn format_age(at: DateTime<Utc>) -> String {
    format_age_from(at, Utc::now())
}

fn format_age_from(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let local = at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
    let secs = now.signed_duration_since(at).num_seconds().max(0);

    let ago = if secs < 60 {
        "just now".to_string()
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3600)
    } else {
        format!("{}d ago", secs / 86_400)
    };

    format!("{} ({})", local, ago)
}
