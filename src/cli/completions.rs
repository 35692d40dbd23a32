//! Dynamic shell completions for slackop
//!
//! Completes channel names from the local snapshot. Completion never
//! touches the network, and any failure yields no candidates rather than
//! an error in the user's shell.
//!
//! Shell support:
//! - Fish/Zsh: Full support with descriptions
//! - Bash: Values only (no description display)

use clap_complete::engine::{ArgValueCandidates, CompletionCandidate};

use crate::catalog::{CatalogEntry, SnapshotStore};
use crate::config::Config;
use crate::models::display::truncate_string;

/// Load channel entries from the configured snapshot directory.
fn snapshot_entries() -> Option<Vec<CatalogEntry>> {
    let config_path = std::env::var("SLACKOP_CONFIG").ok();
    let config = Config::load_at(config_path.as_deref()).unwrap_or_default();
    let dir = config.cache_dir().ok()?;
    SnapshotStore::channels(&dir).load::<CatalogEntry>().ok()
}

/// Build candidates from catalog entries.
///
/// Joined channels come first; direct messages have no name to complete.
pub fn candidates_from(mut entries: Vec<CatalogEntry>) -> Vec<CompletionCandidate> {
    entries.retain(|e| !e.kind.is_direct() && !e.name.is_empty() && !e.is_archived);
    entries.sort_by(|a, b| {
        b.is_member
            .cmp(&a.is_member)
            .then_with(|| a.name.cmp(&b.name))
    });

    entries
        .into_iter()
        .map(|entry| {
            let help = match entry.metadata.purpose.as_deref() {
                Some(purpose) if !purpose.is_empty() => {
                    format!("{} | {}", entry.kind, truncate_string(purpose, 40))
                }
                _ => entry.kind.to_string(),
            };
            CompletionCandidate::new(entry.name).help(Some(help.into()))
        })
        .collect()
}

/// Complete channel names from the snapshot.
///
/// Note: clap_complete handles prefix filtering - we return all candidates.
pub fn complete_channel_names() -> Vec<CompletionCandidate> {
    snapshot_entries().map(candidates_from).unwrap_or_default()
}

/// Create completion candidates for channel names.
pub fn channel_name_candidates() -> ArgValueCandidates {
    ArgValueCandidates::new(complete_channel_names)
}
