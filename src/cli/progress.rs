//! Spinner shown while the catalog populates

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::catalog::{ChannelCatalog, PopulationStatus};
use crate::client::SlackApi;

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Wait for the running population pass, reporting progress on stderr.
///
/// Returns immediately with the current status if nothing is running.
pub async fn wait_for_population<C: SlackApi + 'static>(
    catalog: &ChannelCatalog<C>,
) -> PopulationStatus {
    if !catalog.status().is_running() {
        return catalog.status();
    }

    let pb = spinner("Loading channels");
    let done = catalog.wait_for_population();
    tokio::pin!(done);
    let mut tick = tokio::time::interval(Duration::from_millis(250));

    let status = loop {
        tokio::select! {
            status = &mut done => break status,
            _ = tick.tick() => {
                pb.set_message(format!(
                    "Loading channels: {} ({} so far)",
                    catalog.status(),
                    catalog.cache_info().entry_count
                ));
            }
        }
    };

    pb.finish_and_clear();
    status
}
