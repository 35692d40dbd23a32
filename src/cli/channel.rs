//! Channel command implementations

use colored::Colorize;
use log::debug;

use crate::catalog::{CatalogEntry, ChannelCatalog, Startup};
use crate::cli::args::GlobalOptions;
use crate::cli::{ChannelFilterArgs, CommandContext, LimitArgs, OutputFormat, progress};
use crate::client::SlackApi;
use crate::error::{Error, Result};
use crate::models::{ChannelDisplay, ResolveDisplay};
use crate::output::Formattable;
use crate::output::json::JsonOutput;
use crate::output::table::format_details;

/// Concurrent upstream lookups for `channel get`
const MAX_CONCURRENT_LOOKUPS: usize = 5;

/// Run the `channel list` command
pub async fn list(
    opts: &GlobalOptions,
    filters: &ChannelFilterArgs,
    limit: &LimitArgs,
    refresh: bool,
    wait: bool,
) -> Result<()> {
    let startup = if refresh {
        Startup::Fresh
    } else {
        Startup::Background
    };
    let ctx = CommandContext::new(opts, startup)?;

    // Nothing to show from a cold start, so wait for the first pass
    if refresh || wait || ctx.catalog.is_empty() {
        progress::wait_for_population(&ctx.catalog).await;
    }

    let filter = filters.to_filter();
    let entries = ctx.catalog.list_entries(|e| filter.matches(e));
    let total = entries.len();
    let rows: Vec<ChannelDisplay> = entries
        .iter()
        .take(limit.effective())
        .map(|e| ChannelDisplay::new(e, ctx.catalog.label(e)))
        .collect();

    let info = ctx.catalog.cache_info();
    match ctx.format {
        OutputFormat::Json => {
            println!("{}", JsonOutput::new(&rows).with_catalog(info).to_pretty()?);
        }
        format => {
            rows.print(format)?;
            if rows.len() < total {
                eprintln!(
                    "{}",
                    format!("Showing {} of {} channels (use --limit)", rows.len(), total).dimmed()
                );
            }
            if info.status.is_running() {
                eprintln!(
                    "{}",
                    format!("Catalog still loading ({}); results may be partial", info.status)
                        .dimmed()
                );
            }
        }
    }

    Ok(())
}

/// Run the `channel resolve` command
///
/// Answers from the catalog only; unknown names are echoed back unchanged.
pub fn resolve(opts: &GlobalOptions, names: &[String]) -> Result<()> {
    let ctx = CommandContext::new(opts, Startup::Offline)?;
    let rows = resolve_rows(&ctx.catalog, names);

    match ctx.format {
        OutputFormat::Pretty => {
            for row in &rows {
                let mark = if row.known {
                    "✓".green()
                } else {
                    "?".yellow()
                };
                println!("{} {} → {}", mark, row.input, row.id.bold());
            }
        }
        format => rows.print(format)?,
    }

    Ok(())
}

/// Resolve every name against the local catalog.
pub fn resolve_rows<C: SlackApi + 'static>(
    catalog: &ChannelCatalog<C>,
    names: &[String],
) -> Vec<ResolveDisplay> {
    names
        .iter()
        .map(|input| {
            let id = catalog.resolve_id(input);
            let label = catalog
                .get_entry(&id)
                .is_some()
                .then(|| catalog.entry_name(&id));
            ResolveDisplay::new(input, id, label)
        })
        .collect()
}

/// Run the `channel get` command
///
/// No population pass is started; local misses are looked up upstream by id. Every name is attempted;
/// the command fails if any of them could not be found.
pub async fn get(opts: &GlobalOptions, names: &[String]) -> Result<()> {
    let ctx = CommandContext::new(opts, Startup::OnDemand)?;
    let results = match names {
        [single] => vec![(single.clone(), ctx.catalog.resolve_or_fetch(single).await)],
        _ => {
            ctx.catalog
                .resolve_many(names, MAX_CONCURRENT_LOOKUPS)
                .await
        }
    };

    let mut found: Vec<CatalogEntry> = Vec::new();
    let mut failures = 0usize;
    for (input, result) in results {
        match result {
            Ok(entry) => found.push(entry),
            Err(e) => {
                failures += 1;
                debug!("Lookup of '{}' failed: {:?}", input, e);
                eprintln!("{} {}: {}", "✗".red(), input, e);
            }
        }
    }

    match ctx.format {
        OutputFormat::Pretty => {
            for entry in &found {
                println!("{}", format_details(&detail_pairs(&ctx.catalog, entry)));
            }
        }
        format => {
            let rows: Vec<ChannelDisplay> = found
                .iter()
                .map(|e| ChannelDisplay::new(e, ctx.catalog.label(e)))
                .collect();
            rows.print(format)?;
        }
    }

    if failures > 0 {
        return Err(Error::Other(format!(
            "{} of {} lookups failed",
            failures,
            names.len()
        )));
    }
    Ok(())
}

/// Label/value rows for the detail view of one entry.
pub fn detail_pairs<C: SlackApi + 'static>(
    catalog: &ChannelCatalog<C>,
    entry: &CatalogEntry,
) -> Vec<(&'static str, String)> {
    let yes_no = |b: bool| (if b { "yes" } else { "no" }).to_string();

    let mut pairs = vec![
        ("ID", entry.id.clone()),
        ("Name", catalog.label(entry)),
        ("Type", entry.kind.to_string()),
        ("Member", yes_no(entry.is_member)),
        ("Archived", yes_no(entry.is_archived)),
    ];
    if let Some(count) = entry.metadata.member_count {
        pairs.push(("Members", count.to_string()));
    }
    if let Some(ref topic) = entry.metadata.topic {
        pairs.push(("Topic", topic.clone()));
    }
    if let Some(ref purpose) = entry.metadata.purpose {
        pairs.push(("Purpose", purpose.clone()));
    }
    if let Some(ref user) = entry.user {
        pairs.push(("User", user.clone()));
    }
    pairs
}
