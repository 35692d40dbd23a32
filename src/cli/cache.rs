//! Cache management commands

use std::path::PathBuf;

use colored::Colorize;

use crate::catalog::{CatalogStores, PopulationStatus, SnapshotInfo, SnapshotStore, Startup};
use crate::cli::args::GlobalOptions;
use crate::cli::context::load_config;
use crate::cli::{CommandContext, OutputFormat, progress};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::formatters::{format_age, format_size};

/// Snapshot directory from config, without requiring a token.
fn cache_dir(opts: &GlobalOptions) -> Result<PathBuf> {
    let config = match load_config(opts) {
        Ok(config) => config,
        Err(Error::Config(crate::error::ConfigError::NotFound)) => Config::default(),
        Err(e) => return Err(e),
    };
    Ok(config.cache_dir()?)
}

fn snapshot_json(info: Option<&SnapshotInfo>) -> serde_json::Value {
    match info {
        Some(info) => serde_json::json!({
            "entries": info.entry_count,
            "saved_at": info.saved_at.to_rfc3339(),
            "size_bytes": info.size_bytes,
            "size_human": format_size(info.size_bytes),
        }),
        None => serde_json::Value::Null,
    }
}

fn print_snapshot_line(label: &str, store: &SnapshotStore, info: Option<&SnapshotInfo>) {
    match info {
        Some(info) => println!(
            "{:<15} {} entries, {}, saved {}",
            format!("{}:", label),
            info.entry_count,
            format_size(info.size_bytes),
            format_age(info.saved_at)
        ),
        None if store.exists() => println!(
            "{:<15} {}",
            format!("{}:", label),
            "unreadable (will be rebuilt)".yellow()
        ),
        None => println!("{:<15} {}", format!("{}:", label), "none".dimmed()),
    }
}

/// Show snapshot statistics
pub fn status(opts: &GlobalOptions) -> Result<()> {
    let dir = cache_dir(opts)?;
    let stores = CatalogStores::in_dir(&dir);
    let channels = stores.channels.info().ok();
    let users = stores.users.info().ok();

    match opts.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "path": dir.display().to_string(),
                "channels": snapshot_json(channels.as_ref()),
                "users": snapshot_json(users.as_ref()),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        _ => {
            println!("Cache Status");
            println!("────────────────────────────────────────");
            println!("{:<15} {}", "Location:", dir.display());
            print_snapshot_line("Channels", &stores.channels, channels.as_ref());
            print_snapshot_line("Users", &stores.users, users.as_ref());
        }
    }

    Ok(())
}

/// Delete both snapshots
pub fn clear(opts: &GlobalOptions) -> Result<()> {
    let stores = CatalogStores::in_dir(&cache_dir(opts)?);
    let channels = stores.channels.clear()?;
    let users = stores.users.clear()?;
    let removed = usize::from(channels) + usize::from(users);

    match opts.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "snapshots_removed": removed,
                "success": true,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        _ => {
            if removed > 0 {
                println!("Cleared {} snapshot file(s)", removed);
            } else {
                println!("Cache was already empty");
            }
        }
    }

    Ok(())
}

/// Print the snapshot directory
pub fn path(opts: &GlobalOptions) -> Result<()> {
    println!("{}", cache_dir(opts)?.display());
    Ok(())
}

/// Populate the catalog now and wait for the new snapshot
pub async fn refresh(opts: &GlobalOptions) -> Result<()> {
    if opts.offline {
        return Err(Error::Other(
            "cannot refresh the catalog with --offline".to_string(),
        ));
    }

    let ctx = CommandContext::new(opts, Startup::Background)?;
    let before = ctx.catalog.cache_info().last_refresh;
    let status = progress::wait_for_population(&ctx.catalog).await;
    let info = ctx.catalog.cache_info();
    // A completed full pass moves the refresh time forward
    let refreshed = status == PopulationStatus::Complete && info.last_refresh > before;

    match ctx.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        _ => {
            if refreshed {
                println!(
                    "{} Catalog refreshed: {} channels ({} joined), {} users",
                    "✓".green(),
                    info.entry_count,
                    info.member_count,
                    info.user_count
                );
            } else {
                println!(
                    "{} Catalog partially refreshed: {} channels (run with --debug for details)",
                    "⚠".yellow(),
                    info.entry_count
                );
            }
        }
    }

    Ok(())
}
