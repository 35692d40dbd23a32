//! Status command implementation

use colored::Colorize;

use crate::catalog::CatalogStores;
use crate::cli::args::GlobalOptions;
use crate::cli::context::load_config;
use crate::config::Config;
use crate::error::Result;
use crate::output::formatters::format_age;

/// Show the visible part of a credential.
fn mask(secret: &str) -> String {
    let prefix: String = secret.chars().take(5).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}…", prefix)
    }
}

/// Run the status command to display configuration status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "slackop Configuration Status".bold());

    let config_path = Config::resolve_path(opts.config_ref())?;
    let config = match load_config(opts) {
        Ok(config) => config,
        Err(_) => {
            println!("{} Configuration not found", "✗".red());
            println!();
            println!(
                "Run {} to create a configuration file.",
                "slackop init".cyan()
            );
            println!();
            return Ok(());
        }
    };

    if config_path.exists() {
        println!("Config file: {}", config_path.display().to_string().cyan());
    } else {
        println!(
            "Config file: {} {}",
            config_path.display(),
            "(not found, using flags/environment)".dimmed()
        );
    }
    println!();

    match config.token.as_deref() {
        Some(token) if !token.trim().is_empty() => {
            println!("{} Token configured ({})", "✓".green(), mask(token));
        }
        _ => {
            println!("{} Token not configured", "✗".red());
            println!("  → Run 'slackop init' or set SLACKOP_TOKEN");
        }
    }

    if config.cookie.is_some() {
        println!("{} Session cookie configured", "✓".green());
    } else {
        println!("{} No session cookie", "○".dimmed());
    }

    if config.api_url.is_some() {
        println!("{} Custom API URL: {}", "○".dimmed(), config.api_url().cyan());
    }

    let dir = config.cache_dir()?;
    let stores = CatalogStores::in_dir(&dir);
    match stores.channels.info() {
        Ok(info) => println!(
            "{} Channel snapshot: {} entries, saved {}",
            "✓".green(),
            info.entry_count,
            format_age(info.saved_at)
        ),
        Err(_) => {
            println!("{} No channel snapshot", "○".dimmed());
            println!("  → Run 'slackop cache refresh' to build one");
        }
    }
    println!("  Cache directory: {}", dir.display().to_string().dimmed());
    println!();

    Ok(())
}
