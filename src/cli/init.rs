//! Init command implementation

use colored::Colorize;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::client::{AuthApi, SlackClient};
use crate::config::{Config, DEFAULT_API_URL};
use crate::error::Result;

/// Run the init command
///
/// Prompts for a token and optional session cookie, checks them with
/// `auth.test`, and saves them to the config file. Existing catalog settings
/// in the file are kept.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}", "Welcome to slackop!".bold().green());
    println!("Let's set up your Slack credentials.\n");

    let token: String = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter your Slack token (xoxb-, xoxp- or xoxc-)")
        .interact()?;
    let token = token.trim().to_string();

    let cookie = if token.starts_with("xoxc-") {
        let cookie: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Session cookie value (the 'd' cookie, blank to skip)")
            .allow_empty(true)
            .interact_text()?;
        Some(cookie.trim().to_string()).filter(|c| !c.is_empty())
    } else {
        None
    };

    println!("\n{}", "Checking credentials...".cyan());
    let api_url = opts.api_url_ref().unwrap_or(DEFAULT_API_URL);
    let client = SlackClient::with_base_url(token.clone(), cookie.clone(), api_url)?;
    let identity = client.auth_test().await?;

    println!(
        "{} Authenticated as {} in {}",
        "✓".green(),
        identity.user.bold(),
        identity.team.bold()
    );

    let mut config = Config::load_at(opts.config_ref()).unwrap_or_default();
    config.token = Some(token);
    config.cookie = cookie;
    if let Some(url) = opts.api_url_ref() {
        config.api_url = Some(url.to_string());
    }
    config.save_at(opts.config_ref())?;

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Build the channel catalog", "slackop cache refresh".cyan());
    println!("  {} - Look up a channel id", "slackop channel resolve general".cyan());

    Ok(())
}
