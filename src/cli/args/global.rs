//! Global CLI options shared across all commands
//!
//! Consolidates the global flags into one struct so handlers take a single
//! argument instead of a growing parameter list.

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// For most options, the precedence is: CLI flag > environment variable > config file > default.
/// This struct captures the CLI/env layer; config file values are merged in
/// `CommandContext`.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format (pretty, table, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.slackop/config.yaml)
    pub config: Option<String>,

    /// Token override (bypasses config file)
    pub token: Option<String>,

    /// Session cookie override
    pub cookie: Option<String>,

    /// Custom API base URL for testing
    pub api_url: Option<String>,

    /// Use the local snapshot only; no background population
    pub offline: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    ///
    /// This is the primary constructor, called once in main.rs after parsing.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            token: cli.token.clone(),
            cookie: cli.cookie.clone(),
            api_url: cli.api_url.clone(),
            offline: cli.offline,
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Get API URL override as `Option<&str>`.
    pub fn api_url_ref(&self) -> Option<&str> {
        self.api_url.as_deref()
    }
}
