//! Command execution context
//!
//! Loads config, applies flag overrides, builds the Slack client and opens
//! the channel catalog, so each command starts from one constructor call.

use std::sync::Arc;

use log::debug;

use crate::catalog::{CatalogStores, ChannelCatalog, Startup};
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::SlackClient;
use crate::config::{CatalogSettings, Config};
use crate::error::{ConfigError, Error, Result};

/// Context for command execution containing the catalog and runtime options.
pub struct CommandContext {
    /// Channel catalog, already warm-started
    pub catalog: ChannelCatalog<SlackClient>,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Create a context and open the catalog.
    ///
    /// `--offline` always wins over the requested startup mode. Offline
    /// commands do not need a token; everything else does.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(opts: &GlobalOptions, startup: Startup) -> Result<Self> {
        let startup = if opts.offline {
            Startup::Offline
        } else {
            startup
        };

        let config = load_config(opts)?;
        if startup != Startup::Offline {
            config.validate_auth()?;
        }

        let client = Arc::new(SlackClient::from_config(&config)?);

        let stores = CatalogStores::in_dir(&config.cache_dir()?);
        debug!(
            "Opening catalog from {} ({:?})",
            stores.channels.path().display(),
            startup
        );
        let catalog = ChannelCatalog::open(
            client,
            CatalogSettings::from(&config.catalog),
            Some(stores),
            startup,
        );

        Ok(Self {
            catalog,
            format: opts.format,
        })
    }
}

/// Load the config file and layer the CLI/env overrides on top.
///
/// A missing file is tolerated when the overrides alone are enough to run:
/// a token was given, or the command is offline.
pub fn load_config(opts: &GlobalOptions) -> Result<Config> {
    let mut config = match Config::load_at(opts.config_ref()) {
        Ok(config) => config,
        Err(Error::Config(ConfigError::NotFound)) if opts.token.is_some() || opts.offline => {
            Config::default()
        }
        Err(e) => return Err(e),
    };

    if let Some(ref token) = opts.token {
        config.token = Some(token.clone());
    }
    if let Some(ref cookie) = opts.cookie {
        config.cookie = Some(cookie.clone());
    }
    if let Some(url) = opts.api_url_ref() {
        config.api_url = Some(url.to_string());
    }

    Ok(config)
}
