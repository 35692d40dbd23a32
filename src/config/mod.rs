//! Configuration management for slackop

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CatalogError, ConfigError, Result};

/// Default Slack Web API base URL
pub const DEFAULT_API_URL: &str = "https://slack.com/api";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Slack token (xoxb, xoxp or xoxc)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Browser session cookie value, sent as `d=<cookie>` alongside xoxc tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,

    /// Web API base URL override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Directory holding the channel and user snapshots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Channel catalog tuning
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Channel catalog tuning as it appears in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Entries requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Pause between member-scope pages
    #[serde(default = "default_member_page_delay_ms")]
    pub member_page_delay_ms: u64,

    /// Pause the all-scope pass after this many pages
    #[serde(default = "default_full_pause_every")]
    pub full_pause_every: usize,

    /// Length of the periodic all-scope pause
    #[serde(default = "default_full_pause_ms")]
    pub full_pause_ms: u64,

    /// Retries of a page after a network or server error
    #[serde(default = "default_transient_retries")]
    pub transient_retries: u32,

    /// First backoff after a network or server error, doubled per attempt
    #[serde(default = "default_transient_backoff_ms")]
    pub transient_backoff_ms: u64,

    /// Manual refresh window length
    #[serde(default = "default_refresh_window_secs")]
    pub refresh_window_secs: u64,

    /// Minimum wait between manual refreshes
    #[serde(default = "default_refresh_base_wait_secs")]
    pub refresh_base_wait_secs: u64,

    /// Extra wait added per refresh already made in the window
    #[serde(default = "default_refresh_step_wait_secs")]
    pub refresh_step_wait_secs: u64,

    /// Manual refreshes allowed per window
    #[serde(default = "default_refresh_max_calls")]
    pub refresh_max_calls: u32,
}

fn default_page_size() -> usize {
    100
}

fn default_member_page_delay_ms() -> u64 {
    500
}

fn default_full_pause_every() -> usize {
    3
}

fn default_full_pause_ms() -> u64 {
    2000
}

fn default_transient_retries() -> u32 {
    3
}

fn default_transient_backoff_ms() -> u64 {
    1000
}

fn default_refresh_window_secs() -> u64 {
    5 * 60
}

fn default_refresh_base_wait_secs() -> u64 {
    30
}

fn default_refresh_step_wait_secs() -> u64 {
    30
}

fn default_refresh_max_calls() -> u32 {
    3
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            member_page_delay_ms: default_member_page_delay_ms(),
            full_pause_every: default_full_pause_every(),
            full_pause_ms: default_full_pause_ms(),
            transient_retries: default_transient_retries(),
            transient_backoff_ms: default_transient_backoff_ms(),
            refresh_window_secs: default_refresh_window_secs(),
            refresh_base_wait_secs: default_refresh_base_wait_secs(),
            refresh_step_wait_secs: default_refresh_step_wait_secs(),
            refresh_max_calls: default_refresh_max_calls(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".slackop").join("config.yaml"))
    }

    /// Resolve an optional override to a concrete config path
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from an optional override path
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(&Self::resolve_path(path)?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration to an optional override path
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(&Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        // Token and cookie are credentials
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Validate that a token is present
    pub fn validate_auth(&self) -> Result<()> {
        match self.token.as_deref() {
            Some(t) if !t.trim().is_empty() => Ok(()),
            _ => Err(ConfigError::MissingToken.into()),
        }
    }

    /// Web API base URL, falling back to the public endpoint
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Snapshot directory, falling back to the XDG cache location
    pub fn cache_dir(&self) -> std::result::Result<PathBuf, CatalogError> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let base = dirs::cache_dir().ok_or(CatalogError::NoHome)?;
        Ok(base.join("slackop"))
    }
}

/// Upper bound on `transient_retries`
pub const MAX_TRANSIENT_RETRIES: u32 = 10;

/// Runtime settings for the channel catalog, derived from [`CatalogConfig`].
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub page_size: usize,
    pub member_page_delay: Duration,
    pub full_pause_every: usize,
    pub full_pause: Duration,
    pub transient_retries: u32,
    pub transient_backoff: Duration,
    pub refresh: RefreshPolicy,
}

/// Manual refresh limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Rolling window length (W)
    pub window: Duration,
    /// Minimum wait between refreshes
    pub base_wait: Duration,
    /// Added to the minimum wait for every refresh already made in the window
    pub step_wait: Duration,
    /// Refreshes allowed per window
    pub max_calls: u32,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        CatalogSettings::default().refresh
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings::from(&CatalogConfig::default())
    }
}

impl From<&CatalogConfig> for CatalogSettings {
    fn from(cfg: &CatalogConfig) -> Self {
        Self {
            page_size: cfg.page_size.max(1),
            member_page_delay: Duration::from_millis(cfg.member_page_delay_ms),
            full_pause_every: cfg.full_pause_every,
            full_pause: Duration::from_millis(cfg.full_pause_ms),
            transient_retries: cfg.transient_retries.min(MAX_TRANSIENT_RETRIES),
            transient_backoff: Duration::from_millis(cfg.transient_backoff_ms),
            refresh: RefreshPolicy {
                window: Duration::from_secs(cfg.refresh_window_secs),
                base_wait: Duration::from_secs(cfg.refresh_base_wait_secs),
                step_wait: Duration::from_secs(cfg.refresh_step_wait_secs),
                max_calls: cfg.refresh_max_calls,
            },
        }
    }
}
