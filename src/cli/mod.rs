//! CLI command definitions and handlers

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

use completions::channel_name_candidates;

pub mod args;
pub mod cache;
pub mod channel;
pub mod completions;
pub mod context;
pub mod init;
pub mod progress;
pub mod shell;
pub mod status;

pub use args::{ChannelFilterArgs, LimitArgs, OutputFormat};
pub use context::CommandContext;

/// slackop - Slack channel catalog and lookup companion
#[derive(Parser, Debug)]
#[command(name = "slackop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "SLACKOP_FORMAT",
        default_value = "table",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "SLACKOP_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Slack token (overrides the config file)
    #[arg(long, global = true, env = "SLACKOP_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Session cookie sent with xoxc tokens
    #[arg(long, global = true, env = "SLACKOP_COOKIE", hide_env_values = true)]
    pub cookie: Option<String>,

    /// Override the Web API base URL
    #[arg(long, global = true, env = "SLACKOP_API_URL", hide = true)]
    pub api_url: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "SLACKOP_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Use the local snapshot only, without contacting Slack in the background
    #[arg(long, global = true)]
    pub offline: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize slackop configuration
    Init,

    /// Show authentication and configuration status
    Status,

    /// Display version information
    Version,

    /// Look up and list channels
    #[command(subcommand)]
    Channel(ChannelCommands),

    /// Manage the local channel catalog
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Interactive lookup session with a live catalog
    #[command(after_help = "\
The catalog keeps populating in the background while the session is open.
Type 'help' at the prompt for the list of commands.")]
    Shell,

    /// Generate shell completions (static)
    #[command(after_help = "\
Static completions (subcommands/flags only):
  bash:   slackop completion bash > /etc/bash_completion.d/slackop
  zsh:    slackop completion zsh > \"${fpath[1]}/_slackop\"
  fish:   slackop completion fish > ~/.config/fish/completions/slackop.fish

Dynamic completions (includes channel names from the local snapshot):
  bash:   echo 'source <(COMPLETE=bash slackop)' >> ~/.bashrc
  zsh:    echo 'source <(COMPLETE=zsh slackop)' >> ~/.zshrc
  fish:   echo 'COMPLETE=fish slackop | source' >> ~/.config/fish/config.fish")]
    Completion {
        /// Shell to generate completions for (static only)
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Channel subcommands
#[derive(Subcommand, Debug)]
pub enum ChannelCommands {
    /// List channels known to the catalog
    #[command(
        visible_alias = "ls",
        after_help = "EXAMPLES:\n  \
            slackop channel list                     # Snapshot contents, sorted by name\n  \
            slackop channel list --type member       # Channels you belong to\n  \
            slackop channel list -s deploy --wait    # Wait for population, then search\n  \
            slackop channel list --refresh           # Ignore the snapshot, fetch everything"
    )]
    List {
        #[command(flatten)]
        filters: ChannelFilterArgs,

        #[command(flatten)]
        limit: LimitArgs,

        /// Ignore the saved snapshot and list a freshly fetched catalog
        #[arg(long, conflicts_with = "wait")]
        refresh: bool,

        /// Wait for background population to finish before listing
        #[arg(long)]
        wait: bool,
    },

    /// Print the id for each channel name
    #[command(after_help = "EXAMPLES:\n  \
            slackop channel resolve general\n  \
            slackop channel resolve '#ops' @ada C0123456789")]
    Resolve {
        /// Channel names, @user names or ids
        #[arg(required = true, add = channel_name_candidates())]
        names: Vec<String>,
    },

    /// Show channel details, fetching unknown ids from Slack
    #[command(visible_alias = "g")]
    Get {
        /// Channel names, @user names or ids
        #[arg(required = true, add = channel_name_candidates())]
        names: Vec<String>,
    },
}

/// Catalog cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show snapshot statistics
    Status,
    /// Delete the channel and user snapshots
    Clear,
    /// Print cache directory path
    Path,
    /// Populate the catalog now and save a new snapshot
    Refresh,
}
