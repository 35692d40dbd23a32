//! Interactive lookup shell
//!
//! Keeps one catalog open for the whole session so background population
//! and the manual refresh limiter behave as they would in a long-lived
//! process.

use std::io::Write;
use std::str::FromStr;

use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::catalog::{ChannelCatalog, ChannelFilter, RefreshDecision, Startup};
use crate::cli::args::GlobalOptions;
use crate::cli::channel::{detail_pairs, resolve_rows};
use crate::cli::{CommandContext, OutputFormat};
use crate::client::SlackApi;
use crate::error::Result;
use crate::models::ChannelDisplay;
use crate::output::Formattable;
use crate::output::formatters::{format_age, format_wait};
use crate::output::table::format_details;

/// Rows printed by `list` in the shell
const SHELL_LIST_LIMIT: usize = 50;

const HELP: &str = "\
Commands:
  resolve <name>...   Print the id for each name (local only)
  get <name|id>...    Show details, fetching unknown ids from Slack
  list [term]         List channels, optionally matching a search term
  refresh             Repopulate the catalog (rate limited)
  info                Show catalog state
  help                Show this help
  quit                Leave the shell";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Resolve(Vec<String>),
    Get(Vec<String>),
    List(Option<String>),
    Refresh,
    Info,
    Help,
    Quit,
    Empty,
}

impl FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(ShellCommand::Empty);
        };
        let args: Vec<String> = words.map(str::to_string).collect();

        match verb.to_lowercase().as_str() {
            "resolve" | "r" if !args.is_empty() => Ok(ShellCommand::Resolve(args)),
            "get" | "g" if !args.is_empty() => Ok(ShellCommand::Get(args)),
            "resolve" | "r" | "get" | "g" => Err(format!("usage: {} <name>...", verb)),
            "list" | "ls" => Ok(ShellCommand::List(
                (!args.is_empty()).then(|| args.join(" ")),
            )),
            "refresh" => Ok(ShellCommand::Refresh),
            "info" | "status" => Ok(ShellCommand::Info),
            "help" | "?" => Ok(ShellCommand::Help),
            "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
            other => Err(format!("unknown command '{}' (try 'help')", other)),
        }
    }
}

/// Whether the shell keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Executes shell commands against an open catalog.
pub struct Session<'a, C> {
    catalog: &'a ChannelCatalog<C>,
    format: OutputFormat,
}

impl<'a, C: SlackApi + 'static> Session<'a, C> {
    pub fn new(catalog: &'a ChannelCatalog<C>, format: OutputFormat) -> Self {
        Self { catalog, format }
    }

    pub async fn execute<W: Write>(&self, command: ShellCommand, out: &mut W) -> Result<Flow> {
        match command {
            ShellCommand::Empty => {}
            ShellCommand::Quit => return Ok(Flow::Stop),
            ShellCommand::Help => writeln!(out, "{}", HELP)?,
            ShellCommand::Resolve(names) => {
                for row in resolve_rows(self.catalog, &names) {
                    if row.known {
                        writeln!(out, "{} → {} ({})", row.input, row.id, row.name)?;
                    } else {
                        writeln!(out, "{} → {} (unknown)", row.input, row.id)?;
                    }
                }
            }
            ShellCommand::Get(names) => {
                for (input, result) in self.catalog.resolve_many(&names, 5).await {
                    match result {
                        Ok(entry) => writeln!(
                            out,
                            "{}",
                            format_details(&detail_pairs(self.catalog, &entry))
                        )?,
                        Err(e) => writeln!(out, "{} {}: {}", "✗".red(), input, e)?,
                    }
                }
            }
            ShellCommand::List(term) => {
                let filter = match term {
                    Some(term) => ChannelFilter::new().search(term),
                    None => ChannelFilter::new(),
                };
                let entries = self.catalog.list_entries(|e| filter.matches(e));
                let rows: Vec<ChannelDisplay> = entries
                    .iter()
                    .take(SHELL_LIST_LIMIT)
                    .map(|e| ChannelDisplay::new(e, self.catalog.label(e)))
                    .collect();
                writeln!(out, "{}", rows.format(self.format)?)?;
                if entries.len() > rows.len() {
                    writeln!(out, "({} more, narrow with a search term)", entries.len() - rows.len())?;
                }
            }
            ShellCommand::Refresh => match self.catalog.request_refresh() {
                RefreshDecision::Allowed => writeln!(out, "Refresh started")?,
                RefreshDecision::Denied { retry_after } => writeln!(
                    out,
                    "Refresh not allowed yet, try again in {}",
                    format_wait(retry_after)
                )?,
            },
            ShellCommand::Info => {
                let info = self.catalog.cache_info();
                if self.format == OutputFormat::Json {
                    writeln!(out, "{}", serde_json::to_string_pretty(&info)?)?;
                } else {
                    let last = info
                        .last_refresh
                        .map(format_age)
                        .unwrap_or_else(|| "never".to_string());
                    writeln!(
                        out,
                        "{}",
                        format_details(&[
                            ("Status", info.status.to_string()),
                            ("Channels", info.entry_count.to_string()),
                            ("Joined", info.member_count.to_string()),
                            ("Users", info.user_count.to_string()),
                            ("Last refresh", last),
                            ("Refreshes in window", info.refresh_calls_in_window.to_string()),
                        ])
                    )?;
                }
            }
        }
        Ok(Flow::Continue)
    }
}

/// Run the interactive shell until `quit` or end of input.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts, Startup::Background)?;
    let session = Session::new(&ctx.catalog, ctx.format);

    eprintln!(
        "{} ({} channels loaded, type 'help')",
        "slackop shell".bold(),
        ctx.catalog.cache_info().entry_count
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();
    loop {
        eprint!("slackop> ");
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.parse::<ShellCommand>() {
            Ok(command) => match session.execute(command, &mut stdout).await {
                Ok(Flow::Stop) => break,
                Ok(Flow::Continue) => {}
                Err(e) => eprintln!("{} {}", "Error:".red(), e),
            },
            Err(msg) => eprintln!("{}", msg),
        }
        stdout.flush()?;
    }

    Ok(())
}
