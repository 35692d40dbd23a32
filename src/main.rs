//! slackop - Slack channel catalog and lookup companion

use clap::{CommandFactory, Parser};
use clap_complete::CompleteEnv;

mod catalog;
mod cli;
mod client;
mod config;
mod error;
mod models;
mod output;

use cli::args::GlobalOptions;
use cli::{CacheCommands, ChannelCommands, Cli, Commands};
use error::Result;

#[tokio::main]
async fn main() {
    // Answers COMPLETE=<shell> requests and exits; a no-op otherwise
    CompleteEnv::with_factory(Cli::command).complete();

    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "warn,slackop=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .target(env_logger::Target::Stderr)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init => cli::init::run(&opts).await,
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("slackop version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Channel(channel_cmd) => match channel_cmd {
            ChannelCommands::List {
                filters,
                limit,
                refresh,
                wait,
            } => cli::channel::list(&opts, &filters, &limit, refresh, wait).await,
            ChannelCommands::Resolve { names } => cli::channel::resolve(&opts, &names),
            ChannelCommands::Get { names } => cli::channel::get(&opts, &names).await,
        },
        Commands::Cache(cache_cmd) => match cache_cmd {
            CacheCommands::Status => cli::cache::status(&opts),
            CacheCommands::Clear => cli::cache::clear(&opts),
            CacheCommands::Path => cli::cache::path(&opts),
            CacheCommands::Refresh => cli::cache::refresh(&opts).await,
        },
        Commands::Shell => cli::shell::run(&opts).await,
        Commands::Completion { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "slackop",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
