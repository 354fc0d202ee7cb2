mod commands;
mod loader;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "navdesk")]
#[command(version, about = "Navdesk CLI - inspect routes and replay navigation", long_about = None)]
struct Cli {
    /// Path to navdesk.toml
    #[arg(short, long, global = true, default_value = "navdesk.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the route table
    Routes,

    /// Show which route a path resolves to
    Resolve {
        /// Path or location, e.g. /news?symbol=AAPL
        path: String,
    },

    /// Drive a router through a sequence of intents and print its events
    ///
    /// Intents: a path, `@name key=value`, `replace /path`,
    /// `location /base/path`, `back`, `forward`.
    Replay {
        /// Intents to run, in order
        #[arg(required = true)]
        intents: Vec<String>,

        /// Routes whose simulated loader fails
        #[arg(long = "fail", value_name = "ROUTE")]
        failing: Vec<String>,

        /// Restore history from the configured store before replaying
        #[arg(long)]
        resume: bool,

        /// Also print every state machine transition
        #[arg(short, long)]
        transitions: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = navdesk_router::Config::load(&cli.config)?;

    match cli.command {
        Commands::Routes => commands::routes::execute(&config)?,
        Commands::Resolve { path } => commands::resolve::execute(&config, &path)?,
        Commands::Replay {
            intents,
            failing,
            resume,
            transitions,
        } => {
            let options = commands::replay::ReplayOptions {
                failing,
                resume,
                transitions,
            };
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?
                .block_on(commands::replay::execute(&config, &intents, &options))?;
        }
    }

    Ok(())
}
