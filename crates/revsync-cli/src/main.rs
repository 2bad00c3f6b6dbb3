//! revsync CLI - Review threads of GitHub pull requests from the terminal
//!
//! Provides commands for:
//! - Listing and reading review threads
//! - Jumping between threads of a file
//! - Starting, replying to, resolving and reacting to threads
//! - Managing configuration

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod output;
mod overlay;

use commands::{
    config::ConfigCommand,
    mutate::{BodyAction, BodyCommand, CommentCommand, ReactCommand, TargetAction, TargetCommand},
    navigate::NavigateCommand,
    threads::{ShowCommand, ThreadsCommand},
};
use context::CliContext;
use output::OutputFormat;
use revsync_core::store::navigation::Direction;

#[derive(Debug, Parser)]
#[command(name = "revsync", version, about = "Pull request review threads in your terminal")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Repository as owner/name (overrides github.owner and github.repo)
    #[arg(long, global = true)]
    repo: Option<String>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List review threads of a pull request
    Threads(ThreadsCommand),
    /// Show the conversation at a line
    Show(ShowCommand),
    /// Jump to the next thread in a file
    Next(NavigateCommand),
    /// Jump to the previous thread in a file
    Prev(NavigateCommand),
    /// Start a new review thread
    Comment(CommentCommand),
    /// Reply to the thread at a line
    Reply(BodyCommand),
    /// Edit your last comment in the thread at a line
    Edit(BodyCommand),
    /// Toggle the resolved state of the thread at a line
    Resolve(TargetCommand),
    /// Delete your last comment in the thread at a line
    Delete(TargetCommand),
    /// React to the last comment in the thread at a line
    React(ReactCommand),
    /// View and manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let ctx = CliContext::new(format, cli.quiet, cli.config.as_deref(), cli.repo);

    // Setup tracing
    let filter = match cli.verbose {
        0 => ctx.config().logging.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Some(error) = ctx.load_error() {
        warn!(
            config_path = %ctx.config_path().display(),
            error = %error,
            "Ignoring unreadable configuration, using defaults"
        );
    }

    match cli.command {
        Commands::Threads(cmd) => cmd.execute(&ctx).await,
        Commands::Show(cmd) => cmd.execute(&ctx).await,
        Commands::Next(cmd) => cmd.execute(&ctx, Direction::Next).await,
        Commands::Prev(cmd) => cmd.execute(&ctx, Direction::Prev).await,
        Commands::Comment(cmd) => cmd.execute(&ctx).await,
        Commands::Reply(cmd) => cmd.execute(&ctx, BodyAction::Reply).await,
        Commands::Edit(cmd) => cmd.execute(&ctx, BodyAction::Edit).await,
        Commands::Resolve(cmd) => cmd.execute(&ctx, TargetAction::Resolve).await,
        Commands::Delete(cmd) => cmd.execute(&ctx, TargetAction::Delete).await,
        Commands::React(cmd) => cmd.execute(&ctx).await,
        Commands::Config(cmd) => cmd.execute(&ctx).await,
    }
}
