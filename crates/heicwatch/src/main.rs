//! heicwatch CLI - convert HEIC photos to PNG/JPEG.
//!
//! Two modes share the same conversion pipeline: `watch` converts files as
//! they appear in a directory, `batch` converts everything already there.
//!
//! # Usage
//!
//! ```bash
//! # Convert new HEIC files as they land in ~/Inbox
//! heicwatch watch --input ~/Inbox --output ~/Converted --workers 8
//!
//! # Convert a whole tree once, to JPEG
//! heicwatch batch --input ./photos --output ./jpegs --ext jpg
//!
//! # View configuration
//! heicwatch config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// heicwatch - watch a directory and convert HEIC photos to PNG/JPEG.
#[derive(Parser, Debug)]
#[command(name = "heicwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Directory for the dated log file (defaults to the system temp dir)
    #[arg(long, global = true, env = "HEICWATCH_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log to stderr only
    #[arg(long, global = true)]
    no_log_file: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "HEICWATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Watch a directory and convert HEIC files as they are created
    Watch(cli::watch::WatchArgs),

    /// Convert every HEIC file under a directory once
    Batch(cli::batch::BatchArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match &cli.config {
        Some(path) => heicwatch_core::Config::load_from(path)?,
        None => match heicwatch_core::Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `heicwatch config path`."
                );
                heicwatch_core::Config::default()
            }
        },
    };

    let log_file = logging::init_from_config(
        &config,
        cli.verbose,
        cli.json_logs,
        cli.log_dir.as_deref(),
        cli.no_log_file,
    );

    tracing::debug!("heicwatch v{}", heicwatch_core::VERSION);
    if let Some(path) = &log_file {
        tracing::debug!(path = %path.display(), "writing log file");
    }

    // Dispatch to the appropriate command handler
    let result = match cli.command {
        Commands::Watch(args) => cli::watch::execute(args, config).await,
        Commands::Batch(args) => cli::batch::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config, cli.config).await,
    };

    if let Err(e) = &result {
        tracing::error!("terminating: {e:#}");
    }
    result
}
