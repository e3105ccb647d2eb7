//! drivepush CLI - Command-line interface for drivepush
//!
//! Provides commands for:
//! - Uploading files and directory trees
//! - Uploading a stream read from stdin
//! - Creating folders

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use drivepush_core::config::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{mkdir::MkdirCommand, stream::StreamCommand, upload::UploadCommand, CommandContext};
use output::{get_formatter, OutputFormat};

#[derive(Debug, Parser)]
#[command(name = "drivepush", version, about = "Upload files and folders to a cloud drive")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// OAuth2 access token
    #[arg(long, global = true, env = "DRIVEPUSH_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload a file or directory
    Upload(UploadCommand),
    /// Upload data read from stdin
    UploadStream(StreamCommand),
    /// Create a folder
    Mkdir(MkdirCommand),
}

/// Log filter used when `RUST_LOG` is not set
fn default_filter(verbose: u8, quiet: bool, configured: &str) -> String {
    match (verbose, quiet) {
        (0, true) => "warn".to_string(),
        (0, false) => configured.to_string(),
        (1, _) => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Load the configuration named on the command line, or the default one
fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&Config::default_path()),
    };

    let errors = config.validate();
    if !errors.is_empty() {
        let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow::bail!("Invalid configuration: {}", details.join("; "));
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let formatter = get_formatter(cli.json);

    let config = match load_config(cli.config.as_ref()).context("Failed to load configuration") {
        Ok(config) => config,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            std::process::exit(2);
        }
    };

    // Setup tracing
    let filter = default_filter(cli.verbose, cli.quiet, &config.logging.level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let ctx = CommandContext {
        config,
        token: cli.token,
        format,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Upload(cmd) => cmd.execute(&ctx).await,
        Commands::UploadStream(cmd) => cmd.execute(&ctx).await,
        Commands::Mkdir(cmd) => cmd.execute(&ctx).await,
    };

    if let Err(e) = result {
        formatter.error(&format!("{e:#}"));
        std::process::exit(1);
    }
    Ok(())
}
