//! CLI subcommands and the wiring they share

pub mod mkdir;
pub mod stream;
pub mod upload;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use drivepush_core::config::Config;
use drivepush_core::domain::RemoteId;
use drivepush_remote::{DriveClient, DriveStore};
use drivepush_upload::{RetryPolicy, UploadEngine};
use tracing::debug;

use crate::output::{get_formatter, OutputFormat, OutputFormatter, ProgressPrinter};

/// Settings resolved from global flags and the configuration file
#[derive(Debug)]
pub struct CommandContext {
    pub config: Config,
    pub token: Option<String>,
    pub format: OutputFormat,
    pub quiet: bool,
}

impl CommandContext {
    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(matches!(self.format, OutputFormat::Json))
    }

    /// Build an engine backed by the Drive REST adapter
    ///
    /// # Arguments
    /// * `show_progress` - Print transfer progress unless output is quiet or JSON
    ///
    /// # Errors
    /// Fails when no access token was supplied
    pub fn engine(&self, show_progress: bool) -> Result<UploadEngine> {
        let token = self
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .context("No access token. Pass --token or set DRIVEPUSH_ACCESS_TOKEN")?;

        let client = DriveClient::from_config(token, &self.config.remote);
        let store = Arc::new(DriveStore::new(client));
        let retry = RetryPolicy::from(&self.config.retry);
        debug!(
            api = %self.config.remote.api_base_url,
            max_retries = retry.max_retries,
            "Created Drive store"
        );

        let engine = UploadEngine::new(store.clone(), store, retry);
        if show_progress && !self.quiet && self.format == OutputFormat::Human {
            Ok(engine.with_progress(Arc::new(ProgressPrinter::new())))
        } else {
            Ok(engine)
        }
    }

    /// Chunk size from the command line, falling back to the configuration
    pub fn chunk_size(&self, flag: Option<u64>) -> u64 {
        flag.unwrap_or(self.config.upload.chunk_size)
    }

    /// Idle timeout from the command line, falling back to the configuration
    pub fn timeout(&self, flag: Option<u64>) -> Duration {
        flag.map(Duration::from_secs)
            .unwrap_or_else(|| self.config.upload.timeout())
    }
}

/// Parse `--parent` values into remote ids
pub fn parse_parents(values: &[String]) -> Result<Vec<RemoteId>> {
    values
        .iter()
        .map(|value| {
            value
                .parse::<RemoteId>()
                .with_context(|| format!("Invalid parent id '{value}'"))
        })
        .collect()
}
