//! Upload command - upload a file or directory tree
//!
//! Provides the `drivepush upload` CLI command which:
//! 1. Builds an `UploadRequest` from the flags and configuration
//! 2. Runs the `UploadEngine` against the Drive store
//! 3. Prints the uploaded object or the tree totals

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use drivepush_core::domain::{format_size, TransferOutcome, UploadOutcome, UploadRequest};

use super::{parse_parents, CommandContext};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct UploadCommand {
    /// Local file or directory
    pub path: PathBuf,

    /// Parent folder id (repeatable)
    #[arg(short, long, conflicts_with = "folder")]
    pub parent: Vec<String>,

    /// Destination folder path, e.g. "My Drive/Reports"
    #[arg(long)]
    pub folder: Option<String>,

    /// Remote name, defaults to the local file name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Force a content type instead of guessing from the extension
    #[arg(long)]
    pub mime: Option<String>,

    /// Upload directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Make the uploaded file readable by anyone with the link
    #[arg(long)]
    pub share: bool,

    /// Delete local files after a verified upload. Fails if a directory
    /// still holds skipped entries such as symlinks
    #[arg(long)]
    pub delete: bool,

    /// Bytes per transfer segment (0 sends everything in one request)
    #[arg(long)]
    pub chunksize: Option<u64>,

    /// Seconds without progress before an attempt is aborted (0 disables)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Hide the progress line
    #[arg(long)]
    pub no_progress: bool,
}

impl UploadCommand {
    fn to_request(&self, ctx: &CommandContext) -> Result<UploadRequest> {
        let mut req = UploadRequest::new(self.path.clone());
        req.name = self.name.clone();
        req.description = self.description.clone();
        req.content_type = self.mime.clone();
        req.parents = parse_parents(&self.parent)?;
        req.folder_path = self.folder.clone();
        req.chunk_size = ctx.chunk_size(self.chunksize);
        req.timeout = ctx.timeout(self.timeout);
        req.recursive = self.recursive;
        req.share = self.share;
        req.delete_source = self.delete;
        Ok(req)
    }

    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = ctx.formatter();
        let req = self.to_request(ctx)?;
        let engine = ctx.engine(!self.no_progress)?;

        let outcome = engine.upload(&req).await?;

        if ctx.format == OutputFormat::Json {
            formatter.print_json(&serde_json::to_value(&outcome)?);
            return Ok(());
        }

        match outcome {
            UploadOutcome::File(transfer) => report_transfer(ctx, &transfer),
            UploadOutcome::Tree { bytes, rate } => {
                formatter.success(&format!(
                    "Uploaded {} at {}/s, total {}",
                    self.path.display(),
                    format_size(rate),
                    format_size(bytes)
                ));
            }
        }
        Ok(())
    }
}

/// Print a single file result in human form
pub(crate) fn report_transfer(ctx: &CommandContext, transfer: &TransferOutcome) {
    let formatter = ctx.formatter();
    let object = &transfer.object;

    if transfer.skipped {
        formatter.success(&format!(
            "Skipped {} ({}), already exists",
            object.name, object.id
        ));
    } else {
        formatter.success(&format!(
            "Uploaded {} ({}) at {}/s, total {}",
            object.name,
            object.id,
            format_size(transfer.rate),
            format_size(object.size)
        ));
    }
    if !ctx.quiet {
        if let Some(link) = &object.web_content_link {
            formatter.info(&format!("Link: {link}"));
        }
    }
}
