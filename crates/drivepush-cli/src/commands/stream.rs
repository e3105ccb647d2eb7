//! Upload-stream command - upload data read from stdin

use anyhow::Result;
use clap::Args;
use drivepush_core::domain::StreamUploadRequest;

use super::upload::report_transfer;
use super::{parse_parents, CommandContext};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct StreamCommand {
    /// Remote file name
    pub name: String,

    /// Parent folder id (repeatable)
    #[arg(short, long)]
    pub parent: Vec<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Force a content type instead of guessing from the name
    #[arg(long)]
    pub mime: Option<String>,

    /// Make the uploaded file readable by anyone with the link
    #[arg(long)]
    pub share: bool,

    /// Bytes per transfer segment (0 sends everything in one request)
    #[arg(long)]
    pub chunksize: Option<u64>,

    /// Seconds without input before the upload is aborted (0 disables)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Hide the progress line
    #[arg(long)]
    pub no_progress: bool,
}

impl StreamCommand {
    fn to_request(&self, ctx: &CommandContext) -> Result<StreamUploadRequest> {
        let mut req = StreamUploadRequest::new(self.name.as_str());
        req.description = self.description.clone();
        req.content_type = self.mime.clone();
        req.parents = parse_parents(&self.parent)?;
        req.chunk_size = ctx.chunk_size(self.chunksize);
        req.timeout = ctx.timeout(self.timeout);
        req.share = self.share;
        Ok(req)
    }

    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let req = self.to_request(ctx)?;
        let engine = ctx.engine(!self.no_progress)?;

        let outcome = engine.upload_stream(&req, tokio::io::stdin()).await?;

        if ctx.format == OutputFormat::Json {
            ctx.formatter().print_json(&serde_json::to_value(&outcome)?);
        } else {
            report_transfer(ctx, &outcome);
        }
        Ok(())
    }
}
