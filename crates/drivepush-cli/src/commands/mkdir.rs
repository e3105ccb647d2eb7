//! Mkdir command - create a folder

use anyhow::Result;
use clap::Args;
use drivepush_core::domain::MkdirRequest;

use super::{parse_parents, CommandContext};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct MkdirCommand {
    /// Folder name
    pub name: String,

    /// Parent folder id (repeatable)
    #[arg(short, long)]
    pub parent: Vec<String>,

    #[arg(long)]
    pub description: Option<String>,
}

impl MkdirCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let req = MkdirRequest {
            name: self.name.clone(),
            description: self.description.clone(),
            parents: parse_parents(&self.parent)?,
        };
        let engine = ctx.engine(false)?;
        let folder = engine.mkdir(&req).await?;

        let formatter = ctx.formatter();
        if ctx.format == OutputFormat::Json {
            formatter.print_json(&serde_json::to_value(&folder)?);
        } else {
            formatter.success(&format!("Directory {} created", folder.id));
        }
        Ok(())
    }
}
