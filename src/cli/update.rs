//! `pmem update` command
//!
//! Merges content into one of a project's document slots.
//!
//! # Usage
//! ```bash
//! pmem update api-service todo "- [ ] Add rate limiting"
//! pmem update api-service progress --file sprint.md --mode upsert
//! ```

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use crate::config::Config;
use crate::core::types::{DocType, UpdateMode, UpdateTrigger};

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Project id or name
    pub project: String,

    /// Document type (todo, confirm, progress, delays, prd, memory, notes, qa)
    pub doc_type: String,

    /// Content to merge (or use --file)
    #[arg(allow_hyphen_values = true)]
    pub content: Option<String>,

    /// Read content from a file
    #[arg(short = 'f', long)]
    pub file: Option<String>,

    /// Merge mode (defaults to the doc type default)
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Recorded on the version snapshot
    #[arg(long)]
    pub summary: Option<String>,
}

pub fn run(args: UpdateArgs) -> Result<()> {
    let config = Config::load()?;
    let mut ops = super::open_ops(&config)?;

    let doc_type: DocType = args.doc_type.parse()?;
    let mode: Option<UpdateMode> = args.mode.as_deref().map(str::parse).transpose()?;

    let content = match (&args.content, &args.file) {
        (Some(content), _) => content.clone(),
        (None, Some(file)) => std::fs::read_to_string(file)?,
        (None, None) => bail!("Content is required. Pass it directly or use --file."),
    };

    let doc = ops.update_document(
        &args.project,
        doc_type,
        &content,
        mode,
        UpdateTrigger::Manual,
        args.summary.as_deref(),
    )?;

    println!(
        "{} {} updated to v{} ({})",
        "✓".green(),
        doc.doc_type.to_string().bold(),
        doc.version,
        mode.unwrap_or(doc.update_mode)
    );

    Ok(())
}
