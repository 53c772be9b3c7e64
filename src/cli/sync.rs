//! `pmem sync` command
//!
//! Re-mirrors document contents to .md files on disk.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Project id or name (omit to sync all projects)
    pub project: Option<String>,
}

pub fn run(args: SyncArgs) -> Result<()> {
    let config = Config::load()?;
    let ops = super::open_ops(&config)?;

    let synced = ops.sync(args.project.as_deref())?;

    if synced.is_empty() {
        println!("No projects to sync.");
        return Ok(());
    }

    for entry in &synced {
        println!(
            "{} {} ({} files) -> {:?}",
            "✓".green(),
            entry.project_name.bold(),
            entry.files.len(),
            entry.docs_dir
        );
    }

    Ok(())
}
