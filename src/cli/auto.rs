//! `pmem auto` command
//!
//! Routes a conversation summary through the rule-based classifier and
//! applies the resulting document updates.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct AutoArgs {
    /// Project id or name
    pub project: String,

    /// Conversation summary to classify
    pub summary: String,
}

pub fn run(args: AutoArgs) -> Result<()> {
    let config = Config::load()?;
    let mut ops = super::open_ops(&config)?;

    let applied = ops.auto_update(&args.summary, &args.project)?;

    println!("{} Applied {} update(s):", "✓".green(), applied.len());
    for update in &applied {
        println!(
            "  {} ({}): {}",
            update.doc_type.to_string().bold(),
            update.mode,
            update.snippet.lines().next().unwrap_or("")
        );
    }

    Ok(())
}
