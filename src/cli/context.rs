//! `pmem context` command
//!
//! Prints a project's rendered context, ready to paste into a
//! conversation.

use anyhow::Result;
use clap::Args;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ContextArgs {
    /// Project id or name
    pub project: String,

    /// Include related projects via graph traversal
    #[arg(short, long)]
    pub related: bool,

    /// Traversal depth for related projects
    #[arg(short, long, default_value_t = 1)]
    pub depth: u32,
}

pub fn run(args: ContextArgs) -> Result<()> {
    let config = Config::load()?;
    let ops = super::open_ops(&config)?;

    let markdown = ops.project_context(&args.project, args.related, args.depth)?;
    println!("{}", markdown);

    Ok(())
}
