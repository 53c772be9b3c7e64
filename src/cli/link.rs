//! `pmem link` command
//!
//! Creates a typed directed edge between two projects.
//!
//! # Usage
//! ```bash
//! pmem link api-service rpc-service depends_on -d "API calls RPC"
//! pmem link api-service shared-utils uses --bidirectional
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::Config;
use crate::core::types::EdgeType;

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Source project (id or name)
    pub from: String,

    /// Target project (id or name)
    pub to: String,

    /// Relation type (depends_on, uses, related, parent_child)
    pub edge_type: String,

    /// Description of the relationship
    #[arg(short, long)]
    pub description: Option<String>,

    /// Relation strength in [0, 1]
    #[arg(short, long)]
    pub strength: Option<f64>,

    /// Traversal may cross the edge in either direction
    #[arg(short, long)]
    pub bidirectional: bool,
}

pub fn run(args: LinkArgs) -> Result<()> {
    let config = Config::load()?;
    let mut ops = super::open_ops(&config)?;

    let edge_type: EdgeType = args.edge_type.parse()?;
    let edge = ops.add_edge(
        &args.from,
        &args.to,
        edge_type,
        args.description.as_deref(),
        args.strength,
        args.bidirectional,
    )?;

    let arrow = if edge.bidirectional { "↔" } else { "→" };
    println!(
        "{} {} {} {} ({})",
        "✓".green(),
        args.from.bold(),
        arrow,
        args.to.bold(),
        edge.edge_type
    );

    Ok(())
}
