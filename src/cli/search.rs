//! `pmem search` command
//!
//! Keyword search across project documents.
//!
//! # Usage
//! ```bash
//! pmem search "caching layer"
//! pmem search "rate limit" --project api-service --types todo,notes
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::Config;
use crate::core::types::DocType;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    /// Limit search to one project (id or name)
    #[arg(short, long)]
    pub project: Option<String>,

    /// Filter by document types (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub types: Option<Vec<String>>,

    /// Maximum number of hits
    #[arg(short, long)]
    pub limit: Option<usize>,
}

pub fn run(args: SearchArgs) -> Result<()> {
    let config = Config::load()?;
    let ops = super::open_ops(&config)?;

    let doc_types: Vec<DocType> = args
        .types
        .unwrap_or_default()
        .iter()
        .map(|s| s.parse())
        .collect::<Result<_, _>>()?;

    let limit = args.limit.unwrap_or(config.search.default_limit);
    let hits = ops.search(&args.query, args.project.as_deref(), doc_types, Some(limit))?;

    if hits.is_empty() {
        println!("No documents matched '{}'.", args.query);
        return Ok(());
    }

    println!("Found {} document(s):\n", hits.len());
    for hit in &hits {
        println!(
            "{} {} {}",
            hit.project_name.bold(),
            format!("[{}]", hit.doc_type).cyan(),
            format!("(score {})", hit.score).dimmed()
        );
        println!("  {}\n", hit.snippet);
    }

    Ok(())
}
