//! `pmem serve` command
//!
//! Runs the MCP server over stdio. Protocol logs go to stderr; stdout is
//! the JSON-RPC channel.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use crate::config::Config;
use crate::core::store::Store;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Database file (defaults to the configured location)
    #[arg(long, env = "PMEM_DATABASE")]
    pub db: Option<PathBuf>,

    /// Create the database if it does not exist
    #[arg(long)]
    pub auto_init: bool,
}

pub fn run(args: ServeArgs) -> Result<()> {
    let db_path = match args.db {
        Some(path) => path,
        None => Config::load()?.db_path(),
    };

    if !db_path.exists() {
        if args.auto_init {
            eprintln!("Creating database at {:?}", db_path);
            if let Some(parent) = db_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            // Opening storage creates the database
            let _ = Store::open(&db_path)?;
        } else {
            bail!(
                "Database not found at {:?}. Run 'pmem init' or use --auto-init.",
                db_path
            );
        }
    }

    eprintln!("Database: {:?}", db_path);
    crate::mcp::run_mcp_server(db_path)
}
