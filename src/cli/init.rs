//! `pmem init` command
//!
//! Creates the database (and its parent directory) at the configured
//! location, or at `--db` when given.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::Config;
use crate::core::store::Store;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Database file (defaults to the configured location)
    #[arg(long, env = "PMEM_DATABASE")]
    pub db: Option<PathBuf>,
}

pub fn run(args: InitArgs) -> Result<()> {
    let config = Config::load()?;
    let db_path = args.db.unwrap_or_else(|| config.db_path());

    if db_path.exists() {
        println!("{} Database already exists at {:?}", "✓".green(), db_path);
        return Ok(());
    }

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Opening creates the schema
    Store::open(&db_path)?;

    println!("{} Database initialized at {:?}", "✓".green(), db_path);
    println!("  Next: pmem create <name> --path <path>");

    Ok(())
}
