//! CLI module - command definitions and handlers

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::core::ops::Ops;
use crate::core::store::Store;
use crate::mirror::Mirror;

pub mod auto;
pub mod context;
pub mod create;
pub mod history;
pub mod init;
pub mod link;
pub mod list;
pub mod search;
pub mod serve;
pub mod sync;
pub mod update;

/// pmem - project-memory knowledge base
///
/// Projects with eight versioned markdown documents, a typed relation
/// graph, and keyword search. Serves tool-calling front-ends over MCP.
#[derive(Parser, Debug)]
#[command(name = "pmem")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the database
    Init(init::InitArgs),

    /// Register a new project with its eight document templates
    Create(create::CreateArgs),

    /// Update a project document (append or upsert)
    Update(update::UpdateArgs),

    /// Show a project's context, optionally with related projects
    Context(context::ContextArgs),

    /// Search across project documents
    Search(search::SearchArgs),

    /// Link two projects with a typed edge
    Link(link::LinkArgs),

    /// List registered projects
    List(list::ListArgs),

    /// Show the version history of a document
    History(history::HistoryArgs),

    /// Classify a conversation summary into document updates
    Auto(auto::AutoArgs),

    /// Mirror documents to .md files on disk
    Sync(sync::SyncArgs),

    /// Run the MCP server
    Serve(serve::ServeArgs),
}

/// Open the configured database; commands other than `init` expect it to exist
pub(crate) fn open_ops(config: &Config) -> Result<Ops> {
    let db_path = config.db_path();
    if !db_path.exists() {
        bail!(
            "Database not found at {:?}. Run 'pmem init' first.",
            db_path
        );
    }

    let store = Store::open(&db_path)?;
    Ok(Ops::new(store, Mirror::new(config.docs_dir())))
}
