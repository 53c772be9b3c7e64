//! `pmem create` command
//!
//! Registers a project and seeds its eight document templates.
//!
//! # Usage
//! ```bash
//! pmem create api-service --path /workspace/api-service --tech Rust,SQLite
//! pmem create billing --path /workspace/billing --parent platform
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::Config;
use crate::core::project::NewProject;
use crate::core::types::ProjectKind;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Unique project slug (e.g. api-service)
    pub name: String,

    /// Filesystem path of the project
    #[arg(short, long)]
    pub path: String,

    /// Human-readable name (defaults to the slug)
    #[arg(long)]
    pub display_name: Option<String>,

    /// Technology stack (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub tech: Option<Vec<String>>,

    /// Owner (defaults to the configured user name)
    #[arg(short, long)]
    pub owner: Option<String>,

    /// Parent project (id or name); creates a parent-child edge
    #[arg(long)]
    pub parent: Option<String>,

    /// Register as a module instead of a project
    #[arg(long)]
    pub module: bool,
}

pub fn run(args: CreateArgs) -> Result<()> {
    let config = Config::load()?;
    let mut ops = super::open_ops(&config)?;

    let parent_id = match &args.parent {
        Some(ident) => Some(ops.resolve_project(ident)?.id),
        None => None,
    };

    let mut new = NewProject::new(args.name.as_str(), args.path.as_str())
        .with_tech_stack(args.tech.unwrap_or_default());
    if let Some(display_name) = args.display_name {
        new = new.with_display_name(display_name);
    }
    let owner = args.owner.unwrap_or_else(|| config.user.name.clone());
    if !owner.is_empty() {
        new = new.with_owner(owner);
    }
    if args.module {
        new.kind = Some(ProjectKind::Module);
    }
    if let Some(parent_id) = parent_id {
        new = new.with_parent(parent_id);
    }

    let created = ops.create_project(&new)?;

    println!(
        "{} Project created: {} ({})",
        "✓".green(),
        created.project.name.bold(),
        created.project.id
    );
    println!("  Docs: {:?}", created.docs_dir);
    for doc in &created.documents {
        println!("    {} ({})", doc.file_path, doc.update_mode);
    }

    Ok(())
}
