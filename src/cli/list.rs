//! `pmem list` command
//!
//! Lists registered projects in a table, most recently updated first.

use anyhow::Result;
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use crate::config::Config;
use crate::core::types::ProjectStatus;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Filter by status (active, paused, archived)
    #[arg(short, long)]
    pub status: Option<String>,
}

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Tech")]
    tech: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

pub fn run(args: ListArgs) -> Result<()> {
    let config = Config::load()?;
    let ops = super::open_ops(&config)?;

    let status: Option<ProjectStatus> = args.status.as_deref().map(str::parse).transpose()?;
    let projects = ops.list_projects(status)?;

    if projects.is_empty() {
        println!("No projects registered yet. Run 'pmem create <name> --path <path>'.");
        return Ok(());
    }

    let rows: Vec<ProjectRow> = projects
        .iter()
        .map(|p| ProjectRow {
            name: p.name.clone(),
            kind: p.kind.to_string(),
            status: p.status.to_string(),
            tech: p.tech_stack.join(", "),
            owner: p.owner.clone(),
            updated: p.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    let stats = ops.stats()?;
    println!(
        "{} project(s), {} document(s), {} edge(s), {} version snapshot(s)",
        stats.projects, stats.documents, stats.edges, stats.versions
    );

    Ok(())
}
