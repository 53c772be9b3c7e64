//! `pmem history` command
//!
//! Shows the version history of a document, or the full content of one
//! snapshot.

use anyhow::{bail, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};
use ulid::Ulid;

use crate::config::Config;
use crate::core::types::DocType;

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Project id or name
    pub project: String,

    /// Document type
    pub doc_type: String,

    /// Print the full content of this version snapshot
    #[arg(long)]
    pub show: Option<String>,
}

#[derive(Tabled)]
struct VersionRow {
    #[tabled(rename = "Version")]
    version: i64,
    #[tabled(rename = "Trigger")]
    trigger: String,
    #[tabled(rename = "Summary")]
    summary: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Snapshot ID")]
    id: String,
}

pub fn run(args: HistoryArgs) -> Result<()> {
    let config = Config::load()?;
    let ops = super::open_ops(&config)?;

    if let Some(version_id) = &args.show {
        let id: Ulid = version_id.parse()?;
        match ops.version_content(id)? {
            Some(content) => println!("{}", content),
            None => bail!("Version snapshot {} not found", version_id),
        }
        return Ok(());
    }

    let doc_type: DocType = args.doc_type.parse()?;
    let versions = ops.versions(&args.project, doc_type)?;

    let rows: Vec<VersionRow> = versions
        .iter()
        .map(|v| VersionRow {
            version: v.version_number,
            trigger: v.trigger.to_string(),
            summary: v.change_summary.clone(),
            created: v.created_at.format("%Y-%m-%d %H:%M").to_string(),
            id: v.id.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    Ok(())
}
