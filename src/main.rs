//! pmem CLI - entry point
//!
//! Usage: pmem <command> [options]

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pmem::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => pmem::cli::init::run(args),
        Commands::Create(args) => pmem::cli::create::run(args),
        Commands::Update(args) => pmem::cli::update::run(args),
        Commands::Context(args) => pmem::cli::context::run(args),
        Commands::Search(args) => pmem::cli::search::run(args),
        Commands::Link(args) => pmem::cli::link::run(args),
        Commands::List(args) => pmem::cli::list::run(args),
        Commands::History(args) => pmem::cli::history::run(args),
        Commands::Auto(args) => pmem::cli::auto::run(args),
        Commands::Sync(args) => pmem::cli::sync::run(args),
        Commands::Serve(args) => pmem::cli::serve::run(args),
    }
}
