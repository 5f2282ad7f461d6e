//! Ragline CLI
//!
//! Build searchable collections from web pages and files, then ask
//! questions grounded in them.

use anyhow::Result;
use clap::Parser;
use ragline_core::error::exit_codes;
use ragline_core::RaglineError;

mod app;
mod commands;
mod output;
mod services;

use app::{Cli, Commands};
use services::Services;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<RaglineError>()
            .map(RaglineError::exit_code)
            .unwrap_or(exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let services = Services::open(cli.config.as_deref())?;

    match cli.command {
        Commands::Ingest(args) => commands::ingest::run(args, &services, cli.format).await,
        Commands::Ask(args) => commands::ask::run(args, &services, cli.format).await,
        Commands::Chat(args) => commands::chat::run(args, &services).await,
        Commands::Collection(args) => commands::collection::run(args, &services, cli.format).await,
    }
}
