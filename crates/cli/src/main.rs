// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! vo - Vault Orchestrator CLI

mod commands;
mod exit_error;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{run, status};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "vo",
    version,
    about = "Vault Orchestrator - dispatches file-triggered agents over a Markdown vault"
)]
struct Cli {
    /// Vault root; defaults to the current directory
    #[arg(short = 'C', global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the orchestrator and watch the vault
    Run(run::RunArgs),
    /// Show the vault path and the loaded agent catalog
    Status,
}

#[tokio::main]
async fn main() {
    if let Err(e) = dispatch().await {
        let code = e
            .downcast_ref::<exit_error::ExitError>()
            .map_or(2, |x| x.code);
        eprintln!("Error: {e:#}");
        std::process::exit(code);
    }
}

async fn dispatch() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();

    let vault_root = match cli.directory {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Run(args) => run::execute(&vault_root, args).await,
        Commands::Status => status::execute(&vault_root),
    }
}

/// Console logging: one line per lifecycle event, on stderr so `status`
/// output stays clean. `RUST_LOG` overrides the default level.
fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
