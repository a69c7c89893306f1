// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vo run`: start the orchestrator daemon.

use crate::exit_error::ExitError;
use anyhow::Result;
use clap::Args;
use std::path::Path;
use vo_adapters::CliExecutorAdapter;
use vo_config::registry::AgentRegistry;
use vo_engine::Orchestrator;

#[derive(Args)]
pub struct RunArgs {
    /// Override the configured global concurrency limit
    #[arg(long = "max-concurrent", value_name = "N")]
    pub max_concurrent: Option<u32>,
}

pub async fn execute(vault_root: &Path, args: RunArgs) -> Result<()> {
    let config = vo_config::config::load(vault_root).map_err(|e| ExitError::new(1, e))?;
    let registry = AgentRegistry::load(&config, vault_root);

    let orchestrator = Orchestrator::new(
        vault_root,
        &config,
        registry,
        CliExecutorAdapter::new(),
        args.max_concurrent,
    );
    orchestrator.prepare().map_err(|e| ExitError::new(2, e))?;
    let watcher = orchestrator.start_watcher().map_err(|e| ExitError::new(2, e))?;

    orchestrator
        .run(watcher, shutdown_signal())
        .await
        .map_err(|e| ExitError::new(2, e))?;

    tracing::info!("orchestrator stopped");
    Ok(())
}

/// Resolves on the first interrupt.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for interrupt; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("interrupt received, draining");
}
