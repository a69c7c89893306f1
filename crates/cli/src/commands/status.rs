// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vo status`: print the loaded agent catalog.

use crate::exit_error::ExitError;
use anyhow::Result;
use std::path::Path;
use vo_config::registry::AgentRegistry;

pub fn execute(vault_root: &Path) -> Result<()> {
    let config = vo_config::config::load(vault_root).map_err(|e| ExitError::new(1, e))?;
    let registry = AgentRegistry::load(&config, vault_root);

    println!("Vault: {}", vault_root.display());
    println!("Agents loaded: {}", registry.len());
    for agent in registry.iter() {
        println!(
            "  [{}] {} ({})",
            agent.abbreviation, agent.display_name, agent.category
        );
    }
    Ok(())
}
