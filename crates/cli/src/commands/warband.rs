// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hd warband` - Warband management

use crate::context::Context;
use crate::exit_error::ExitError;
use anyhow::Result;
use clap::{Args, Subcommand};
use hd_adapters::IssueStore;
use hd_core::{IssueFilter, IssueStatus, WarbandConfig, WarbandRegistry};
use hd_engine::{
    stop_all_raiders, ForgeManager, Lifecycle, StartOptions, StartOutcome, WitnessManager,
};

#[derive(Args)]
pub struct WarbandArgs {
    #[command(subcommand)]
    pub command: WarbandCommand,
}

#[derive(Subcommand)]
pub enum WarbandCommand {
    /// Register a new warband
    Add {
        name: String,
        /// Bead-id prefix (e.g. `gp`)
        #[arg(long)]
        prefix: String,
        /// Default branch of the warband repository
        #[arg(long, default_value = "main")]
        branch: String,
    },
    /// List registered warbands
    List,
    /// Deregister a warband (files on disk are kept)
    Remove { name: String },
    /// Start witness and forge
    Boot { name: Option<String> },
    /// Start witness and forge
    Start { name: Option<String> },
    /// Stop witness, forge, and raiders
    Stop { name: Option<String> },
    /// Stop witness, forge, and raiders, then boot again
    Restart { name: Option<String> },
    /// Stop all warband agents (raiders included)
    Shutdown { name: Option<String> },
    /// Reset stale raider work (raiders with no session)
    Reset { name: Option<String> },
    /// Warband agent status plus queue metrics
    Status { name: Option<String> },
    /// Stop witness/forge and forbid daemon auto-restart
    Park { name: Option<String> },
    /// Clear the parked state
    Unpark { name: Option<String> },
}

fn resolve_name(ctx: &Context, name: Option<String>) -> Result<String> {
    name.or_else(|| ctx.location.role.warband().map(str::to_string))
        .ok_or_else(|| anyhow::anyhow!("not inside a warband; pass its name"))
}

async fn boot(ctx: &Context, name: &str) -> Result<()> {
    let config = ctx.ws.warband(name)?;
    let mut failed = false;
    if config.has_witness {
        let witness =
            WitnessManager::new(ctx.ws.clone(), name, ctx.mux.clone(), ctx.relics.clone())?;
        match witness.start(&StartOptions::default()).await {
            Ok(outcome) => print_outcome(&format!("{}/witness", name), outcome),
            Err(e) => {
                println!("{}/witness: failed: {}", name, e);
                failed = true;
            }
        }
    }
    if config.has_forge {
        let forge = ForgeManager::new(ctx.ws.clone(), name, ctx.mux.clone(), ctx.relics.clone())?;
        match forge.start(&StartOptions::default()).await {
            Ok(outcome) => print_outcome(&format!("{}/forge", name), outcome),
            Err(e) => {
                println!("{}/forge: failed: {}", name, e);
                failed = true;
            }
        }
    }
    if failed {
        return Err(ExitError::silent(1).into());
    }
    Ok(())
}

async fn stop(ctx: &Context, name: &str) -> Result<()> {
    let config = ctx.ws.warband(name)?;
    if config.has_witness {
        let witness =
            WitnessManager::new(ctx.ws.clone(), name, ctx.mux.clone(), ctx.relics.clone())?;
        let _ = witness.stop().await?;
    }
    if config.has_forge {
        let forge = ForgeManager::new(ctx.ws.clone(), name, ctx.mux.clone(), ctx.relics.clone())?;
        let _ = forge.stop().await?;
    }
    let raiders = stop_all_raiders(&ctx.ws, name, &ctx.mux, &ctx.relics).await?;
    let mut failed = false;
    for (session, outcome) in raiders {
        if let Err(e) = outcome {
            println!("{}: failed: {}", session, e);
            failed = true;
        }
    }
    println!("{}: stopped", name);
    if failed {
        return Err(ExitError::silent(1).into());
    }
    Ok(())
}

fn print_outcome(label: &str, outcome: StartOutcome) {
    crate::commands::agents::print_start_outcome(label, outcome);
}

pub async fn handle(command: WarbandCommand, ctx: &Context) -> Result<()> {
    match command {
        WarbandCommand::Add {
            name,
            prefix,
            branch,
        } => {
            let mut registry = WarbandRegistry::load(ctx.ws.root())?;
            let mut config = WarbandConfig::new(&name, prefix)?;
            config.default_branch = branch;
            registry.add(config)?;
            registry.save(ctx.ws.root())?;

            // Scaffold the standard layout; the repository clone itself is
            // the operator's first move inside it.
            let band = ctx.ws.root().join(&name);
            for sub in ["witness", "forge", "warchief", "raiders", "clan", ".relics"] {
                std::fs::create_dir_all(band.join(sub))?;
            }
            println!("warband {} registered", name);
        }
        WarbandCommand::List => {
            let registry = WarbandRegistry::load(ctx.ws.root())?;
            if registry.warbands.is_empty() {
                println!("No warbands");
            }
            for config in registry.sorted() {
                println!(
                    "{:<20} prefix={:<6} branch={:<12} witness={} forge={} crew={}",
                    config.name,
                    config.bead_prefix,
                    config.default_branch,
                    config.has_witness,
                    config.has_forge,
                    config.crew.len(),
                );
            }
        }
        WarbandCommand::Remove { name } => {
            let mut registry = WarbandRegistry::load(ctx.ws.root())?;
            registry.remove(&name)?;
            registry.save(ctx.ws.root())?;
            println!("warband {} deregistered (files kept)", name);
        }
        WarbandCommand::Boot { name } | WarbandCommand::Start { name } => {
            let name = resolve_name(ctx, name)?;
            boot(ctx, &name).await?;
        }
        WarbandCommand::Stop { name } | WarbandCommand::Shutdown { name } => {
            let name = resolve_name(ctx, name)?;
            stop(ctx, &name).await?;
        }
        WarbandCommand::Restart { name } => {
            let name = resolve_name(ctx, name)?;
            stop(ctx, &name).await?;
            boot(ctx, &name).await?;
        }
        WarbandCommand::Reset { name } => {
            let name = resolve_name(ctx, name)?;
            let reset = ctx.fleet().reset_stale_work(&name).await?;
            if reset.is_empty() {
                println!("{}: nothing stale", name);
            } else {
                for raider in reset {
                    println!("{}/{}: stale work reset", name, raider);
                }
            }
        }
        WarbandCommand::Status { name } => {
            let name = resolve_name(ctx, name)?;
            let config = ctx.ws.warband(&name)?;
            if config.has_witness {
                let witness =
                    WitnessManager::new(ctx.ws.clone(), &name, ctx.mux.clone(), ctx.relics.clone())?;
                let status = witness.status().await?;
                let monitored = witness.monitored_raiders().await.unwrap_or_default();
                println!(
                    "{}/witness: {:?} (monitoring {} raider(s))",
                    name,
                    status.state,
                    monitored.len()
                );
            }
            if config.has_forge {
                let forge =
                    ForgeManager::new(ctx.ws.clone(), &name, ctx.mux.clone(), ctx.relics.clone())?;
                let status = forge.status().await?;
                let depth = forge.queue_depth().await.unwrap_or(0);
                println!("{}/forge: {:?} (queue depth {})", name, status.state, depth);
            }
            let store = config
                .dir(ctx.ws.root())
                .join(hd_adapters::relics::RELICS_DIR_NAME);
            let pinned = ctx
                .relics
                .list(
                    &store,
                    IssueFilter {
                        status: Some(IssueStatus::Pinned),
                        ..IssueFilter::default()
                    },
                )
                .await
                .map(|v| v.len())
                .unwrap_or(0);
            println!("{}: {} pinned bead(s)", name, pinned);
        }
        WarbandCommand::Park { name } => {
            let name = resolve_name(ctx, name)?;
            ctx.fleet().park(&name).await?;
            println!("{}: parked", name);
        }
        WarbandCommand::Unpark { name } => {
            let name = resolve_name(ctx, name)?;
            ctx.fleet().unpark(&name)?;
            println!("{}: unparked", name);
        }
    }
    Ok(())
}
