// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hd crew` - Crew management

use crate::context::Context;
use anyhow::Result;
use clap::{Args, Subcommand};
use hd_adapters::{GitVcs, TmuxMux};
use hd_engine::{CrewManager, Lifecycle, StartOptions};

#[derive(Args)]
pub struct CrewArgs {
    /// Warband (defaults to the one you are in)
    #[arg(long, global = true)]
    pub warband: Option<String>,

    #[command(subcommand)]
    pub command: CrewCommand,
}

#[derive(Subcommand)]
pub enum CrewCommand {
    /// Create a crew workspace (worktree + branch) and register it
    Add { name: String },
    /// List crew of the warband
    List,
    /// Start a crew member's session
    Start { name: String },
    /// Remove a crew workspace, branch, and registration
    Remove { name: String },
}

fn resolve_warband(ctx: &Context, flag: Option<&str>) -> Result<String> {
    flag.map(str::to_string)
        .or_else(|| ctx.location.role.warband().map(str::to_string))
        .ok_or_else(|| anyhow::anyhow!("not inside a warband; pass --warband <name>"))
}

fn manager(ctx: &Context, warband: &str, name: &str) -> Result<CrewManager<TmuxMux, GitVcs>> {
    Ok(CrewManager::new(
        ctx.ws.clone(),
        warband,
        name,
        ctx.mux.clone(),
        ctx.vcs.clone(),
    )?)
}

pub async fn handle(args: CrewArgs, ctx: &Context) -> Result<()> {
    let warband = resolve_warband(ctx, args.warband.as_deref())?;
    match args.command {
        CrewCommand::Add { name } => {
            manager(ctx, &warband, &name)?.add().await?;
            println!("{}/clan/{}: created", warband, name);
        }
        CrewCommand::List => {
            let config = ctx.ws.warband(&warband)?;
            if config.crew.is_empty() {
                println!("No crew in {}", warband);
            }
            for name in &config.crew {
                println!("{}/clan/{}", warband, name);
            }
        }
        CrewCommand::Start { name } => {
            let outcome = manager(ctx, &warband, &name)?
                .start(&StartOptions::default())
                .await?;
            crate::commands::agents::print_start_outcome(
                &format!("{}/clan/{}", warband, name),
                outcome,
            );
        }
        CrewCommand::Remove { name } => {
            manager(ctx, &warband, &name)?.remove().await?;
            println!("{}/clan/{}: removed", warband, name);
        }
    }
    Ok(())
}
