// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hd session` / `hd raider` - Raider session management

use crate::context::Context;
use crate::exit_error::ExitError;
use anyhow::Result;
use clap::{Args, Subcommand};
use hd_adapters::{Multiplexer, RelicsCli, TmuxMux};
use hd_engine::{
    list_raider_sessions, stop_all_raiders, Lifecycle, RaiderManager, StartOptions, StopOutcome,
};

#[derive(Args)]
pub struct SessionArgs {
    /// Warband (defaults to the one you are in)
    #[arg(long, global = true)]
    pub warband: Option<String>,

    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Start a raider session
    Start { name: String },
    /// Stop a raider session
    Stop { name: String },
    /// Restart a raider session
    Restart { name: String },
    /// Attach to a raider session
    At { name: String },
    /// Switch this client to a raider session
    Summon { name: String },
    /// List live raider sessions of the warband
    List,
    /// Capture the last lines of a raider's pane
    Capture {
        name: String,
        /// Number of lines
        #[arg(default_value = "40")]
        lines: u32,
    },
    /// Type text into a raider's pane (Enter appended)
    Inject { name: String, text: String },
    /// Show a raider's state
    Status { name: String },
    /// Check raiders for stale pinned work and reset it
    Check,
    /// Stop every raider session of the warband
    StopAll {
        /// Also discard uncommitted work checks (plain session stop)
        #[arg(long)]
        force: bool,
    },
}

fn resolve_warband(ctx: &Context, flag: Option<&str>) -> Result<String> {
    flag.map(str::to_string)
        .or_else(|| ctx.location.role.warband().map(str::to_string))
        .ok_or_else(|| anyhow::anyhow!("not inside a warband; pass --warband <name>"))
}

fn manager(ctx: &Context, warband: &str, name: &str) -> Result<RaiderManager<TmuxMux, RelicsCli>> {
    Ok(RaiderManager::new(
        ctx.ws.clone(),
        warband,
        name,
        ctx.mux.clone(),
        ctx.relics.clone(),
    )?)
}

pub async fn handle(args: SessionArgs, ctx: &Context) -> Result<()> {
    let warband = resolve_warband(ctx, args.warband.as_deref())?;
    match args.command {
        SessionCommand::Start { name } => {
            let outcome = manager(ctx, &warband, &name)?
                .start(&StartOptions::default())
                .await?;
            crate::commands::agents::print_start_outcome(&format!("{}/{}", warband, name), outcome);
        }
        SessionCommand::Stop { name } => match manager(ctx, &warband, &name)?.stop().await? {
            StopOutcome::Stopped => println!("{}/{}: stopped", warband, name),
            StopOutcome::NotRunning => println!("{}/{}: not running", warband, name),
        },
        SessionCommand::Restart { name } => {
            let outcome = manager(ctx, &warband, &name)?
                .restart(&StartOptions::default())
                .await?;
            crate::commands::agents::print_start_outcome(&format!("{}/{}", warband, name), outcome);
        }
        SessionCommand::At { name } => {
            let raider = manager(ctx, &warband, &name)?;
            crate::commands::agents::attach(raider.session_name().as_str())?;
        }
        SessionCommand::Summon { name } => {
            let raider = manager(ctx, &warband, &name)?;
            if ctx.mux.is_inside() {
                raider.summon().await?;
            } else {
                crate::commands::agents::attach(raider.session_name().as_str())?;
            }
        }
        SessionCommand::List => {
            let sessions = list_raider_sessions(&ctx.mux, &warband).await?;
            if sessions.is_empty() {
                println!("No raider sessions in {}", warband);
                return Err(ExitError::silent(1).into());
            }
            for session in sessions {
                println!("{}", session);
            }
        }
        SessionCommand::Capture { name, lines } => {
            let output = manager(ctx, &warband, &name)?.capture(lines).await?;
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
        }
        SessionCommand::Inject { name, text } => {
            manager(ctx, &warband, &name)?.inject(&text).await?;
            println!("{}/{}: injected", warband, name);
        }
        SessionCommand::Status { name } => {
            let status = manager(ctx, &warband, &name)?.status().await?;
            println!("{}/{}: {:?}", warband, name, status.state);
        }
        SessionCommand::Check => {
            let reset = ctx.fleet().reset_stale_work(&warband).await?;
            if reset.is_empty() {
                println!("{}: all raider work accounted for", warband);
            } else {
                for name in reset {
                    println!("{}/{}: stale work reset", warband, name);
                }
            }
        }
        SessionCommand::StopAll { force } => {
            if !force {
                println!("note: sessions are stopped; worktrees and uncommitted work stay put");
            }
            let results = stop_all_raiders(&ctx.ws, &warband, &ctx.mux, &ctx.relics).await?;
            let mut failed = false;
            for (session, outcome) in results {
                match outcome {
                    Ok(StopOutcome::Stopped) => println!("stopped: {}", session),
                    Ok(StopOutcome::NotRunning) => {}
                    Err(e) => {
                        println!("FAILED to stop {}: {}", session, e);
                        failed = true;
                    }
                }
            }
            if failed {
                return Err(ExitError::silent(1).into());
            }
        }
    }
    Ok(())
}
