// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle commands: `hd start|restart` and the per-class groups
//! (`hd witness|forge|warchief|shaman …`).

use crate::commands::up::parse_key_value;
use crate::context::Context;
use anyhow::Result;
use clap::{Args, Subcommand};
use hd_adapters::Multiplexer;
use hd_engine::{
    resolve_target_spec, AgentState, CrewManager, ForgeManager, Lifecycle, RaiderManager,
    ShamanManager, StartOptions, StartOutcome, StopOutcome, WarchiefManager, WitnessManager,
};
use hd_core::Role;

#[derive(Args)]
pub struct StartArgs {
    /// Agent path or role (e.g. `greenplace/toast`, `warchief`);
    /// defaults to the agent whose directory you are in
    pub path: Option<String>,

    /// Runtime alias from the encampment config
    #[arg(long = "runtime")]
    pub runtime: Option<String>,

    /// Extra environment for the session (repeatable: --env K=V)
    #[arg(long = "env", value_parser = parse_key_value)]
    pub env: Vec<(String, String)>,

    /// Attach to the session after starting
    #[arg(long, short)]
    pub foreground: bool,
}

/// The four fixed (singleton-per-scope) classes.
#[derive(Debug, Clone, Copy)]
pub enum FixedRole {
    Witness,
    Forge,
    Warchief,
    Shaman,
}

#[derive(Args)]
pub struct AgentArgs {
    /// Warband (defaults to the one you are in)
    #[arg(long, global = true)]
    pub warband: Option<String>,

    #[command(subcommand)]
    pub command: AgentCommand,
}

#[derive(Subcommand)]
pub enum AgentCommand {
    /// Start the agent session
    Start {
        /// Runtime alias from the encampment config
        #[arg(long = "runtime")]
        runtime: Option<String>,
        /// Extra environment (repeatable: --env K=V)
        #[arg(long = "env", value_parser = parse_key_value)]
        env: Vec<(String, String)>,
    },
    /// Stop the agent session
    Stop,
    /// Restart the agent session
    Restart,
    /// Show the agent's state
    Status,
    /// Switch this client to the agent's session
    Summon,
}

/// Build the manager for any concrete role.
pub fn manager_for(ctx: &Context, role: &Role) -> Result<Box<dyn Lifecycle>> {
    let manager: Box<dyn Lifecycle> = match role {
        Role::Warchief => Box::new(WarchiefManager::new(ctx.ws.clone(), ctx.mux.clone())?),
        Role::Shaman => Box::new(ShamanManager::new(ctx.ws.clone(), ctx.mux.clone())?),
        Role::Witness { warband } => Box::new(WitnessManager::new(
            ctx.ws.clone(),
            warband,
            ctx.mux.clone(),
            ctx.relics.clone(),
        )?),
        Role::Forge { warband } => Box::new(ForgeManager::new(
            ctx.ws.clone(),
            warband,
            ctx.mux.clone(),
            ctx.relics.clone(),
        )?),
        Role::Raider { warband, name } => Box::new(RaiderManager::new(
            ctx.ws.clone(),
            warband,
            name,
            ctx.mux.clone(),
            ctx.relics.clone(),
        )?),
        Role::Crew { warband, name } => Box::new(CrewManager::new(
            ctx.ws.clone(),
            warband,
            name,
            ctx.mux.clone(),
            ctx.vcs.clone(),
        )?),
        Role::Unknown => anyhow::bail!("no agent here; pass a path or role to act on"),
    };
    Ok(manager)
}

pub fn print_start_outcome(label: &str, outcome: StartOutcome) {
    match outcome {
        StartOutcome::Started => println!("{}: started", label),
        StartOutcome::AlreadyRunning => println!("{}: already running", label),
        StartOutcome::Respawned => println!("{}: respawned", label),
    }
}

/// Attach the caller's terminal to a session (exec tmux attach).
pub fn attach(session: &str) -> Result<()> {
    let status = std::process::Command::new("tmux")
        .args(["attach", "-t", session])
        .status()?;
    if !status.success() {
        anyhow::bail!("failed to attach to session {}", session);
    }
    Ok(())
}

/// `hd start [path]` / `hd restart [path]`.
pub async fn handle_start(args: StartArgs, ctx: &Context, restart: bool) -> Result<()> {
    let role = match &args.path {
        Some(spec) => resolve_target_spec(&ctx.ws, spec)?,
        None => ctx.location.role.clone(),
    };
    let manager = manager_for(ctx, &role)?;
    let opts = StartOptions {
        runtime_alias: args.runtime,
        env_overrides: args.env,
        foreground: args.foreground,
    };

    let outcome = if restart {
        manager.restart(&opts).await?
    } else {
        manager.start(&opts).await?
    };
    print_start_outcome(&role.to_string(), outcome);

    if args.foreground {
        attach(manager.session_name().as_str())?;
    }
    Ok(())
}

fn fixed_role(ctx: &Context, fixed: FixedRole, warband_flag: Option<&str>) -> Result<Role> {
    match fixed {
        FixedRole::Warchief => Ok(Role::Warchief),
        FixedRole::Shaman => Ok(Role::Shaman),
        FixedRole::Witness | FixedRole::Forge => {
            let warband = warband_flag
                .map(str::to_string)
                .or_else(|| ctx.location.role.warband().map(str::to_string))
                .ok_or_else(|| {
                    anyhow::anyhow!("not inside a warband; pass --warband <name>")
                })?;
            Ok(match fixed {
                FixedRole::Witness => Role::Witness { warband },
                _ => Role::Forge { warband },
            })
        }
    }
}

/// `hd witness|forge|warchief|shaman <command>`.
pub async fn handle_fixed(args: AgentArgs, ctx: &Context, fixed: FixedRole) -> Result<()> {
    let role = fixed_role(ctx, fixed, args.warband.as_deref())?;
    let manager = manager_for(ctx, &role)?;
    let label = role.to_string();

    match args.command {
        AgentCommand::Start { runtime, env } => {
            let opts = StartOptions {
                runtime_alias: runtime,
                env_overrides: env,
                foreground: false,
            };
            let outcome = manager.start(&opts).await?;
            print_start_outcome(&label, outcome);
        }
        AgentCommand::Stop => match manager.stop().await? {
            StopOutcome::Stopped => println!("{}: stopped", label),
            StopOutcome::NotRunning => println!("{}: not running", label),
        },
        AgentCommand::Restart => {
            let outcome = manager.restart(&StartOptions::default()).await?;
            print_start_outcome(&label, outcome);
        }
        AgentCommand::Status => {
            let status = manager.status().await?;
            let state = match status.state {
                AgentState::Running => "running",
                AgentState::Paused => "paused (runtime exited)",
                AgentState::Stopped => "stopped",
            };
            println!("{}: {} ({})", label, state, status.session);
        }
        AgentCommand::Summon => {
            let session = manager.session_name().as_str().to_string();
            if ctx.mux.is_inside() {
                ctx.mux.switch_client(&session).await?;
            } else {
                attach(&session)?;
            }
        }
    }
    Ok(())
}
