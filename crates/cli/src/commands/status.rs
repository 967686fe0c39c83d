// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hd status` - Fleet status

use crate::context::Context;
use crate::exit_error::ExitError;
use crate::output::OutputFormat;
use anyhow::Result;
use clap::Args;
use hd_engine::{AgentState, DaemonState, FleetStatus};

#[derive(Args)]
pub struct StatusArgs {
    /// Structured output (exits silently on error)
    #[arg(long)]
    pub json: bool,

    /// Include session names and workdirs
    #[arg(long, short)]
    pub verbose: bool,
}

pub async fn handle(args: StatusArgs, ctx: &Context, format: OutputFormat) -> Result<()> {
    let json = args.json || format == OutputFormat::Json;
    let status = match ctx.fleet().status().await {
        Ok(status) => status,
        Err(e) if json => {
            // Structured consumers get no stray error text on stdout
            eprintln!("{}", e);
            return Err(ExitError::silent(1).into());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&to_json(&status))?);
        return Ok(());
    }

    println!(
        "daemon: {}",
        match status.daemon {
            DaemonState::Running(pid) => format!("running (pid {})", pid),
            DaemonState::Stopped => "stopped".to_string(),
        }
    );
    for agent in &status.agents {
        let state = match agent.state {
            AgentState::Running => "running",
            AgentState::Paused => "paused",
            AgentState::Stopped => "stopped",
        };
        if args.verbose {
            println!("{:<40} {:<10} {}", agent.role.to_string(), state, agent.session);
        } else {
            println!("{:<40} {}", agent.role.to_string(), state);
        }
    }
    Ok(())
}

fn to_json(status: &FleetStatus) -> serde_json::Value {
    serde_json::json!({
        "daemon": match status.daemon {
            DaemonState::Running(pid) => serde_json::json!({"state": "running", "pid": pid}),
            DaemonState::Stopped => serde_json::json!({"state": "stopped"}),
        },
        "agents": status.agents.iter().map(|a| serde_json::json!({
            "role": a.role,
            "address": a.role.address().map(|x| x.into_inner()),
            "session": a.session.as_str(),
            "state": a.state,
        })).collect::<Vec<_>>(),
    })
}
