// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! hd - Horde control plane CLI

mod context;
mod exit_error;
mod output;

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{
    agents, charge, crew, down, drums, escalate, handoff, peek, rally, session, status, up,
    warband, worktree,
};
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "hd",
    version,
    about = "Horde - a control plane for cohorts of coding agents"
)]
struct Cli {
    /// Change to <dir> before doing anything
    #[arg(short = 'C', global = true, value_name = "DIR")]
    directory: Option<std::path::PathBuf>,

    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Boot the encampment (daemon, shaman, warchief, warband agents)
    Up(up::UpArgs),
    /// Stop the fleet (see also `shutdown`)
    Down(down::DownArgs),
    /// Full shutdown: fleet, raiders, worktree cleanup, daemon
    Shutdown(down::ShutdownArgs),
    /// Fleet status
    Status(status::StatusArgs),
    /// Start the agent at a path or role (defaults to here)
    Start(agents::StartArgs),
    /// Restart the agent at a path or role (defaults to here)
    Restart(agents::StartArgs),
    /// Warband management
    Warband(warband::WarbandArgs),
    /// Crew management
    Crew(crew::CrewArgs),
    /// Raider session management
    Raider(session::SessionArgs),
    /// Session management (alias surface over raiders)
    Session(session::SessionArgs),
    /// Witness lifecycle
    Witness(agents::AgentArgs),
    /// Forge lifecycle
    Forge(agents::AgentArgs),
    /// Warchief lifecycle
    Warchief(agents::AgentArgs),
    /// Shaman lifecycle
    Shaman(agents::AgentArgs),
    /// Pin a bead onto an agent's hook
    Charge(charge::ChargeArgs),
    /// Replace a live session with a fresh process, in place
    Handoff(handoff::HandoffArgs),
    /// Print the session-start banner
    Rally(rally::RallyArgs),
    /// Peek at an agent's pane
    Peek(peek::PeekArgs),
    /// Message bus passthrough
    Drums(drums::DrumsArgs),
    /// Escalate an issue to the warchief
    Escalate(escalate::EscalateArgs),
    /// Worktree helpers
    Worktree(worktree::WorktreeArgs),
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(e) = run().await {
        let code = e.downcast_ref::<exit_error::ExitError>().map_or(1, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(code);
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_env("HD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains the source error text, we skip
/// the "Caused by" chain to avoid noisy duplicate output (common when
/// thiserror variants use `#[error("... {0}")]` with `#[from]`).
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }
    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.output;

    // Apply -C: change working directory before workspace discovery
    if let Some(ref dir) = cli.directory {
        let canonical = std::fs::canonicalize(dir).map_err(|e| {
            anyhow::anyhow!("cannot change to directory '{}': {}", dir.display(), e)
        })?;
        std::env::set_current_dir(&canonical).map_err(|e| {
            anyhow::anyhow!(
                "cannot change to directory '{}': {}",
                canonical.display(),
                e
            )
        })?;
    }

    let ctx = context::Context::open()?;

    match cli.command {
        Commands::Up(args) => up::handle(args, &ctx).await,
        Commands::Down(args) => down::handle_down(args, &ctx).await,
        Commands::Shutdown(args) => down::handle_shutdown(args, &ctx).await,
        Commands::Status(args) => status::handle(args, &ctx, format).await,
        Commands::Start(args) => agents::handle_start(args, &ctx, false).await,
        Commands::Restart(args) => agents::handle_start(args, &ctx, true).await,
        Commands::Warband(args) => warband::handle(args.command, &ctx).await,
        Commands::Crew(args) => crew::handle(args, &ctx).await,
        Commands::Raider(args) | Commands::Session(args) => session::handle(args, &ctx).await,
        Commands::Witness(args) => agents::handle_fixed(args, &ctx, agents::FixedRole::Witness).await,
        Commands::Forge(args) => agents::handle_fixed(args, &ctx, agents::FixedRole::Forge).await,
        Commands::Warchief(args) => {
            agents::handle_fixed(args, &ctx, agents::FixedRole::Warchief).await
        }
        Commands::Shaman(args) => agents::handle_fixed(args, &ctx, agents::FixedRole::Shaman).await,
        Commands::Charge(args) => charge::handle(args, &ctx).await,
        Commands::Handoff(args) => handoff::handle(args, &ctx).await,
        Commands::Rally(args) => rally::handle(args, &ctx, format).await,
        Commands::Peek(args) => peek::handle(args, &ctx).await,
        Commands::Drums(args) => drums::handle(args.command, &ctx, format).await,
        Commands::Escalate(args) => escalate::handle(args, &ctx).await,
        Commands::Worktree(args) => worktree::handle(args, &ctx).await,
    }
}
