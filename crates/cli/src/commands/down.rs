// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hd down` / `hd shutdown` - Level-gated shutdown

use crate::context::Context;
use crate::exit_error::ExitError;
use anyhow::Result;
use clap::Args;
use hd_engine::{ShutdownOptions, ShutdownReport};

#[derive(Args)]
pub struct DownArgs {
    /// Also stop raider sessions
    #[arg(long)]
    pub raiders: bool,

    /// Also stop the daemon and verify nothing respawns
    #[arg(long)]
    pub all: bool,

    /// Kill the entire multiplexer server (requires HD_NUKE_ACKNOWLEDGED=1)
    #[arg(long)]
    pub nuke: bool,

    /// Discard uncommitted raider work instead of refusing
    #[arg(long)]
    pub force: bool,

    /// Show what would be stopped without stopping anything
    #[arg(long)]
    pub dry_run: bool,

    /// Only print failures
    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct ShutdownArgs {
    /// Also stop the daemon and verify nothing respawns
    #[arg(long)]
    pub all: bool,

    /// Only stop raider sessions
    #[arg(long)]
    pub raiders_only: bool,

    /// Discard uncommitted raider work instead of refusing (LOSES WORK)
    #[arg(long)]
    pub nuclear: bool,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,

    /// Alias for --nuclear
    #[arg(long)]
    pub force: bool,
}

pub async fn handle_down(args: DownArgs, ctx: &Context) -> Result<()> {
    let opts = ShutdownOptions {
        stop_raiders: args.raiders || args.nuke,
        raiders_only: false,
        cleanup_worktrees: false,
        stop_daemon: args.all || args.nuke,
        nuke: args.nuke,
        nuclear: args.force,
        dry_run: args.dry_run,
    };
    let report = ctx.shutdown().run(&opts).await?;
    render(&report, args.quiet);
    if !report.ok() {
        return Err(ExitError::silent(1).into());
    }
    Ok(())
}

pub async fn handle_shutdown(args: ShutdownArgs, ctx: &Context) -> Result<()> {
    if !args.yes && !confirm("Shut down the whole encampment (raiders included)?")? {
        println!("aborted");
        return Ok(());
    }
    let opts = ShutdownOptions {
        stop_raiders: true,
        raiders_only: args.raiders_only,
        cleanup_worktrees: !args.raiders_only,
        stop_daemon: true,
        nuke: false,
        nuclear: args.nuclear || args.force,
        dry_run: false,
    };
    let report = ctx.shutdown().run(&opts).await?;
    render(&report, false);
    if !report.ok() {
        return Err(ExitError::silent(1).into());
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    use std::io::Write;
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn render(report: &ShutdownReport, quiet: bool) {
    let verb = if report.dry_run { "would stop" } else { "stopped" };
    for (session, result) in &report.killed {
        match result {
            Ok(()) if !quiet => println!("{}: {}", verb, session),
            Ok(()) => {}
            Err(e) => println!("FAILED to stop {}: {}", session, e),
        }
    }
    for cleaned in &report.cleaned {
        if !quiet {
            println!("cleaned worktree: {}", cleaned);
        }
    }
    for warning in &report.cleanup_warnings {
        println!("warning: {}", warning);
    }
    if report.daemon_stopped && !quiet {
        println!("daemon stopped");
    }
    for session in &report.respawned {
        println!(
            "warning: {} respawned after shutdown (external supervisor suspected)",
            session
        );
    }
    if report.server_killed && !quiet {
        println!("multiplexer server killed");
    }
}
