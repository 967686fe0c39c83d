// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hd handoff` - Replace a live session's process in place

use crate::context::Context;
use anyhow::Result;
use clap::Args;
use hd_core::parse_address;
use hd_engine::HandoffOptions;

#[derive(Args)]
pub struct HandoffArgs {
    /// Bead to pre-pin, or a target role/path for a remote handoff
    pub bead_or_role: Option<String>,

    /// Subject for the handoff self-bead
    #[arg(short = 's', long)]
    pub subject: Option<String>,

    /// Message body for the handoff self-bead
    #[arg(short = 'm', long)]
    pub message: Option<String>,

    /// Collect a capture of the outgoing pane into the self-bead
    #[arg(short = 'c', long)]
    pub collect: bool,

    /// After a remote handoff, switch this client to the target
    #[arg(short = 'w', long)]
    pub watch: bool,

    /// Print the exact respawn command without any side effects
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

pub async fn handle(args: HandoffArgs, ctx: &Context) -> Result<()> {
    // The positional is a target when it reads as a role or address,
    // otherwise a bead id.
    let (bead, target) = match args.bead_or_role {
        Some(value) if parse_address(&value).is_some() => (None, Some(value)),
        Some(value) => (Some(value), None),
        None => (None, None),
    };

    let opts = HandoffOptions {
        bead,
        target,
        subject: args.subject,
        message: args.message,
        collect: args.collect,
        watch: args.watch,
        dry_run: args.dry_run,
    };
    let report = ctx.handoff_engine().handoff(&ctx.location, &opts).await?;

    if report.dry_run {
        println!("{}", report.command);
        return Ok(());
    }
    println!(
        "handed {} off in place (pane {})",
        report.session, report.pane
    );
    if let Some(bead) = report.self_bead {
        println!("self-bead pinned: {}", bead);
    }
    Ok(())
}
