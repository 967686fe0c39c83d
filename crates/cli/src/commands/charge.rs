// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hd charge` - Pin a bead onto an agent's hook

use crate::context::Context;
use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct ChargeArgs {
    /// Bead id (e.g. `gp-task-001`)
    pub bead: String,

    /// Target agent path or role; defaults to your own agent
    pub target: Option<String>,
}

pub async fn handle(args: ChargeArgs, ctx: &Context) -> Result<()> {
    let outcome = ctx
        .hook_router()
        .charge(&args.bead, args.target.as_deref(), &ctx.location)
        .await?;

    let address = outcome
        .target
        .address()
        .map(|a| a.into_inner())
        .unwrap_or_else(|| "unknown".to_string());
    println!(
        "{} pinned on {} (autonomous at next rally)",
        outcome.bead, address
    );
    Ok(())
}
