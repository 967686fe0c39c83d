// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hd peek` - Peek at an agent's pane

use crate::context::Context;
use crate::exit_error::ExitError;
use anyhow::Result;
use clap::Args;
use hd_adapters::Multiplexer;
use hd_engine::resolve_target_spec;

#[derive(Args)]
pub struct PeekArgs {
    /// Agent path or role (e.g. `greenplace/toast`, `warchief`)
    pub addr: String,

    /// Number of lines
    #[arg(default_value = "40")]
    pub lines: u32,
}

pub async fn handle(args: PeekArgs, ctx: &Context) -> Result<()> {
    let role = resolve_target_spec(&ctx.ws, &args.addr)?;
    let session = role
        .session_name()
        .ok_or_else(|| anyhow::anyhow!("{} has no session", args.addr))?;

    if !ctx.mux.has_session(session.as_str()).await? {
        println!("no session for {}", args.addr);
        return Err(ExitError::silent(1).into());
    }

    let output = ctx.mux.capture_pane(session.as_str(), args.lines).await?;
    println!("╭──── peek: {} ────", session);
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    println!("╰──── end peek ────");
    Ok(())
}
