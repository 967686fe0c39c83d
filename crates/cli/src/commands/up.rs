// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hd up` - Boot the encampment

use crate::context::Context;
use crate::exit_error::ExitError;
use anyhow::Result;
use clap::Args;
use hd_engine::{StartOptions, StdoutReporter, UpOptions};

#[derive(Args)]
pub struct UpArgs {
    /// Also restore crew (per startup preference) and raiders with
    /// pinned work
    #[arg(long)]
    pub restore: bool,

    /// Runtime alias from the encampment config
    #[arg(long = "runtime")]
    pub runtime: Option<String>,

    /// Extra environment for started sessions (repeatable: --env K=V)
    #[arg(long = "env", value_parser = parse_key_value)]
    pub env: Vec<(String, String)>,
}

/// Parse a K=V pair.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {:?}", s)),
    }
}

pub async fn handle(args: UpArgs, ctx: &Context) -> Result<()> {
    let opts = UpOptions {
        restore: args.restore,
        start: StartOptions {
            runtime_alias: args.runtime,
            env_overrides: args.env,
            foreground: false,
        },
    };

    let report = ctx.fleet().up(&opts, &StdoutReporter::new()).await?;
    if !report.ok() {
        return Err(ExitError::silent(1).into());
    }
    Ok(())
}
