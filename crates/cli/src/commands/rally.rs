// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hd rally` - Session-start banner

use crate::context::Context;
use crate::exit_error::ExitError;
use crate::output::OutputFormat;
use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct RallyArgs {
    /// Print the full banner (default)
    #[arg(long)]
    pub banner: bool,

    /// Resolve and explain role/location without acquiring anything
    #[arg(long)]
    pub explain: bool,

    /// Alias of --explain
    #[arg(long)]
    pub dry_run: bool,

    /// Print only the mode (autonomous|normal)
    #[arg(long)]
    pub state: bool,

    /// Structured banner output
    #[arg(long)]
    pub json: bool,
}

pub async fn handle(args: RallyArgs, ctx: &Context, format: OutputFormat) -> Result<()> {
    if args.explain || args.dry_run {
        let location = &ctx.location;
        println!("role: {}", location.role.class_str());
        if let Some(warband) = location.role.warband() {
            println!("warband: {}", warband);
        }
        if let Some(name) = location.role.agent_name() {
            println!("name: {}", name);
        }
        println!("home: {}", location.home_dir.display());
        println!("source: {:?}", location.source);
        if let Some(warning) = &location.mismatch {
            println!("warning: {}", warning);
        }
        return Ok(());
    }

    let banner = ctx.rally_engine().rally(&ctx.location).await?;

    if args.state {
        println!(
            "{}",
            if banner.autonomous() {
                "autonomous"
            } else {
                "normal"
            }
        );
        return Ok(());
    }

    if args.json || format == OutputFormat::Json {
        match serde_json::to_string_pretty(&banner) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{}", e);
                return Err(ExitError::silent(1).into());
            }
        }
        return Ok(());
    }

    print!("{}", banner.render());
    Ok(())
}
