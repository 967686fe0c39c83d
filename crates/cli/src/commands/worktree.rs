// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hd worktree` - Worktree helpers

use crate::context::Context;
use anyhow::Result;
use clap::{Args, Subcommand};
use hd_adapters::Vcs;

#[derive(Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct WorktreeArgs {
    /// Print the path of a warband worktree (your own when crew)
    pub warband: Option<String>,

    /// Print the bare path without a `cd` hint
    #[arg(long)]
    pub no_cd: bool,

    #[command(subcommand)]
    pub command: Option<WorktreeCommand>,
}

#[derive(Subcommand)]
pub enum WorktreeCommand {
    /// List agent worktrees of a warband
    List { warband: Option<String> },
    /// Remove a raider worktree and its branch
    Remove {
        warband: String,
        /// Raider name
        name: String,
        /// Remove even if the worktree is dirty
        #[arg(long)]
        nuclear: bool,
    },
}

pub async fn handle(args: WorktreeArgs, ctx: &Context) -> Result<()> {
    match args.command {
        None => {
            let warband = args
                .warband
                .ok_or_else(|| anyhow::anyhow!("pass a warband name or a subcommand"))?;
            let config = ctx.ws.warband(&warband)?;
            // Crew get their own workspace; everyone else the warchief clone
            let path = match (ctx.location.role.warband(), ctx.location.role.agent_name()) {
                (Some(own), Some(name)) if own == warband => ctx.ws.crew_dir(config, name),
                _ => ctx.ws.warchief_clone(config),
            };
            if args.no_cd {
                println!("{}", path.display());
            } else {
                println!("cd {}", path.display());
            }
        }
        Some(WorktreeCommand::List { warband }) => {
            let name = warband
                .or_else(|| ctx.location.role.warband().map(str::to_string))
                .ok_or_else(|| anyhow::anyhow!("not inside a warband; pass its name"))?;
            let config = ctx.ws.warband(&name)?;
            let band = config.dir(ctx.ws.root());
            for (kind, sub) in [("crew", "clan"), ("raider", "raiders")] {
                let Ok(entries) = std::fs::read_dir(band.join(sub)) else {
                    continue;
                };
                for entry in entries.filter_map(|e| e.ok()) {
                    if entry.path().is_dir() {
                        println!("{:<8} {}", kind, entry.path().display());
                    }
                }
            }
        }
        Some(WorktreeCommand::Remove {
            warband,
            name,
            nuclear,
        }) => {
            let config = ctx.ws.warband(&warband)?;
            let path = ctx.ws.raider_dir(config, &name);
            if !nuclear {
                let work = ctx.vcs.check_uncommitted(&path).await?;
                if !work.clean() {
                    anyhow::bail!(
                        "{}/{} has uncommitted work ({}); re-run with --nuclear to discard",
                        warband,
                        name,
                        work.summary()
                    );
                }
            }
            let clone = ctx.ws.warchief_clone(config);
            ctx.vcs.worktree_remove(&clone, &path).await?;
            if let Err(e) = ctx
                .vcs
                .delete_branch(&clone, &format!("raiders/{}", name))
                .await
            {
                tracing::warn!(error = %e, "branch delete failed");
            }
            println!("removed {}/{}", warband, name);
        }
    }
    Ok(())
}
