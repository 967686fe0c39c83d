// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command context: resolved workspace, caller location, and the
//! production adapter set.

use anyhow::Result;
use hd_adapters::{DrumsCli, GitVcs, RelicsCli, TmuxMux};
use hd_engine::{
    find_root, resolve_location, EnvOverrides, Fleet, HandoffEngine, HookRouter, Rally,
    RoleLocation, ShutdownCoordinator, Workspace,
};

/// Everything a command handler needs.
pub struct Context {
    pub ws: Workspace,
    pub location: RoleLocation,
    pub mux: TmuxMux,
    pub relics: RelicsCli,
    pub drums: DrumsCli,
    pub vcs: GitVcs,
}

impl Context {
    /// Resolve the encampment from cwd and env. The location-mismatch
    /// warning, if any, goes to stderr here so every command carries it.
    pub fn open() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let cwd = std::env::current_dir()?;
        let root = find_root(&cwd, &env)?;
        let ws = Workspace::open(root)?;
        let location = resolve_location(&ws, &cwd, &env);
        if let Some(warning) = &location.mismatch {
            eprintln!("warning: {}", warning);
        }
        Ok(Self {
            ws,
            location,
            mux: TmuxMux::new(),
            relics: RelicsCli::new(),
            drums: DrumsCli::new(),
            vcs: GitVcs::new(),
        })
    }

    pub fn fleet(&self) -> Fleet<TmuxMux, RelicsCli, GitVcs> {
        Fleet::new(
            self.ws.clone(),
            self.mux.clone(),
            self.relics.clone(),
            self.vcs.clone(),
        )
    }

    pub fn shutdown(&self) -> ShutdownCoordinator<TmuxMux, GitVcs> {
        ShutdownCoordinator::new(self.ws.clone(), self.mux.clone(), self.vcs.clone())
    }

    pub fn hook_router(&self) -> HookRouter<RelicsCli> {
        HookRouter::new(self.ws.clone(), self.relics.clone())
    }

    pub fn handoff_engine(&self) -> HandoffEngine<TmuxMux, RelicsCli, DrumsCli> {
        HandoffEngine::new(
            self.ws.clone(),
            self.mux.clone(),
            self.relics.clone(),
            self.drums.clone(),
        )
    }

    pub fn rally_engine(&self) -> Rally<RelicsCli, DrumsCli> {
        Rally::new(self.ws.clone(), self.relics.clone(), self.drums.clone())
    }
}
