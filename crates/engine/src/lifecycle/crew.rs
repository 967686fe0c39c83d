// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crew lifecycle manager: persistent per-user workspaces.

use super::{AgentBase, AgentStatus, Lifecycle, StartOptions, StartOutcome, StopOutcome};
use crate::error::EngineError;
use crate::workspace::Workspace;
use async_trait::async_trait;
use hd_adapters::{Multiplexer, Vcs};
use hd_core::{validate_name, Role, SessionName, WarbandRegistry};
use std::path::{Path, PathBuf};

/// Branch name for a crew member's worktree.
fn crew_branch(name: &str) -> String {
    format!("clan/{}", name)
}

/// Manager for one persistent crew member.
#[derive(Clone)]
pub struct CrewManager<M, V> {
    base: AgentBase<M>,
    vcs: V,
    warband: String,
    name: String,
}

impl<M: Multiplexer, V: Vcs> CrewManager<M, V> {
    pub fn new(
        ws: Workspace,
        warband: &str,
        name: &str,
        mux: M,
        vcs: V,
    ) -> Result<Self, EngineError> {
        validate_name(name)?;
        ws.warband(warband)?;
        let role = Role::Crew {
            warband: warband.to_string(),
            name: name.to_string(),
        };
        Ok(Self {
            base: AgentBase::new(ws, role, mux)?,
            vcs,
            warband: warband.to_string(),
            name: name.to_string(),
        })
    }

    fn warchief_clone(&self) -> Result<PathBuf, EngineError> {
        let config = self.base.ws.warband(&self.warband)?;
        Ok(self.base.ws.warchief_clone(config))
    }

    /// Create the crew workspace: a worktree + branch pair carved out of
    /// the warchief's clone, then a registry entry.
    pub async fn add(&self) -> Result<(), EngineError> {
        let clone = self.warchief_clone()?;
        let config = self.base.ws.warband(&self.warband)?;
        let base_branch = config.default_branch.clone();

        self.vcs
            .worktree_add_new_branch(
                &clone,
                &self.base.workdir,
                &crew_branch(&self.name),
                &base_branch,
            )
            .await?;

        let root = self.base.ws.root().to_path_buf();
        let mut registry = WarbandRegistry::load(&root)?;
        if let Some(entry) = registry.get_mut(&self.warband) {
            if !entry.crew.contains(&self.name) {
                entry.crew.push(self.name.clone());
                entry.crew.sort();
            }
        }
        registry.save(&root)?;
        tracing::info!(warband = %self.warband, crew = %self.name, "crew workspace created");
        Ok(())
    }

    /// Destroy the crew workspace: stop any session, remove the worktree
    /// and branch, deregister.
    pub async fn remove(&self) -> Result<(), EngineError> {
        let _ = self.stop().await?;

        let clone = self.warchief_clone()?;
        self.vcs.worktree_remove(&clone, &self.base.workdir).await?;
        self.vcs
            .delete_branch(&clone, &crew_branch(&self.name))
            .await?;

        let root = self.base.ws.root().to_path_buf();
        let mut registry = WarbandRegistry::load(&root)?;
        if let Some(entry) = registry.get_mut(&self.warband) {
            entry.crew.retain(|c| c != &self.name);
        }
        registry.save(&root)?;
        tracing::info!(warband = %self.warband, crew = %self.name, "crew workspace removed");
        Ok(())
    }
}

#[async_trait]
impl<M: Multiplexer, V: Vcs> Lifecycle for CrewManager<M, V> {
    fn role(&self) -> &Role {
        &self.base.role
    }

    fn session_name(&self) -> &SessionName {
        &self.base.session
    }

    fn workdir(&self) -> &Path {
        &self.base.workdir
    }

    async fn start(&self, opts: &StartOptions) -> Result<StartOutcome, EngineError> {
        let outcome = self.base.start(opts).await?;
        // A fresh start supersedes any recorded stop
        super::clear_state_record(&self.base.workdir);
        Ok(outcome)
    }

    async fn stop(&self) -> Result<StopOutcome, EngineError> {
        let outcome = self.base.stop().await?;
        // Persistent identity: record the deliberate stop so later readers
        // can tell it apart from a crashed session
        if outcome == StopOutcome::Stopped {
            super::record_stopped(&self.base.workdir);
        }
        Ok(outcome)
    }

    async fn status(&self) -> Result<AgentStatus, EngineError> {
        self.base.status().await
    }
}

#[cfg(test)]
#[path = "crew_tests.rs"]
mod tests;
