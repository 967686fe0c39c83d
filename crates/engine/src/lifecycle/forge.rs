// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forge lifecycle manager.

use super::{AgentBase, AgentStatus, Lifecycle, StartOptions, StartOutcome, StopOutcome};
use crate::error::EngineError;
use crate::workspace::Workspace;
use async_trait::async_trait;
use hd_adapters::relics::RELICS_DIR_NAME;
use hd_adapters::{IssueStore, Multiplexer};
use hd_core::{IssueFilter, IssueStatus, Role, SessionName};
use std::path::{Path, PathBuf};

/// Manager for a warband's merge-queue processor.
#[derive(Clone)]
pub struct ForgeManager<M, I> {
    base: AgentBase<M>,
    relics: I,
    relics_dir: PathBuf,
}

impl<M: Multiplexer, I: IssueStore> ForgeManager<M, I> {
    pub fn new(ws: Workspace, warband: &str, mux: M, relics: I) -> Result<Self, EngineError> {
        let config = ws.warband(warband)?;
        let relics_dir = config.dir(ws.root()).join(RELICS_DIR_NAME);
        let role = Role::Forge {
            warband: warband.to_string(),
        };
        Ok(Self {
            base: AgentBase::new(ws, role, mux)?,
            relics,
            relics_dir,
        })
    }

    /// Open work currently assigned to the forge.
    pub async fn queue_depth(&self) -> Result<usize, EngineError> {
        let address = self
            .base
            .role
            .address()
            .ok_or_else(|| EngineError::NoRoleHere(self.base.workdir.clone()))?;
        let mut depth = 0;
        for status in [IssueStatus::Open, IssueStatus::Pinned, IssueStatus::InProgress] {
            depth += self
                .relics
                .list(
                    &self.relics_dir,
                    IssueFilter {
                        status: Some(status),
                        assignee: Some(address.clone()),
                        ..IssueFilter::default()
                    },
                )
                .await?
                .len();
        }
        Ok(depth)
    }
}

#[async_trait]
impl<M: Multiplexer, I: IssueStore> Lifecycle for ForgeManager<M, I> {
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
        self.base.start(opts).await
    }

    async fn stop(&self) -> Result<StopOutcome, EngineError> {
        self.base.stop().await
    }

    async fn status(&self) -> Result<AgentStatus, EngineError> {
        self.base.status().await
    }
}

#[cfg(test)]
#[path = "forge_tests.rs"]
mod tests;
