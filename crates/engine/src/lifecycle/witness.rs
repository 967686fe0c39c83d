// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Witness lifecycle manager.

use super::{AgentBase, AgentStatus, Lifecycle, StartOptions, StartOutcome, StopOutcome};
use crate::error::EngineError;
use crate::workspace::Workspace;
use async_trait::async_trait;
use hd_adapters::relics::RELICS_DIR_NAME;
use hd_adapters::{IssueStore, Multiplexer};
use hd_core::{parse_address, IssueFilter, IssueStatus, Role, SessionName};
use std::path::{Path, PathBuf};

/// Manager for a warband's raider monitor.
#[derive(Clone)]
pub struct WitnessManager<M, I> {
    base: AgentBase<M>,
    relics: I,
    relics_dir: PathBuf,
    warband: String,
}

impl<M: Multiplexer, I: IssueStore> WitnessManager<M, I> {
    pub fn new(ws: Workspace, warband: &str, mux: M, relics: I) -> Result<Self, EngineError> {
        let config = ws.warband(warband)?;
        let relics_dir = config.dir(ws.root()).join(RELICS_DIR_NAME);
        let role = Role::Witness {
            warband: warband.to_string(),
        };
        Ok(Self {
            base: AgentBase::new(ws, role, mux)?,
            relics,
            relics_dir,
            warband: warband.to_string(),
        })
    }

    /// Raiders this witness is watching: any raider of the warband with a
    /// pinned or in-progress bead in the warband store.
    pub async fn monitored_raiders(&self) -> Result<Vec<String>, EngineError> {
        let mut names = Vec::new();
        for status in [IssueStatus::Pinned, IssueStatus::InProgress] {
            let issues = self
                .relics
                .list(
                    &self.relics_dir,
                    IssueFilter {
                        status: Some(status),
                        ..IssueFilter::default()
                    },
                )
                .await?;
            for issue in issues {
                let Some(assignee) = issue.assignee else {
                    continue;
                };
                if let Some(Role::Raider { warband, name }) = parse_address(assignee.as_str()) {
                    if warband == self.warband && !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl<M: Multiplexer, I: IssueStore> Lifecycle for WitnessManager<M, I> {
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
#[path = "witness_tests.rs"]
mod tests;
