// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Warchief lifecycle manager.

use super::{AgentBase, AgentStatus, Lifecycle, StartOptions, StartOutcome, StopOutcome};
use crate::error::EngineError;
use crate::workspace::Workspace;
use async_trait::async_trait;
use hd_adapters::Multiplexer;
use hd_core::{Role, SessionName};
use std::path::Path;

/// Manager for the encampment coordinator session.
#[derive(Clone)]
pub struct WarchiefManager<M> {
    base: AgentBase<M>,
}

impl<M: Multiplexer> WarchiefManager<M> {
    pub fn new(ws: Workspace, mux: M) -> Result<Self, EngineError> {
        Ok(Self {
            base: AgentBase::new(ws, Role::Warchief, mux)?,
        })
    }
}

#[async_trait]
impl<M: Multiplexer> Lifecycle for WarchiefManager<M> {
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
#[path = "warchief_tests.rs"]
mod tests;
