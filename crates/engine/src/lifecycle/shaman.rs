// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shaman lifecycle manager.

use super::{AgentBase, AgentStatus, Lifecycle, StartOptions, StartOutcome, StopOutcome};
use crate::error::EngineError;
use crate::workspace::Workspace;
use async_trait::async_trait;
use hd_adapters::Multiplexer;
use hd_core::{Role, SessionName};
use std::path::Path;

/// Manager for the encampment health-check session.
///
/// The shaman restarts other agents it finds dead, which is why shutdown
/// kills it FIRST; this manager itself is plain lifecycle.
#[derive(Clone)]
pub struct ShamanManager<M> {
    base: AgentBase<M>,
}

impl<M: Multiplexer> ShamanManager<M> {
    pub fn new(ws: Workspace, mux: M) -> Result<Self, EngineError> {
        Ok(Self {
            base: AgentBase::new(ws, Role::Shaman, mux)?,
        })
    }
}

#[async_trait]
impl<M: Multiplexer> Lifecycle for ShamanManager<M> {
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
#[path = "shaman_tests.rs"]
mod tests;
