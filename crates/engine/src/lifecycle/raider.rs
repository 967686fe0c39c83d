// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raider lifecycle manager and warband session operations.

use super::{AgentBase, AgentStatus, Lifecycle, StartOptions, StartOutcome, StopOutcome};
use crate::error::EngineError;
use crate::workspace::Workspace;
use async_trait::async_trait;
use hd_adapters::relics::RELICS_DIR_NAME;
use hd_adapters::{IssueStore, Multiplexer};
use hd_core::{
    parse_session_name, validate_raider_name, HookUpdate, IssueStatus, IssueUpdate, Role,
    SessionName, SESSION_PREFIX,
};
use std::path::{Path, PathBuf};

/// Manager for one transient raider.
#[derive(Clone)]
pub struct RaiderManager<M, I> {
    base: AgentBase<M>,
    relics: I,
    relics_dir: PathBuf,
    bead_id: String,
}

impl<M: Multiplexer, I: IssueStore> RaiderManager<M, I> {
    pub fn new(
        ws: Workspace,
        warband: &str,
        name: &str,
        mux: M,
        relics: I,
    ) -> Result<Self, EngineError> {
        validate_raider_name(name)?;
        let config = ws.warband(warband)?;
        let relics_dir = config.dir(ws.root()).join(RELICS_DIR_NAME);
        let role = Role::Raider {
            warband: warband.to_string(),
            name: name.to_string(),
        };
        let bead_id = role
            .bead_id(&config.bead_prefix)
            .map(|b| b.into_inner())
            .unwrap_or_default();
        Ok(Self {
            base: AgentBase::new(ws, role, mux)?,
            relics,
            relics_dir,
            bead_id,
        })
    }

    /// The raider's agent bead id (e.g. `gp-raider-greenplace-toast`).
    pub fn bead_id(&self) -> &str {
        &self.bead_id
    }

    /// Last `lines` of the raider's pane.
    pub async fn capture(&self, lines: u32) -> Result<String, EngineError> {
        Ok(self
            .base
            .mux
            .capture_pane(self.base.session.as_str(), lines)
            .await?)
    }

    /// Type literal text into the raider's pane, then press Enter.
    pub async fn inject(&self, text: &str) -> Result<(), EngineError> {
        self.base.mux.send_keys(self.base.session.as_str(), text).await?;
        self.base
            .mux
            .send_keys_raw(self.base.session.as_str(), "Enter")
            .await?;
        Ok(())
    }

    /// Switch the attached client to this raider's session.
    pub async fn summon(&self) -> Result<(), EngineError> {
        Ok(self
            .base
            .mux
            .switch_client(self.base.session.as_str())
            .await?)
    }

    /// Reset stale pinned work: transient identities whose session is gone
    /// get their hook cleared and the hooked bead reopened. Persistent
    /// (crew) work is never reset this way.
    pub async fn reset_stale_work(&self) -> Result<bool, EngineError> {
        if self.base.mux.has_session(self.base.session.as_str()).await? {
            return Ok(false);
        }
        let agent_bead = match self.relics.show(&self.relics_dir, &self.bead_id).await {
            Ok(bead) => bead,
            Err(hd_adapters::RelicsError::NotFound(_)) => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        let Some(hooked) = agent_bead.hook else {
            return Ok(false);
        };

        tracing::info!(
            raider = %self.base.session,
            bead = %hooked,
            "raider session gone; resetting stale pinned work"
        );
        self.relics
            .update(
                &self.relics_dir,
                hooked.as_str(),
                IssueUpdate::status(IssueStatus::Open),
            )
            .await?;
        self.relics
            .update(
                &self.relics_dir,
                &self.bead_id,
                IssueUpdate::default().with_hook(HookUpdate::Clear),
            )
            .await?;
        Ok(true)
    }
}

#[async_trait]
impl<M: Multiplexer, I: IssueStore> Lifecycle for RaiderManager<M, I> {
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

/// Live raider session names for one warband, discovered from the
/// multiplexer snapshot.
pub async fn list_raider_sessions<M: Multiplexer>(
    mux: &M,
    warband: &str,
) -> Result<Vec<String>, EngineError> {
    let prefix = format!("{SESSION_PREFIX}{warband}-");
    let mut raiders: Vec<String> = mux
        .list_sessions()
        .await?
        .into_iter()
        .filter(|s| s.starts_with(&prefix))
        .filter(|s| {
            matches!(
                parse_session_name(s),
                Some(Role::Raider { .. })
            )
        })
        .collect();
    raiders.sort();
    Ok(raiders)
}

/// Stop every raider session of a warband. Per-session failures are
/// collected, not short-circuited.
pub async fn stop_all_raiders<M: Multiplexer, I: IssueStore>(
    ws: &Workspace,
    warband: &str,
    mux: &M,
    relics: &I,
) -> Result<Vec<(String, Result<StopOutcome, EngineError>)>, EngineError> {
    let mut results = Vec::new();
    for session in list_raider_sessions(mux, warband).await? {
        let Some(Role::Raider { name, .. }) = parse_session_name(&session) else {
            continue;
        };
        let outcome = match RaiderManager::new(ws.clone(), warband, &name, mux.clone(), relics.clone())
        {
            Ok(manager) => manager.stop().await,
            Err(e) => Err(e),
        };
        results.push((session, outcome));
    }
    Ok(results)
}

#[cfg(test)]
#[path = "raider_tests.rs"]
mod tests;
