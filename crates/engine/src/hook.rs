// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work-hook routing: pinning a bead onto an agent's hook (`charge`).
//!
//! An agent has at most one hooked bead; a newer pin supersedes the old
//! one because the hook is a single column on the agent bead. Cross-
//! warband beads resolve through the routing table at the encampment
//! root; the bead is updated in ITS warband's store while the agent bead
//! lives in the target's.

use crate::error::EngineError;
use crate::resolver::RoleLocation;
use crate::workspace::Workspace;
use hd_adapters::relics::{resolve_relics_dir, route_for_prefix, RELICS_DIR_NAME};
use hd_adapters::IssueStore;
use hd_core::{
    extract_prefix, parse_address, BeadId, HookUpdate, IssueStatus, IssueUpdate, NewIssue, Role,
};
use std::path::PathBuf;

/// What a successful charge did.
#[derive(Debug, Clone)]
pub struct ChargeOutcome {
    pub bead: BeadId,
    pub target: Role,
    /// Store the bead was updated in.
    pub bead_store: PathBuf,
    /// The target's agent bead id.
    pub agent_bead: BeadId,
}

/// Router pinning beads onto agent hooks.
#[derive(Clone)]
pub struct HookRouter<I> {
    ws: Workspace,
    relics: I,
}

impl<I: IssueStore> HookRouter<I> {
    pub fn new(ws: Workspace, relics: I) -> Self {
        Self { ws, relics }
    }

    /// Pin `bead` on a target agent's hook. `target` defaults to the
    /// caller's own agent.
    pub async fn charge(
        &self,
        bead: &str,
        target: Option<&str>,
        caller: &RoleLocation,
    ) -> Result<ChargeOutcome, EngineError> {
        let target_role = match target {
            Some(spec) => self.resolve_target(spec)?,
            None => {
                if caller.role == Role::Unknown {
                    return Err(EngineError::NoRoleHere(caller.home_dir.clone()));
                }
                caller.role.clone()
            }
        };

        let bead_store = self.bead_store(bead, &target_role)?;
        let address = target_role
            .address()
            .ok_or_else(|| EngineError::NoRoleHere(caller.home_dir.clone()))?;

        // The bead itself: pinned and assigned to the target.
        self.relics
            .update(
                &bead_store,
                bead,
                IssueUpdate::status(IssueStatus::Pinned).with_assignee(address.clone()),
            )
            .await?;

        // The target's agent bead: hook column set (superseding any
        // previous pin).
        let agent_store = self.agent_store(&target_role)?;
        let prefix = self.ws.bead_prefix(&target_role)?;
        let agent_bead = target_role
            .bead_id(prefix)
            .ok_or_else(|| EngineError::NoRoleHere(caller.home_dir.clone()))?;
        let hook = IssueUpdate::default().with_hook(HookUpdate::Set(BeadId::new(bead)));
        match self
            .relics
            .update(&agent_store, agent_bead.as_str(), hook.clone())
            .await
        {
            Ok(()) => {}
            Err(hd_adapters::RelicsError::NotFound(_)) => {
                // First pin for this agent: materialize its bead.
                self.relics
                    .create(
                        &agent_store,
                        "agent",
                        NewIssue::new(format!("agent {}", address))
                            .with_id(agent_bead.clone())
                            .with_assignee(address.clone()),
                    )
                    .await?;
                self.relics
                    .update(&agent_store, agent_bead.as_str(), hook)
                    .await?;
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(bead, target = %address, "bead pinned on hook");
        Ok(ChargeOutcome {
            bead: BeadId::new(bead),
            target: target_role,
            bead_store,
            agent_bead,
        })
    }

    fn resolve_target(&self, spec: &str) -> Result<Role, EngineError> {
        resolve_target_spec(&self.ws, spec)
    }

    /// Which store holds the bead, by id prefix:
    /// the target's own warband when the prefix matches, else a registry
    /// prefix match, else the routing table, else the encampment store.
    fn bead_store(&self, bead: &str, target: &Role) -> Result<PathBuf, EngineError> {
        let prefix = extract_prefix(bead);

        if let Some(warband) = target.warband() {
            let config = self.ws.warband(warband)?;
            if config.bead_prefix == prefix {
                return Ok(config.dir(self.ws.root()).join(RELICS_DIR_NAME));
            }
        }

        if let Some(route) = route_for_prefix(self.ws.root(), prefix)? {
            let base = self.ws.root().join(route.path);
            return Ok(resolve_relics_dir(&base)?);
        }

        if let Some(config) = self.ws.registry.by_prefix(prefix) {
            return Ok(config.dir(self.ws.root()).join(RELICS_DIR_NAME));
        }

        Ok(self.ws.root().join(RELICS_DIR_NAME))
    }

    /// The store holding the target's agent bead.
    fn agent_store(&self, target: &Role) -> Result<PathBuf, EngineError> {
        match target.warband() {
            Some(warband) => Ok(self
                .ws
                .warband(warband)?
                .dir(self.ws.root())
                .join(RELICS_DIR_NAME)),
            None => Ok(self.ws.root().join(RELICS_DIR_NAME)),
        }
    }
}

/// Resolve a role-or-path target spec: a role token (`warchief`), a
/// canonical address, or a `warband/name` path whose crew-vs-raider
/// ambiguity is settled by probing for `<root>/<warband>/clan/<name>`
/// on disk before assuming raider.
pub fn resolve_target_spec(ws: &Workspace, spec: &str) -> Result<Role, EngineError> {
    let parsed =
        parse_address(spec).ok_or_else(|| EngineError::NoRoleHere(PathBuf::from(spec)))?;
    if let Role::Raider { warband, name } = &parsed {
        let clan_dir = ws.root().join(warband).join("clan").join(name);
        if clan_dir.is_dir() {
            return Ok(Role::Crew {
                warband: warband.clone(),
                name: name.clone(),
            });
        }
    }
    Ok(parsed)
}

#[cfg(test)]
#[path = "hook_tests.rs"]
mod tests;
