// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rally: the session-start banner.
//!
//! Runs at the first prompt of every agent session and assembles the
//! context the runtime needs: role, handoff warning, pinned work
//! (autonomous mode), checkpoint, mail teaser, and pending escalations.
//! Only two failures refuse the rally: no resolvable workspace and an
//! identity collision. Everything else degrades to a warning so the
//! banner never crashes a session.

use crate::error::EngineError;
use crate::events::{EventKind, EventLog};
use crate::handoff::consume_handoff_marker;
use crate::identity::IdentityLock;
use crate::resolver::RoleLocation;
use crate::workspace::Workspace;
use hd_adapters::relics::RELICS_DIR_NAME;
use hd_adapters::{IssueStore, MessageBus};
use hd_core::{Issue, IssueFilter, IssueStatus, Role};
use std::path::PathBuf;

/// Checkpoint file an agent may leave for its successor.
pub const CHECKPOINT_FILE: &str = "checkpoint.md";

/// Escalation label on beads surfaced to the warchief.
pub const ESCALATION_LABEL: &str = "escalation";

/// Everything the banner renders.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RallyBanner {
    pub role: Role,
    /// Location-mismatch warning from the resolver.
    pub mismatch: Option<String>,
    /// Previous session name when a handoff marker was consumed.
    pub post_handoff: Option<String>,
    /// The hooked bead driving autonomous mode.
    pub hooked: Option<Issue>,
    /// Other pinned beads assigned to this agent.
    pub pinned: Vec<Issue>,
    /// Previous-session checkpoint content.
    pub checkpoint: Option<String>,
    /// Unread-mail teaser from the message bus.
    pub mail_teaser: Option<String>,
    /// Pending escalations (warchief only).
    pub escalations: Vec<Issue>,
}

impl RallyBanner {
    pub fn autonomous(&self) -> bool {
        self.hooked.is_some() || !self.pinned.is_empty()
    }

    /// Render the banner for stdout.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("=== HORDE RALLY ===\n");
        out.push_str(&format!("role: {} ({})\n", self.role.class_str(), self.role));

        if let Some(warning) = &self.mismatch {
            out.push_str(&format!("warning: {}\n", warning));
        }
        if let Some(previous) = &self.post_handoff {
            out.push_str(&format!(
                "warning: post-handoff — this session ({}) was just handed over; \
                 do not run another handoff before doing real work\n",
                previous
            ));
        }

        if self.autonomous() {
            out.push_str("mode: AUTONOMOUS\n");
            if let Some(hooked) = &self.hooked {
                out.push_str(&format!("hooked bead: {} — {}\n", hooked.id, hooked.title));
            }
            for issue in &self.pinned {
                out.push_str(&format!("pinned: {} — {}\n", issue.id, issue.title));
            }
            out.push_str(
                "directive: announce your role, then execute the hooked bead immediately\n",
            );
        } else {
            out.push_str("mode: normal\n");
        }

        if let Some(checkpoint) = &self.checkpoint {
            out.push_str("--- checkpoint from previous session ---\n");
            out.push_str(checkpoint);
            if !checkpoint.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("---\n");
        }

        if let Some(teaser) = &self.mail_teaser {
            out.push_str(&format!("drums: {}\n", teaser));
        }

        if !self.escalations.is_empty() {
            out.push_str(&format!("escalations pending: {}\n", self.escalations.len()));
            for issue in &self.escalations {
                out.push_str(&format!("  {} — {}\n", issue.id, issue.title));
            }
        }

        out.push_str("===\n");
        out
    }
}

/// The rally engine.
#[derive(Clone)]
pub struct Rally<I, B> {
    ws: Workspace,
    relics: I,
    drums: B,
    events: EventLog,
}

impl<I: IssueStore, B: MessageBus> Rally<I, B> {
    pub fn new(ws: Workspace, relics: I, drums: B) -> Self {
        let events = EventLog::new(ws.events_path());
        Self {
            ws,
            relics,
            drums,
            events,
        }
    }

    /// Assemble the banner for a resolved location.
    ///
    /// Errors only on an identity collision (the caller prints the
    /// diagnostic and refuses the session) or an unresolvable role.
    pub async fn rally(&self, location: &RoleLocation) -> Result<RallyBanner, EngineError> {
        let role = location.role.clone();
        if role == Role::Unknown {
            return Err(EngineError::NoRoleHere(location.home_dir.clone()));
        }
        let session = role
            .session_name()
            .ok_or_else(|| EngineError::NoRoleHere(location.home_dir.clone()))?;

        // 2. Handoff marker is consumed exactly once.
        let post_handoff = self
            .ws
            .runtime_dir(&role)
            .and_then(|dir| consume_handoff_marker(&dir));

        // 3. Worker roles claim their identity before anything else.
        if role.is_worker() {
            let lock = IdentityLock::new(&location.home_dir);
            lock.acquire(session.as_str())?;
        }

        // 4. Session-start event (best-effort by construction).
        self.events.emit(
            EventKind::SessionStart {
                session: session.as_str().to_string(),
            },
            role.address().map(|a| a.into_inner()).as_deref(),
        );

        // 5. Pinned work decides the mode.
        let (hooked, pinned) = self.pinned_work(&role).await;

        // 6. Checkpoint, teaser, escalations: all optional.
        let checkpoint = self.read_checkpoint(&role);
        let mail_teaser = match role.address() {
            Some(address) => match self.drums.check_teaser(address.as_str()).await {
                Ok(teaser) => teaser,
                Err(e) => {
                    tracing::warn!(error = %e, "mail teaser unavailable");
                    None
                }
            },
            None => None,
        };
        let escalations = if role == Role::Warchief {
            self.pending_escalations().await
        } else {
            Vec::new()
        };

        Ok(RallyBanner {
            role,
            mismatch: location.mismatch.clone(),
            post_handoff,
            hooked,
            pinned,
            checkpoint,
            mail_teaser,
            escalations,
        })
    }

    fn store_for(&self, role: &Role) -> Result<PathBuf, EngineError> {
        match role.warband() {
            Some(warband) => Ok(self
                .ws
                .warband(warband)?
                .dir(self.ws.root())
                .join(RELICS_DIR_NAME)),
            None => Ok(self.ws.root().join(RELICS_DIR_NAME)),
        }
    }

    /// The hooked bead (from the agent bead's hook column) plus any other
    /// pinned beads assigned to this agent. Store trouble means normal
    /// mode, not a crash.
    async fn pinned_work(&self, role: &Role) -> (Option<Issue>, Vec<Issue>) {
        let Ok(store) = self.store_for(role) else {
            return (None, Vec::new());
        };
        let Some(address) = role.address() else {
            return (None, Vec::new());
        };

        let mut hooked = None;
        if let Ok(prefix) = self.ws.bead_prefix(role) {
            if let Some(agent_bead) = role.bead_id(prefix) {
                match self.relics.show(&store, agent_bead.as_str()).await {
                    Ok(agent) => {
                        if let Some(hook) = agent.hook {
                            match self.relics.show(&store, hook.as_str()).await {
                                Ok(issue) => hooked = Some(issue),
                                Err(e) => {
                                    tracing::warn!(bead = %hook, error = %e, "hooked bead unreadable")
                                }
                            }
                        }
                    }
                    Err(hd_adapters::RelicsError::NotFound(_)) => {}
                    Err(e) => tracing::warn!(error = %e, "agent bead unreadable"),
                }
            }
        }

        let pinned = match self
            .relics
            .list(
                &store,
                IssueFilter {
                    status: Some(IssueStatus::Pinned),
                    assignee: Some(address),
                    ..IssueFilter::default()
                },
            )
            .await
        {
            Ok(mut issues) => {
                if let Some(hooked) = &hooked {
                    issues.retain(|i| i.id != hooked.id);
                }
                issues
            }
            Err(e) => {
                tracing::warn!(error = %e, "pinned-work query failed");
                Vec::new()
            }
        };

        (hooked, pinned)
    }

    fn read_checkpoint(&self, role: &Role) -> Option<String> {
        let dir = self.ws.runtime_dir(role)?;
        let content = std::fs::read_to_string(dir.join(CHECKPOINT_FILE)).ok()?;
        let trimmed = content.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    async fn pending_escalations(&self) -> Vec<Issue> {
        let store = self.ws.root().join(RELICS_DIR_NAME);
        match self
            .relics
            .list(
                &store,
                IssueFilter {
                    labels: vec![ESCALATION_LABEL.to_string()],
                    ..IssueFilter::default()
                },
            )
            .await
        {
            Ok(issues) => issues
                .into_iter()
                .filter(|i| i.status != IssueStatus::Done)
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "escalation query failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[path = "rally_tests.rs"]
mod tests;
