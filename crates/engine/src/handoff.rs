// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handoff: replace a live agent session's process in place.
//!
//! The session and pane survive; only the foreground process is swapped
//! for a fresh runtime primed with a handoff beacon. An attached user
//! stays attached through the swap. The next rally of that session finds
//! the marker written here and warns "post-handoff".

use crate::error::EngineError;
use crate::events::{EventKind, EventLog};
use crate::hook::{resolve_target_spec, HookRouter};
use crate::resolver::RoleLocation;
use crate::runtime_cmd::{
    handoff_beacon, identity_env, propagated_runtime_env, respawn_command,
};
use crate::workspace::Workspace;
use hd_adapters::relics::RELICS_DIR_NAME;
use hd_adapters::{IssueStore, MessageBus, Multiplexer};
use hd_core::{MessageKind, NewIssue, NewMessage, PaneId, Role, SessionName};
use std::path::Path;

/// Subject prefix for handoff self-beads.
pub const HANDOFF_SUBJECT_PREFIX: &str = "🤝 HANDOFF: ";

/// Marker file consumed by the next rally.
pub const HANDOFF_MARKER: &str = "handoff.marker";

/// Lines of pane scrollback summarized by `--collect`.
const COLLECT_LINES: u32 = 20;

/// Options for one handoff.
#[derive(Debug, Clone, Default)]
pub struct HandoffOptions {
    /// Bead to pre-pin on the target before the swap.
    pub bead: Option<String>,
    /// Target role or path for a remote handoff; `None` hands off the
    /// caller's own session.
    pub target: Option<String>,
    /// Self-bead subject (own-handoff only).
    pub subject: Option<String>,
    /// Self-bead body.
    pub message: Option<String>,
    /// Append a capture of the outgoing pane to the self-bead.
    pub collect: bool,
    /// After a remote handoff, switch the attached client to the target.
    pub watch: bool,
    /// Print the exact respawn command; no side effects at all.
    pub dry_run: bool,
}

/// What a handoff did (or, for dry-run, would do).
#[derive(Debug, Clone)]
pub struct HandoffReport {
    pub target: Role,
    pub session: SessionName,
    pub pane: PaneId,
    pub command: String,
    /// Id of the pinned self-bead, when one was created.
    pub self_bead: Option<String>,
    pub dry_run: bool,
}

/// Write the handoff marker: the previous session's name.
pub fn write_handoff_marker(runtime_dir: &Path, session: &str) -> Result<(), EngineError> {
    std::fs::create_dir_all(runtime_dir).map_err(|e| EngineError::io(runtime_dir, e))?;
    let path = runtime_dir.join(HANDOFF_MARKER);
    std::fs::write(&path, format!("{}\n", session)).map_err(|e| EngineError::io(&path, e))
}

/// Read and remove the handoff marker, returning the previous session
/// name if one was present.
pub fn consume_handoff_marker(runtime_dir: &Path) -> Option<String> {
    let path = runtime_dir.join(HANDOFF_MARKER);
    let content = std::fs::read_to_string(&path).ok()?;
    if let Err(e) = std::fs::remove_file(&path) {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove handoff marker");
    }
    let session = content.trim().to_string();
    (!session.is_empty()).then_some(session)
}

/// The handoff engine.
#[derive(Clone)]
pub struct HandoffEngine<M, I, B> {
    ws: Workspace,
    mux: M,
    relics: I,
    drums: B,
    events: EventLog,
}

impl<M: Multiplexer, I: IssueStore, B: MessageBus> HandoffEngine<M, I, B> {
    pub fn new(ws: Workspace, mux: M, relics: I, drums: B) -> Self {
        let events = EventLog::new(ws.events_path());
        Self {
            ws,
            mux,
            relics,
            drums,
            events,
        }
    }

    /// Hand a session off to a fresh process.
    pub async fn handoff(
        &self,
        caller: &RoleLocation,
        opts: &HandoffOptions,
    ) -> Result<HandoffReport, EngineError> {
        // 1. Determine the target.
        let target_role = match &opts.target {
            Some(spec) => resolve_target_spec(&self.ws, spec)?,
            None => {
                if caller.role == Role::Unknown {
                    return Err(EngineError::NoRoleHere(caller.home_dir.clone()));
                }
                caller.role.clone()
            }
        };
        let target_session = target_role
            .session_name()
            .ok_or_else(|| EngineError::NoRoleHere(caller.home_dir.clone()))?;

        let caller_session = self.mux.current_session_name().await.unwrap_or(None);
        let own_handoff = match (&opts.target, &caller_session) {
            (None, _) => true,
            (Some(_), Some(current)) => current == target_session.as_str(),
            (Some(_), None) => false,
        };

        // 2. Build the restart command for the target's canonical home.
        let workdir = self
            .ws
            .workdir(&target_role)
            .ok_or_else(|| EngineError::NoRoleHere(caller.home_dir.clone()))?;
        let mut env = identity_env(&target_role);
        env.extend(propagated_runtime_env(&self.ws.encampment.runtime));
        let binary = self.ws.encampment.runtime.binary.clone();
        let beacon = handoff_beacon(&target_role);
        let command = respawn_command(&workdir, &env, &binary, &beacon);

        let pane = PaneId::new(self.mux.pane_id(target_session.as_str()).await?);

        if opts.dry_run {
            // The exact command, zero side effects (no pin, no self-bead,
            // no marker).
            return Ok(HandoffReport {
                target: target_role,
                session: target_session,
                pane,
                command,
                self_bead: None,
                dry_run: true,
            });
        }

        // 3. Pre-pin a bead when asked.
        if let Some(bead) = &opts.bead {
            let router = HookRouter::new(self.ws.clone(), self.relics.clone());
            router.charge(bead, opts.target.as_deref(), caller).await?;
        }

        // 4. Own-handoff self-bead, best-effort: delivery must never
        // block the respawn.
        let mut self_bead = None;
        if own_handoff && (opts.subject.is_some() || opts.message.is_some()) {
            match self.send_self_bead(&target_role, &target_session, opts, caller).await {
                Ok(id) => self_bead = Some(id),
                Err(e) => {
                    tracing::warn!(error = %e, "self-bead delivery failed; continuing handoff");
                }
            }
        }

        // 5. Event, 6. marker, 7. history clear + respawn.
        self.events.emit(
            EventKind::Handoff {
                session: caller_session.unwrap_or_else(|| target_session.as_str().to_string()),
                target: target_session.as_str().to_string(),
            },
            target_role.address().map(|a| a.as_str().to_string()).as_deref(),
        );

        if let Some(runtime_dir) = self.ws.runtime_dir(&target_role) {
            write_handoff_marker(&runtime_dir, target_session.as_str())?;
        }

        // Clearing history also drops the pane out of copy-mode so the
        // respawned process owns the screen.
        if let Err(e) = self.mux.clear_history(pane.as_str()).await {
            tracing::warn!(pane = %pane, error = %e, "history clear failed");
        }
        self.mux.respawn_pane(pane.as_str(), &command).await?;

        // 8. Remote watch: follow the fresh session.
        if opts.watch && !own_handoff {
            if let Err(e) = self.mux.switch_client(target_session.as_str()).await {
                tracing::warn!(error = %e, "switch-client after handoff failed");
            }
        }

        tracing::info!(session = %target_session, pane = %pane, "handoff complete");
        Ok(HandoffReport {
            target: target_role,
            session: target_session,
            pane,
            command,
            self_bead,
            dry_run: false,
        })
    }

    /// Create and pin the handoff self-bead, then drum it to the agent's
    /// own mailbox.
    async fn send_self_bead(
        &self,
        role: &Role,
        session: &SessionName,
        opts: &HandoffOptions,
        caller: &RoleLocation,
    ) -> Result<String, EngineError> {
        let subject = format!(
            "{}{}",
            HANDOFF_SUBJECT_PREFIX,
            opts.subject.as_deref().unwrap_or("session handoff")
        );
        let mut body = opts.message.clone().unwrap_or_default();
        if opts.collect {
            match self.mux.capture_pane(session.as_str(), COLLECT_LINES).await {
                Ok(capture) if !capture.trim().is_empty() => {
                    body.push_str("\n\n--- collected state ---\n");
                    body.push_str(&capture);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "state collection failed"),
            }
        }

        let store = self.self_store(role)?;
        let bead = self
            .relics
            .create(
                &store,
                "handoff",
                NewIssue::new(subject.clone()).with_description(body.clone()),
            )
            .await?;

        let router = HookRouter::new(self.ws.clone(), self.relics.clone());
        router.charge(bead.as_str(), None, caller).await?;

        if let Some(address) = role.address() {
            let note = NewMessage::new(address, subject, body).kind(MessageKind::Handoff);
            if let Err(e) = self.drums.send(role.class_str(), note).await {
                tracing::warn!(error = %e, "handoff drum delivery failed");
            }
        }
        Ok(bead.into_inner())
    }

    fn self_store(&self, role: &Role) -> Result<std::path::PathBuf, EngineError> {
        match role.warband() {
            Some(warband) => Ok(self
                .ws
                .warband(warband)?
                .dir(self.ws.root())
                .join(RELICS_DIR_NAME)),
            None => Ok(self.ws.root().join(RELICS_DIR_NAME)),
        }
    }
}

#[cfg(test)]
#[path = "handoff_tests.rs"]
mod tests;
