// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent lifecycle managers.
//!
//! One manager per agent class, all implementing [`Lifecycle`]. The
//! multiplexer is the source of truth for liveness ("discover, don't
//! track"): `status` never consults a state file, and `start` recovers a
//! session whose runtime died by respawning the pane in place rather than
//! tearing the session down.

mod crew;
mod forge;
mod raider;
mod shaman;
mod warchief;
mod witness;

pub use crew::CrewManager;
pub use forge::ForgeManager;
pub use raider::{list_raider_sessions, stop_all_raiders, RaiderManager};
pub use shaman::ShamanManager;
pub use warchief::WarchiefManager;
pub use witness::WitnessManager;

use crate::error::EngineError;
use crate::identity::IdentityLock;
use crate::runtime_cmd::{
    identity_env, propagated_runtime_env, respawn_command, start_command, startup_beacon,
};
use crate::workspace::Workspace;
use async_trait::async_trait;
use hd_adapters::Multiplexer;
use hd_core::{Role, SessionName};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Pause between the graceful-interrupt key and the hard kill.
pub const GRACEFUL_INTERRUPT_PAUSE: Duration = Duration::from_millis(100);

/// Keyspec sent as the graceful cancel before killing a session.
pub const CANCEL_KEY: &str = "C-c";

/// Advisory state record under a persistent agent's `.runtime` dir.
///
/// The multiplexer stays the source of truth ("discover, don't track");
/// this file only tells a later reader that the last lifecycle action on
/// a persistent identity was a deliberate stop, not a crash.
pub const STATE_FILE: &str = "state.json";

/// Content of the advisory state record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StateRecord {
    pub state: AgentState,
    pub at: chrono::DateTime<chrono::Utc>,
}

/// Record a deliberate stop for a persistent identity. Best-effort: an
/// unwritable runtime dir must not fail the stop itself.
pub(crate) fn record_stopped(workdir: &Path) {
    let dir = workdir.join(crate::workspace::RUNTIME_DIR);
    let record = StateRecord {
        state: AgentState::Stopped,
        at: chrono::Utc::now(),
    };
    let write = || -> std::io::Result<()> {
        std::fs::create_dir_all(&dir)?;
        let content = serde_json::to_string_pretty(&record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(dir.join(STATE_FILE), content)
    };
    if let Err(e) = write() {
        tracing::warn!(dir = %dir.display(), error = %e, "failed to record stopped state");
    }
}

/// Clear the advisory record once the agent is started again.
pub(crate) fn clear_state_record(workdir: &Path) {
    let path = workdir.join(crate::workspace::RUNTIME_DIR).join(STATE_FILE);
    if path.exists() {
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to clear state record");
        }
    }
}

/// Read the advisory record, if any. Corrupt files read as `None`.
pub fn recorded_state(workdir: &Path) -> Option<StateRecord> {
    let path = workdir.join(crate::workspace::RUNTIME_DIR).join(STATE_FILE);
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Options accepted by every `start`.
#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    /// Runtime alias from the encampment config (`--runtime fast`).
    pub runtime_alias: Option<String>,
    /// Extra `K=V` environment for the session.
    pub env_overrides: Vec<(String, String)>,
    /// Attach the caller's terminal after starting (handled by the CLI).
    pub foreground: bool,
}

/// Result of a start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Fresh detached session created.
    Started,
    /// Session and runtime were already live; nothing done.
    AlreadyRunning,
    /// Session existed but its runtime had exited; pane respawned.
    Respawned,
}

/// Result of a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

/// Discovered agent state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    Running,
    /// Session exists but the runtime has exited.
    Paused,
    Stopped,
}

/// Status report for one agent.
#[derive(Debug, Clone)]
pub struct AgentStatus {
    pub session: SessionName,
    pub state: AgentState,
}

/// The capability set every class-specific manager provides.
#[async_trait]
pub trait Lifecycle: Send + Sync {
    fn role(&self) -> &Role;

    fn session_name(&self) -> &SessionName;

    fn workdir(&self) -> &Path;

    async fn start(&self, opts: &StartOptions) -> Result<StartOutcome, EngineError>;

    async fn stop(&self) -> Result<StopOutcome, EngineError>;

    /// Stop then start. `NotRunning` during the stop phase is non-fatal.
    async fn restart(&self, opts: &StartOptions) -> Result<StartOutcome, EngineError> {
        let _ = self.stop().await?;
        self.start(opts).await
    }

    async fn status(&self) -> Result<AgentStatus, EngineError>;
}

/// Shared per-agent state and the common start/stop/status machinery.
///
/// Class managers embed one of these and delegate their [`Lifecycle`]
/// methods to it, adding class behavior around the edges.
#[derive(Clone)]
pub struct AgentBase<M> {
    pub(crate) ws: Workspace,
    pub(crate) role: Role,
    pub(crate) session: SessionName,
    pub(crate) workdir: PathBuf,
    pub(crate) mux: M,
}

impl<M: Multiplexer> AgentBase<M> {
    /// Build the base for a concrete (non-Unknown) role.
    pub(crate) fn new(ws: Workspace, role: Role, mux: M) -> Result<Self, EngineError> {
        let session = role
            .session_name()
            .ok_or_else(|| EngineError::NoRoleHere(ws.root().to_path_buf()))?;
        let workdir = ws
            .workdir(&role)
            .ok_or_else(|| EngineError::NoRoleHere(ws.root().to_path_buf()))?;
        Ok(Self {
            ws,
            role,
            session,
            workdir,
            mux,
        })
    }

    /// Start ladder: live runtime → `AlreadyRunning`; dead runtime in a
    /// live session → respawn the pane; no session → create detached.
    pub(crate) async fn start(&self, opts: &StartOptions) -> Result<StartOutcome, EngineError> {
        if !self.workdir.is_dir() {
            return Err(EngineError::io(
                &self.workdir,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("agent workdir missing: {}", self.workdir.display()),
                ),
            ));
        }

        // Worker identities are single-writer; refuse to start over a
        // live claim from some other session.
        if self.role.is_worker() {
            let lock = IdentityLock::new(&self.workdir);
            if let Some(holder) = lock.live_holder() {
                if holder.session != self.session.as_str() {
                    return Err(EngineError::SessionHeld {
                        workdir: self.workdir.clone(),
                        holder_pid: holder.pid,
                        holder_session: holder.session,
                        acquired_at: holder.acquired_at,
                    });
                }
            }
        }

        let binary = self
            .ws
            .encampment
            .runtime
            .binary_for(opts.runtime_alias.as_deref())
            .to_string();
        let beacon = startup_beacon(&self.role);

        if self.mux.has_session(self.session.as_str()).await? {
            if self
                .mux
                .is_agent_running(self.session.as_str(), &[binary.as_str()])
                .await?
            {
                return Ok(StartOutcome::AlreadyRunning);
            }
            // Runtime exited; keep the session (and any attached client),
            // replace the pane's process.
            let pane = self.mux.pane_id(self.session.as_str()).await?;
            let env = self.session_env(opts);
            let cmd = respawn_command(&self.workdir, &env, &binary, &beacon);
            self.mux.respawn_pane(&pane, &cmd).await?;
            tracing::info!(session = %self.session, "respawned exited runtime");
            return Ok(StartOutcome::Respawned);
        }

        let env = self.session_env(opts);
        let cmd = start_command(&binary, &beacon);
        self.mux
            .create_detached(self.session.as_str(), &self.workdir, &cmd, &env)
            .await?;
        tracing::info!(session = %self.session, workdir = %self.workdir.display(), "started agent session");
        Ok(StartOutcome::Started)
    }

    fn session_env(&self, opts: &StartOptions) -> Vec<(String, String)> {
        let mut env = identity_env(&self.role);
        env.extend(propagated_runtime_env(&self.ws.encampment.runtime));
        for (key, value) in &opts.env_overrides {
            env.retain(|(k, _)| k != key);
            env.push((key.clone(), value.clone()));
        }
        env
    }

    /// Graceful interrupt, short pause, then hard kill with processes.
    pub(crate) async fn stop(&self) -> Result<StopOutcome, EngineError> {
        if !self.mux.has_session(self.session.as_str()).await? {
            return Ok(StopOutcome::NotRunning);
        }
        // Best-effort cancel so the runtime can checkpoint; the session
        // may vanish between the check and the keystroke.
        let _ = self.mux.send_keys_raw(self.session.as_str(), CANCEL_KEY).await;
        tokio::time::sleep(GRACEFUL_INTERRUPT_PAUSE).await;
        self.mux
            .kill_session_with_processes(self.session.as_str())
            .await?;
        // The session's runtime acquired the identity at rally and just
        // died with the kill; release the claim on its behalf.
        if self.role.is_worker() {
            IdentityLock::new(&self.workdir).release_session(self.session.as_str());
        }
        tracing::info!(session = %self.session, "stopped agent session");
        Ok(StopOutcome::Stopped)
    }

    pub(crate) async fn status(&self) -> Result<AgentStatus, EngineError> {
        let state = if self.mux.has_session(self.session.as_str()).await? {
            let binary = self.ws.encampment.runtime.binary.as_str();
            if self
                .mux
                .is_agent_running(self.session.as_str(), &[binary])
                .await?
            {
                AgentState::Running
            } else {
                AgentState::Paused
            }
        } else {
            AgentState::Stopped
        };
        Ok(AgentStatus {
            session: self.session.clone(),
            state,
        })
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
