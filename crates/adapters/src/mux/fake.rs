// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake multiplexer adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Multiplexer, MuxError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recorded multiplexer call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MuxCall {
    CreateDetached {
        name: String,
        cwd: PathBuf,
        cmd: String,
        env: Vec<(String, String)>,
    },
    KillSession {
        name: String,
    },
    KillSessionWithProcesses {
        name: String,
    },
    KillServer,
    SendKeys {
        name: String,
        literal: String,
    },
    SendKeysRaw {
        name: String,
        keyspec: String,
    },
    ClearHistory {
        pane: String,
    },
    RespawnPane {
        pane: String,
        cmd: String,
    },
    SwitchClient {
        session: String,
    },
}

/// Fake session state
#[derive(Debug, Clone)]
pub struct FakeMuxSession {
    pub name: String,
    pub cwd: PathBuf,
    pub cmd: String,
    pub env: Vec<(String, String)>,
    pub pane_id: String,
    pub output: Vec<String>,
    pub agent_running: bool,
}

struct FakeMuxState {
    sessions: BTreeMap<String, FakeMuxSession>,
    calls: Vec<MuxCall>,
    next_pane: u64,
    available: bool,
    server_killed: bool,
    inside_session: Option<String>,
}

/// Fake multiplexer adapter for testing
#[derive(Clone)]
pub struct FakeMux {
    inner: Arc<Mutex<FakeMuxState>>,
}

impl Default for FakeMux {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeMuxState {
                sessions: BTreeMap::new(),
                calls: Vec::new(),
                next_pane: 0,
                available: true,
                server_killed: false,
                inside_session: None,
            })),
        }
    }
}

impl FakeMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<MuxCall> {
        self.inner.lock().calls.clone()
    }

    /// Kill calls in the order they happened (session names only).
    pub fn kill_order(&self) -> Vec<String> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                MuxCall::KillSession { name }
                | MuxCall::KillSessionWithProcesses { name } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Get a session by name
    pub fn get_session(&self, name: &str) -> Option<FakeMuxSession> {
        self.inner.lock().sessions.get(name).cloned()
    }

    /// Add a pre-existing session
    pub fn add_session(&self, name: &str) {
        let mut inner = self.inner.lock();
        inner.next_pane += 1;
        let pane_id = format!("%{}", inner.next_pane);
        inner.sessions.insert(
            name.to_string(),
            FakeMuxSession {
                name: name.to_string(),
                cwd: PathBuf::new(),
                cmd: String::new(),
                env: Vec::new(),
                pane_id,
                output: Vec::new(),
                agent_running: true,
            },
        );
    }

    /// Mark whether the expected agent process is running in a session.
    pub fn set_agent_running(&self, name: &str, running: bool) {
        if let Some(session) = self.inner.lock().sessions.get_mut(name) {
            session.agent_running = running;
        }
    }

    /// Set captured pane output for a session.
    pub fn set_output(&self, name: &str, output: Vec<String>) {
        if let Some(session) = self.inner.lock().sessions.get_mut(name) {
            session.output = output;
        }
    }

    /// Simulate running inside a multiplexer session.
    pub fn set_inside(&self, session: Option<&str>) {
        self.inner.lock().inside_session = session.map(str::to_string);
    }

    /// Make every operation report an unavailable multiplexer.
    pub fn set_available(&self, available: bool) {
        self.inner.lock().available = available;
    }

    pub fn server_killed(&self) -> bool {
        self.inner.lock().server_killed
    }

    fn check_available(&self) -> Result<(), MuxError> {
        if self.inner.lock().available {
            Ok(())
        } else {
            Err(MuxError::Unavailable("fake multiplexer disabled".into()))
        }
    }
}

#[async_trait]
impl Multiplexer for FakeMux {
    async fn available(&self) -> bool {
        self.inner.lock().available
    }

    async fn has_session(&self, name: &str) -> Result<bool, MuxError> {
        self.check_available()?;
        Ok(self.inner.lock().sessions.contains_key(name))
    }

    async fn list_sessions(&self) -> Result<Vec<String>, MuxError> {
        self.check_available()?;
        Ok(self.inner.lock().sessions.keys().cloned().collect())
    }

    async fn create_detached(
        &self,
        name: &str,
        cwd: &Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<(), MuxError> {
        self.check_available()?;
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::CreateDetached {
            name: name.to_string(),
            cwd: cwd.to_path_buf(),
            cmd: cmd.to_string(),
            env: env.to_vec(),
        });
        inner.next_pane += 1;
        let pane_id = format!("%{}", inner.next_pane);
        inner.sessions.insert(
            name.to_string(),
            FakeMuxSession {
                name: name.to_string(),
                cwd: cwd.to_path_buf(),
                cmd: cmd.to_string(),
                env: env.to_vec(),
                pane_id,
                output: Vec::new(),
                agent_running: true,
            },
        );
        Ok(())
    }

    async fn kill_session(&self, name: &str) -> Result<(), MuxError> {
        self.check_available()?;
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::KillSession {
            name: name.to_string(),
        });
        inner.sessions.remove(name);
        Ok(())
    }

    async fn kill_session_with_processes(&self, name: &str) -> Result<(), MuxError> {
        self.check_available()?;
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::KillSessionWithProcesses {
            name: name.to_string(),
        });
        inner.sessions.remove(name);
        Ok(())
    }

    async fn kill_server(&self) -> Result<(), MuxError> {
        self.check_available()?;
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::KillServer);
        inner.sessions.clear();
        inner.server_killed = true;
        Ok(())
    }

    async fn send_keys(&self, name: &str, literal: &str) -> Result<(), MuxError> {
        self.check_available()?;
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::SendKeys {
            name: name.to_string(),
            literal: literal.to_string(),
        });
        if !inner.sessions.contains_key(name) {
            return Err(MuxError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn send_keys_raw(&self, name: &str, keyspec: &str) -> Result<(), MuxError> {
        self.check_available()?;
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::SendKeysRaw {
            name: name.to_string(),
            keyspec: keyspec.to_string(),
        });
        if !inner.sessions.contains_key(name) {
            return Err(MuxError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn clear_history(&self, pane: &str) -> Result<(), MuxError> {
        self.check_available()?;
        self.inner.lock().calls.push(MuxCall::ClearHistory {
            pane: pane.to_string(),
        });
        Ok(())
    }

    async fn respawn_pane(&self, pane: &str, cmd: &str) -> Result<(), MuxError> {
        self.check_available()?;
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::RespawnPane {
            pane: pane.to_string(),
            cmd: cmd.to_string(),
        });
        let session = inner
            .sessions
            .values_mut()
            .find(|s| s.pane_id == pane)
            .ok_or_else(|| MuxError::NotFound(pane.to_string()))?;
        session.cmd = cmd.to_string();
        session.agent_running = true;
        Ok(())
    }

    async fn pane_id(&self, session: &str) -> Result<String, MuxError> {
        self.check_available()?;
        self.inner
            .lock()
            .sessions
            .get(session)
            .map(|s| s.pane_id.clone())
            .ok_or_else(|| MuxError::NotFound(session.to_string()))
    }

    async fn capture_pane(&self, session: &str, lines: u32) -> Result<String, MuxError> {
        self.check_available()?;
        let inner = self.inner.lock();
        match inner.sessions.get(session) {
            Some(s) => {
                let start = s.output.len().saturating_sub(lines as usize);
                Ok(s.output[start..].join("\n"))
            }
            None => Err(MuxError::NotFound(session.to_string())),
        }
    }

    async fn is_agent_running(&self, session: &str, _expected: &[&str]) -> Result<bool, MuxError> {
        self.check_available()?;
        let inner = self.inner.lock();
        match inner.sessions.get(session) {
            Some(s) => Ok(s.agent_running),
            None => Err(MuxError::NotFound(session.to_string())),
        }
    }

    async fn switch_client(&self, session: &str) -> Result<(), MuxError> {
        self.check_available()?;
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::SwitchClient {
            session: session.to_string(),
        });
        if !inner.sessions.contains_key(session) {
            return Err(MuxError::NotFound(session.to_string()));
        }
        Ok(())
    }

    fn is_inside(&self) -> bool {
        self.inner.lock().inside_session.is_some()
    }

    async fn current_session_name(&self) -> Result<Option<String>, MuxError> {
        Ok(self.inner.lock().inside_session.clone())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
