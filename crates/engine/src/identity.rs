// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-agent identity lock.
//!
//! Raiders and crew live in shared directories that two processes could
//! claim at once; the lock makes the claim single-writer. Encampment and
//! per-warband singletons need no lock: their canonical session name is
//! already unique. The lock is advisory and purely filesystem-based,
//! relying only on create-exclusive atomicity. A holder is live iff its
//! pid still runs; stale locks are reclaimed silently.

use crate::error::EngineError;
use crate::workspace::RUNTIME_DIR;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Lock file name under the agent's `.runtime` directory.
pub const LOCK_FILE: &str = "agent.lock";

/// Recorded holder of an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    pub pid: i32,
    pub session: String,
    pub acquired_at: DateTime<Utc>,
}

/// Single-writer lock over one agent workdir.
#[derive(Debug, Clone)]
pub struct IdentityLock {
    workdir: PathBuf,
}

impl IdentityLock {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.workdir.join(RUNTIME_DIR).join(LOCK_FILE)
    }

    /// The recorded holder, live or not. `None` when no lock file exists
    /// or its content is unreadable.
    pub fn read_holder(&self) -> Option<LockInfo> {
        let content = std::fs::read_to_string(self.path()).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// The live holder, if any. Dead holders read as `None`.
    pub fn live_holder(&self) -> Option<LockInfo> {
        self.read_holder().filter(|info| pid_alive(info.pid))
    }

    /// Acquire the lock for the calling process.
    pub fn acquire(&self, session: &str) -> Result<LockInfo, EngineError> {
        #[allow(clippy::cast_possible_wrap)]
        self.acquire_as(std::process::id() as i32, session)
    }

    /// Acquire the lock on behalf of `pid`.
    ///
    /// Fails with [`EngineError::SessionHeld`] when another live process
    /// holds the identity; a stale lock is reclaimed and the acquisition
    /// retried once.
    pub fn acquire_as(&self, pid: i32, session: &str) -> Result<LockInfo, EngineError> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
        }

        let info = LockInfo {
            pid,
            session: session.to_string(),
            acquired_at: Utc::now(),
        };

        for attempt in 0..2 {
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(mut file) => {
                    let content = serde_json::to_string_pretty(&info)
                        .unwrap_or_else(|_| String::from("{}"));
                    file.write_all(content.as_bytes())
                        .map_err(|e| EngineError::io(&path, e))?;
                    return Ok(info);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    match self.read_holder() {
                        Some(holder) if holder.pid == pid => {
                            // Re-acquisition by the same process: refresh
                            let content = serde_json::to_string_pretty(&info)
                                .unwrap_or_else(|_| String::from("{}"));
                            std::fs::write(&path, content)
                                .map_err(|e| EngineError::io(&path, e))?;
                            return Ok(info);
                        }
                        Some(holder) if pid_alive(holder.pid) => {
                            return Err(EngineError::SessionHeld {
                                workdir: self.workdir.clone(),
                                holder_pid: holder.pid,
                                holder_session: holder.session,
                                acquired_at: holder.acquired_at,
                            });
                        }
                        _ => {
                            // Stale or unreadable lock: reclaim and retry
                            tracing::warn!(
                                path = %path.display(),
                                attempt,
                                "reclaiming stale identity lock"
                            );
                            let _ = std::fs::remove_file(&path);
                        }
                    }
                }
                Err(e) => return Err(EngineError::io(&path, e)),
            }
        }

        // Two reclaim attempts lost the race to another claimant.
        match self.read_holder() {
            Some(holder) => Err(EngineError::SessionHeld {
                workdir: self.workdir.clone(),
                holder_pid: holder.pid,
                holder_session: holder.session,
                acquired_at: holder.acquired_at,
            }),
            None => Err(EngineError::io(
                &path,
                std::io::Error::new(std::io::ErrorKind::Other, "lock contention"),
            )),
        }
    }

    /// Release the lock if `pid` holds it; another holder's lock is left
    /// untouched.
    pub fn release_as(&self, pid: i32) {
        if let Some(holder) = self.read_holder() {
            if holder.pid == pid {
                let _ = std::fs::remove_file(self.path());
            }
        }
    }

    /// Release the calling process's hold (the in-process exit path for
    /// whoever acquired at rally).
    pub fn release(&self) {
        #[allow(clippy::cast_possible_wrap)]
        self.release_as(std::process::id() as i32);
    }

    /// Release the lock held for `session`, whoever the holder pid was.
    ///
    /// The lifecycle manager calls this after killing that session: the
    /// holder process is gone and can no longer release for itself.
    pub fn release_session(&self, session: &str) {
        if let Some(holder) = self.read_holder() {
            if holder.session == session {
                self.release_as(holder.pid);
            }
        }
    }
}

/// Whether a pid is still running (signal 0 probe).
pub fn pid_alive(pid: i32) -> bool {
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), None).is_ok()
}

/// Find a pid that is certainly dead (for tests and stale-lock fixtures).
#[cfg(test)]
pub(crate) fn dead_pid() -> i32 {
    // Spawn and reap a short-lived child; its pid is then free.
    #[allow(clippy::unwrap_used)]
    let mut child = std::process::Command::new("true").spawn().unwrap();
    #[allow(clippy::unwrap_used)]
    child.wait().unwrap();
    #[allow(clippy::cast_possible_wrap)]
    let pid = child.id() as i32;
    pid
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
