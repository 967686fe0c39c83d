// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon process handle.
//!
//! The daemon itself is an external collaborator; the engine only ensures
//! it is running (for `up`) and stops it (for shutdown), tracked through
//! `daemon/daemon.pid`.

use crate::error::EngineError;
use crate::identity::pid_alive;
use crate::workspace::Workspace;
use std::path::PathBuf;

/// Handle over the encampment daemon's pid file.
#[derive(Debug, Clone)]
pub struct DaemonHandle {
    pid_path: PathBuf,
    command: Vec<String>,
}

/// Daemon liveness as discovered from the pid file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    Running(i32),
    Stopped,
}

impl DaemonHandle {
    pub fn new(ws: &Workspace) -> Self {
        Self {
            pid_path: ws.daemon_pid_path(),
            command: ws.encampment.daemon_command.clone(),
        }
    }

    /// Recorded pid, if the file exists and parses.
    fn recorded_pid(&self) -> Option<i32> {
        std::fs::read_to_string(&self.pid_path)
            .ok()?
            .trim()
            .parse()
            .ok()
    }

    pub fn state(&self) -> DaemonState {
        match self.recorded_pid() {
            Some(pid) if pid_alive(pid) => DaemonState::Running(pid),
            _ => DaemonState::Stopped,
        }
    }

    /// Ensure the daemon runs: a live pid is left alone, otherwise the
    /// configured command is spawned detached and its pid recorded.
    /// An encampment with no daemon command configured is a no-op.
    pub fn ensure(&self) -> Result<DaemonState, EngineError> {
        if let DaemonState::Running(pid) = self.state() {
            return Ok(DaemonState::Running(pid));
        }
        let Some((program, args)) = self.command.split_first() else {
            return Ok(DaemonState::Stopped);
        };

        if let Some(parent) = self.pid_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
        }
        let child = std::process::Command::new(program)
            .args(args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|e| EngineError::io(&self.pid_path, e))?;

        #[allow(clippy::cast_possible_wrap)]
        let pid = child.id() as i32;
        std::fs::write(&self.pid_path, format!("{}\n", pid))
            .map_err(|e| EngineError::io(&self.pid_path, e))?;
        tracing::info!(pid, "daemon spawned");
        Ok(DaemonState::Running(pid))
    }

    /// Stop the daemon if it runs; the pid file is removed either way.
    pub fn stop(&self) -> Result<DaemonState, EngineError> {
        if let Some(pid) = self.recorded_pid() {
            if pid_alive(pid) {
                let _ = nix::sys::signal::kill(
                    nix::unistd::Pid::from_raw(pid),
                    nix::sys::signal::Signal::SIGTERM,
                );
                tracing::info!(pid, "daemon stopped");
            }
        }
        if self.pid_path.exists() {
            std::fs::remove_file(&self.pid_path).map_err(|e| EngineError::io(&self.pid_path, e))?;
        }
        Ok(DaemonState::Stopped)
    }
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
