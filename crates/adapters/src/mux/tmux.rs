// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tmux multiplexer adapter

use super::{Multiplexer, MuxError};
use crate::subprocess::{run_with_timeout, TMUX_TIMEOUT};
use async_trait::async_trait;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;

/// Tmux-based multiplexer adapter
#[derive(Clone, Default)]
pub struct TmuxMux;

impl TmuxMux {
    pub fn new() -> Self {
        Self
    }

    async fn run(&self, args: &[&str], description: &str) -> Result<Output, MuxError> {
        let mut cmd = Command::new("tmux");
        cmd.args(args);
        run_with_timeout(cmd, TMUX_TIMEOUT, description)
            .await
            .map_err(MuxError::Unavailable)
    }
}

#[async_trait]
impl Multiplexer for TmuxMux {
    async fn available(&self) -> bool {
        self.run(&["-V"], "tmux version probe")
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    async fn has_session(&self, name: &str) -> Result<bool, MuxError> {
        // '=' pins exact-match; tmux otherwise prefix-matches targets
        let target = format!("={}", name);
        let output = self
            .run(&["has-session", "-t", &target], "tmux has-session")
            .await?;
        Ok(output.status.success())
    }

    async fn list_sessions(&self) -> Result<Vec<String>, MuxError> {
        let output = self
            .run(
                &["list-sessions", "-F", "#{session_name}"],
                "tmux list-sessions",
            )
            .await?;
        if !output.status.success() {
            // No server running means no sessions
            return Ok(Vec::new());
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }

    async fn create_detached(
        &self,
        name: &str,
        cwd: &Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<(), MuxError> {
        // Precondition: cwd must exist
        if !cwd.exists() {
            return Err(MuxError::CommandFailed(format!(
                "working directory does not exist: {}",
                cwd.display()
            )));
        }

        let mut tmux_cmd = Command::new("tmux");
        tmux_cmd
            .arg("new-session")
            .arg("-d")
            .arg("-s")
            .arg(name)
            .arg("-c")
            .arg(cwd);
        for (key, value) in env {
            tmux_cmd.arg("-e").arg(format!("{}={}", key, value));
        }
        tmux_cmd.arg(cmd);

        let output = run_with_timeout(tmux_cmd, TMUX_TIMEOUT, "tmux new-session")
            .await
            .map_err(MuxError::Unavailable)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(session = name, stderr = %stderr, "tmux spawn failed");
            return Err(MuxError::CommandFailed(stderr.to_string()));
        }

        // Log stderr even on success - may contain useful warnings
        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(session = name, stderr = %stderr, "tmux spawn stderr (non-fatal)");
        }

        Ok(())
    }

    async fn kill_session(&self, name: &str) -> Result<(), MuxError> {
        let target = format!("={}", name);
        // Failure tolerated: session may already be gone
        let _ = self
            .run(&["kill-session", "-t", &target], "tmux kill-session")
            .await?;
        Ok(())
    }

    async fn kill_session_with_processes(&self, name: &str) -> Result<(), MuxError> {
        let target = format!("={}", name);
        let output = self
            .run(
                &["list-panes", "-s", "-t", &target, "-F", "#{pane_pid}"],
                "tmux list-panes",
            )
            .await?;

        if output.status.success() {
            for pid in String::from_utf8_lossy(&output.stdout).lines() {
                let pid = pid.trim();
                if pid.is_empty() {
                    continue;
                }
                // Signal the pane's children (the runtime and its tree),
                // then the pane process itself. Failures tolerated: the
                // processes may already be gone.
                let mut pkill = Command::new("pkill");
                pkill.args(["-TERM", "-P", pid]);
                let _ = run_with_timeout(pkill, TMUX_TIMEOUT, "pkill pane children").await;

                let mut kill = Command::new("kill");
                kill.args(["-TERM", pid]);
                let _ = run_with_timeout(kill, TMUX_TIMEOUT, "kill pane process").await;
            }
        }

        self.kill_session(name).await
    }

    async fn kill_server(&self) -> Result<(), MuxError> {
        let _ = self.run(&["kill-server"], "tmux kill-server").await?;
        Ok(())
    }

    async fn send_keys(&self, name: &str, literal: &str) -> Result<(), MuxError> {
        let target = format!("={}", name);
        // -l = literal mode (no key name interpretation)
        // -- = end of options (handles text starting with -)
        let output = self
            .run(
                &["send-keys", "-t", &target, "-l", "--", literal],
                "tmux send-keys",
            )
            .await?;
        if !output.status.success() {
            return Err(MuxError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn send_keys_raw(&self, name: &str, keyspec: &str) -> Result<(), MuxError> {
        let target = format!("={}", name);
        let output = self
            .run(&["send-keys", "-t", &target, keyspec], "tmux send-keys")
            .await?;
        if !output.status.success() {
            return Err(MuxError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn clear_history(&self, pane: &str) -> Result<(), MuxError> {
        let output = self
            .run(&["clear-history", "-t", pane], "tmux clear-history")
            .await?;
        if !output.status.success() {
            return Err(MuxError::NotFound(pane.to_string()));
        }
        Ok(())
    }

    async fn respawn_pane(&self, pane: &str, cmd: &str) -> Result<(), MuxError> {
        let output = self
            .run(&["respawn-pane", "-k", "-t", pane, cmd], "tmux respawn-pane")
            .await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MuxError::CommandFailed(format!(
                "respawn-pane {}: {}",
                pane, stderr
            )));
        }
        Ok(())
    }

    async fn pane_id(&self, session: &str) -> Result<String, MuxError> {
        let target = format!("={}", session);
        let output = self
            .run(
                &["list-panes", "-t", &target, "-F", "#{pane_id}"],
                "tmux list-panes",
            )
            .await?;
        if !output.status.success() {
            return Err(MuxError::NotFound(session.to_string()));
        }
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .map(str::to_string)
            .ok_or_else(|| MuxError::NotFound(session.to_string()))
    }

    async fn capture_pane(&self, session: &str, lines: u32) -> Result<String, MuxError> {
        let target = format!("={}", session);
        let start = format!("-{}", lines);
        let output = self
            .run(
                &["capture-pane", "-t", &target, "-p", "-S", &start],
                "tmux capture-pane",
            )
            .await?;
        if !output.status.success() {
            return Err(MuxError::NotFound(session.to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn is_agent_running(&self, session: &str, expected: &[&str]) -> Result<bool, MuxError> {
        let target = format!("={}", session);
        let output = self
            .run(
                &["list-panes", "-t", &target, "-F", "#{pane_pid}"],
                "tmux list-panes",
            )
            .await?;
        if !output.status.success() {
            return Err(MuxError::NotFound(session.to_string()));
        }

        let pids: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        for pane_pid in &pids {
            // The pane may exec the runtime directly, or run it under a shell.
            let mut ps = Command::new("ps");
            ps.args(["-p", pane_pid.as_str(), "-o", "command="]);
            if let Ok(ps_output) = run_with_timeout(ps, TMUX_TIMEOUT, "ps pane process").await {
                if ps_output.status.success() {
                    let cmd_line = String::from_utf8_lossy(&ps_output.stdout);
                    if expected.iter().any(|e| cmd_line.contains(e)) {
                        return Ok(true);
                    }
                }
            }

            for pattern in expected {
                let mut pgrep = Command::new("pgrep");
                pgrep.args(["-P", pane_pid.as_str(), "-f", *pattern]);
                if let Ok(pgrep_output) =
                    run_with_timeout(pgrep, TMUX_TIMEOUT, "pgrep pane children").await
                {
                    if pgrep_output.status.success() {
                        return Ok(true);
                    }
                }
            }
        }

        Ok(false)
    }

    async fn switch_client(&self, session: &str) -> Result<(), MuxError> {
        let target = format!("={}", session);
        let output = self
            .run(&["switch-client", "-t", &target], "tmux switch-client")
            .await?;
        if !output.status.success() {
            return Err(MuxError::NotFound(session.to_string()));
        }
        Ok(())
    }

    fn is_inside(&self) -> bool {
        std::env::var_os("TMUX").is_some()
    }

    async fn current_session_name(&self) -> Result<Option<String>, MuxError> {
        if !self.is_inside() {
            return Ok(None);
        }
        let output = self
            .run(
                &["display-message", "-p", "#{session_name}"],
                "tmux display-message",
            )
            .await?;
        if !output.status.success() {
            return Ok(None);
        }
        let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(if name.is_empty() { None } else { Some(name) })
    }
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
