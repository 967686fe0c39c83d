// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal multiplexer adapters

mod tmux;

pub use tmux::TmuxMux;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMux, FakeMuxSession, MuxCall};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors from multiplexer operations
#[derive(Debug, Error)]
pub enum MuxError {
    #[error("multiplexer unavailable: {0}")]
    Unavailable(String),
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("multiplexer command failed: {0}")]
    CommandFailed(String),
}

/// Typed operations over the external terminal multiplexer.
///
/// Every destructive operation tolerates "session already gone" as
/// success; the session namespace is shared and sessions can vanish
/// between any two calls.
#[async_trait]
pub trait Multiplexer: Clone + Send + Sync + 'static {
    /// Whether the multiplexer binary is usable at all.
    async fn available(&self) -> bool;

    async fn has_session(&self, name: &str) -> Result<bool, MuxError>;

    /// All live session names. A stopped server is an empty list.
    async fn list_sessions(&self) -> Result<Vec<String>, MuxError>;

    /// Create a detached session running `cmd` in `cwd`.
    async fn create_detached(
        &self,
        name: &str,
        cwd: &Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<(), MuxError>;

    /// Kill the session metadata only.
    async fn kill_session(&self, name: &str) -> Result<(), MuxError>;

    /// Kill the session AND the child processes of its panes.
    ///
    /// Killing only the session can orphan the LLM runtime started from a
    /// pane shell; this variant signals each pane's process tree first.
    async fn kill_session_with_processes(&self, name: &str) -> Result<(), MuxError>;

    /// Kill the entire multiplexer server.
    async fn kill_server(&self) -> Result<(), MuxError>;

    /// Send literal text (no key-name interpretation).
    async fn send_keys(&self, name: &str, literal: &str) -> Result<(), MuxError>;

    /// Send a keyspec such as `Enter` or `C-c`.
    async fn send_keys_raw(&self, name: &str, keyspec: &str) -> Result<(), MuxError>;

    /// Clear a pane's scrollback (also exits copy-mode).
    async fn clear_history(&self, pane: &str) -> Result<(), MuxError>;

    /// Replace a pane's process in place, preserving the pane id.
    async fn respawn_pane(&self, pane: &str, cmd: &str) -> Result<(), MuxError>;

    /// First pane id of a session (e.g. `%12`).
    async fn pane_id(&self, session: &str) -> Result<String, MuxError>;

    /// Capture the last `lines` lines of a session's active pane.
    async fn capture_pane(&self, session: &str, lines: u32) -> Result<String, MuxError>;

    /// Whether one of `expected` commands is running as (or under) the
    /// session's foreground pane process.
    async fn is_agent_running(&self, session: &str, expected: &[&str]) -> Result<bool, MuxError>;

    /// Switch the attached client to another session.
    async fn switch_client(&self, session: &str) -> Result<(), MuxError>;

    /// Whether this process runs inside the multiplexer.
    fn is_inside(&self) -> bool;

    /// Name of the session this process runs inside, if any.
    async fn current_session_name(&self) -> Result<Option<String>, MuxError>;
}
