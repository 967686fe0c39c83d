// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Default timeout for tmux commands.
pub const TMUX_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for plain git commands.
pub const GIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for git worktree operations.
pub const GIT_WORKTREE_TIMEOUT: Duration = Duration::from_secs(60);

/// Default timeout for issue store (`relics`) commands.
pub const RELICS_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for message bus (`drums`) commands.
pub const DRUMS_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`, converting
/// timeout expiration into a descriptive error message. The child process
/// is killed automatically if the timeout elapses (via the tokio `Child`
/// drop implementation).
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{} failed: {}", description, io_err)),
        Err(_elapsed) => Err(format!(
            "{} timed out after {}s",
            description,
            timeout.as_secs()
        )),
    }
}

/// Like [`run_with_timeout`], but distinguishes a missing binary from
/// other failures so callers can surface a dependency error.
pub async fn run_required_binary(
    mut cmd: Command,
    timeout: Duration,
    binary: &str,
    description: &str,
) -> Result<Output, BinaryError> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
            Err(BinaryError::Missing(binary.to_string()))
        }
        Ok(Err(io_err)) => Err(BinaryError::Failed(format!(
            "{} failed: {}",
            description, io_err
        ))),
        Err(_elapsed) => Err(BinaryError::Failed(format!(
            "{} timed out after {}s",
            description,
            timeout.as_secs()
        ))),
    }
}

/// Failure running an external binary.
#[derive(Debug)]
pub enum BinaryError {
    /// The binary was not found on PATH.
    Missing(String),
    /// The binary ran but the invocation failed.
    Failed(String),
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
