// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine.
//!
//! Every variant's message carries the remediation next to the failure;
//! the CLI prints these verbatim.

use chrono::{DateTime, Utc};
use hd_adapters::{DrumsError, MuxError, RelicsError, VcsError};
use hd_core::{ConfigError, NameError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(
        "not inside an encampment (searched upward from {start}); \
         cd into an encampment or set HD_ENCAMPMENT_ROOT"
    )]
    NotInWorkspace { start: PathBuf },

    #[error("warband not found: {0} (see `hd warband list`)")]
    WarbandNotFound(String),

    #[error("multiplexer unavailable: tmux was not found or its server cannot be reached")]
    MultiplexerUnavailable,

    #[error(
        "identity at {workdir} is held by pid {holder_pid} \
         (session {holder_session}, since {acquired_at}); stop that session \
         or delete {workdir}/.runtime/agent.lock if the holder is gone"
    )]
    SessionHeld {
        workdir: PathBuf,
        holder_pid: i32,
        holder_session: String,
        acquired_at: DateTime<Utc>,
    },

    #[error(
        "another shutdown is already running (lock at {path}); \
         wait for it to finish or delete the lock file if it is stale"
    )]
    ShutdownLockHeld { path: PathBuf },

    #[error(
        "refusing shutdown of warband {warband}: uncommitted work on {}; \
         commit/push it or re-run with --nuclear to discard (THIS WILL LOSE WORK)",
        format_offenders(offenders)
    )]
    UncommittedWorkRefused {
        warband: String,
        /// `(raider name, work summary)` pairs.
        offenders: Vec<(String, String)>,
    },

    #[error(
        "refusing to kill the multiplexer server; \
         set HD_NUKE_ACKNOWLEDGED=1 to confirm the nuke"
    )]
    NukeNotAcknowledged,

    #[error("no role here: {0} is not an agent home directory")]
    NoRoleHere(PathBuf),

    #[error(transparent)]
    InvalidName(#[from] NameError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mux(#[from] MuxError),

    #[error(transparent)]
    Vcs(#[from] VcsError),

    #[error(transparent)]
    Relics(#[from] RelicsError),

    #[error(transparent)]
    Drums(#[from] DrumsError),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn format_offenders(offenders: &[(String, String)]) -> String {
    offenders
        .iter()
        .map(|(name, summary)| format!("{}: {}", name, summary))
        .collect::<Vec<_>>()
        .join("; ")
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}
