// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Issue store (`relics`) adapters and routing-table handling.

mod cli;
mod routes;

pub use cli::RelicsCli;
pub use routes::{append_route, load_routes, resolve_relics_dir, route_for_prefix, RELICS_DIR_NAME};

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeRelics;

use async_trait::async_trait;
use hd_core::{BeadId, Issue, IssueFilter, IssueUpdate, NewIssue};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from issue store operations
#[derive(Debug, Error)]
pub enum RelicsError {
    #[error("issue store binary not found: {0} (install it or adjust PATH)")]
    DependencyMissing(String),
    #[error("bead not found: {0}")]
    NotFound(String),
    #[error("route conflict: prefix {prefix:?} already routes to {existing:?}, refusing {requested:?}")]
    RouteConflict {
        prefix: String,
        existing: String,
        requested: String,
    },
    #[error("circular relics redirect starting at {0}")]
    CircularRedirect(PathBuf),
    #[error("issue store command failed: {0}")]
    CommandFailed(String),
    #[error("invalid issue store output: {0}")]
    InvalidOutput(String),
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Adapter over the external issue store.
///
/// `dir` is the resolved relics storage directory for the agent
/// (see [`resolve_relics_dir`]).
#[async_trait]
pub trait IssueStore: Clone + Send + Sync + 'static {
    async fn create(&self, dir: &Path, kind: &str, issue: NewIssue)
        -> Result<BeadId, RelicsError>;

    async fn show(&self, dir: &Path, id: &str) -> Result<Issue, RelicsError>;

    async fn update(&self, dir: &Path, id: &str, update: IssueUpdate) -> Result<(), RelicsError>;

    async fn list(&self, dir: &Path, filter: IssueFilter) -> Result<Vec<Issue>, RelicsError>;
}
