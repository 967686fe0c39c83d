// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Version control adapters

mod git;

pub use git::GitVcs;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeVcs;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors from version control operations
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("git unavailable: {0}")]
    Unavailable(String),
    #[error("git {op} failed: {detail}")]
    CommandFailed { op: String, detail: String },
}

/// Working-tree status, parsed from porcelain output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VcsStatus {
    pub modified: Vec<String>,
    pub added: Vec<String>,
    pub deleted: Vec<String>,
    pub untracked: Vec<String>,
}

impl VcsStatus {
    pub fn clean(&self) -> bool {
        self.modified.is_empty()
            && self.added.is_empty()
            && self.deleted.is_empty()
            && self.untracked.is_empty()
    }
}

/// Everything that would be lost if a workspace were deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UncommittedWork {
    pub status: VcsStatus,
    pub stashes: usize,
    pub unpushed_commits: usize,
}

impl UncommittedWork {
    pub fn clean(&self) -> bool {
        self.status.clean() && self.stashes == 0 && self.unpushed_commits == 0
    }

    /// Short human summary, e.g. `1 modified, 2 untracked, 1 stash`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        let counts = [
            (self.status.modified.len(), "modified"),
            (self.status.added.len(), "added"),
            (self.status.deleted.len(), "deleted"),
            (self.status.untracked.len(), "untracked"),
        ];
        for (count, label) in counts {
            if count > 0 {
                parts.push(format!("{} {}", count, label));
            }
        }
        if self.stashes > 0 {
            let label = if self.stashes == 1 { "stash" } else { "stashes" };
            parts.push(format!("{} {}", self.stashes, label));
        }
        if self.unpushed_commits > 0 {
            parts.push(format!("{} unpushed", self.unpushed_commits));
        }
        if parts.is_empty() {
            "clean".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Adapter over git for workspace and worktree management.
#[async_trait]
pub trait Vcs: Clone + Send + Sync + 'static {
    async fn current_branch(&self, repo: &Path) -> Result<String, VcsError>;

    async fn checkout(&self, repo: &Path, branch: &str) -> Result<(), VcsError>;

    async fn pull(&self, repo: &Path) -> Result<(), VcsError>;

    async fn fetch(&self, repo: &Path) -> Result<(), VcsError>;

    async fn status(&self, repo: &Path) -> Result<VcsStatus, VcsError>;

    /// Full loss check: working tree, stashes, and unpushed commits.
    async fn check_uncommitted(&self, repo: &Path) -> Result<UncommittedWork, VcsError>;

    /// `git worktree add --force <path> <branch>` for an existing branch.
    async fn worktree_add_existing_force(
        &self,
        repo: &Path,
        path: &Path,
        branch: &str,
    ) -> Result<(), VcsError>;

    /// `git worktree add --force -b <branch> <path> <base>`.
    async fn worktree_add_new_branch(
        &self,
        repo: &Path,
        path: &Path,
        branch: &str,
        base: &str,
    ) -> Result<(), VcsError>;

    async fn worktree_remove(&self, repo: &Path, path: &Path) -> Result<(), VcsError>;

    async fn delete_branch(&self, repo: &Path, branch: &str) -> Result<(), VcsError>;
}
