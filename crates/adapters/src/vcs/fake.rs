// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake VCS adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{UncommittedWork, Vcs, VcsError, VcsStatus};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Default)]
struct FakeVcsState {
    branches: HashMap<PathBuf, String>,
    uncommitted: HashMap<PathBuf, UncommittedWork>,
    worktrees_removed: Vec<PathBuf>,
    branches_deleted: Vec<String>,
    worktrees_added: Vec<(PathBuf, String)>,
}

/// Fake VCS adapter for testing
#[derive(Clone, Default)]
pub struct FakeVcs {
    inner: Arc<Mutex<FakeVcsState>>,
}

impl FakeVcs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the branch reported for a repo path.
    pub fn set_branch(&self, repo: &Path, branch: &str) {
        self.inner
            .lock()
            .branches
            .insert(repo.to_path_buf(), branch.to_string());
    }

    /// Seed uncommitted work for a repo path.
    pub fn set_uncommitted(&self, repo: &Path, work: UncommittedWork) {
        self.inner.lock().uncommitted.insert(repo.to_path_buf(), work);
    }

    /// Convenience: mark a repo as holding one modified file.
    pub fn set_dirty(&self, repo: &Path, file: &str) {
        let mut work = UncommittedWork::default();
        work.status.modified.push(file.to_string());
        self.set_uncommitted(repo, work);
    }

    pub fn worktrees_removed(&self) -> Vec<PathBuf> {
        self.inner.lock().worktrees_removed.clone()
    }

    pub fn branches_deleted(&self) -> Vec<String> {
        self.inner.lock().branches_deleted.clone()
    }

    pub fn worktrees_added(&self) -> Vec<(PathBuf, String)> {
        self.inner.lock().worktrees_added.clone()
    }
}

#[async_trait]
impl Vcs for FakeVcs {
    async fn current_branch(&self, repo: &Path) -> Result<String, VcsError> {
        Ok(self
            .inner
            .lock()
            .branches
            .get(repo)
            .cloned()
            .unwrap_or_else(|| "main".to_string()))
    }

    async fn checkout(&self, repo: &Path, branch: &str) -> Result<(), VcsError> {
        self.set_branch(repo, branch);
        Ok(())
    }

    async fn pull(&self, _repo: &Path) -> Result<(), VcsError> {
        Ok(())
    }

    async fn fetch(&self, _repo: &Path) -> Result<(), VcsError> {
        Ok(())
    }

    async fn status(&self, repo: &Path) -> Result<VcsStatus, VcsError> {
        Ok(self
            .inner
            .lock()
            .uncommitted
            .get(repo)
            .map(|w| w.status.clone())
            .unwrap_or_default())
    }

    async fn check_uncommitted(&self, repo: &Path) -> Result<UncommittedWork, VcsError> {
        Ok(self
            .inner
            .lock()
            .uncommitted
            .get(repo)
            .cloned()
            .unwrap_or_default())
    }

    async fn worktree_add_existing_force(
        &self,
        _repo: &Path,
        path: &Path,
        branch: &str,
    ) -> Result<(), VcsError> {
        self.inner
            .lock()
            .worktrees_added
            .push((path.to_path_buf(), branch.to_string()));
        Ok(())
    }

    async fn worktree_add_new_branch(
        &self,
        _repo: &Path,
        path: &Path,
        branch: &str,
        _base: &str,
    ) -> Result<(), VcsError> {
        self.inner
            .lock()
            .worktrees_added
            .push((path.to_path_buf(), branch.to_string()));
        Ok(())
    }

    async fn worktree_remove(&self, _repo: &Path, path: &Path) -> Result<(), VcsError> {
        self.inner.lock().worktrees_removed.push(path.to_path_buf());
        Ok(())
    }

    async fn delete_branch(&self, _repo: &Path, branch: &str) -> Result<(), VcsError> {
        self.inner.lock().branches_deleted.push(branch.to_string());
        Ok(())
    }
}
