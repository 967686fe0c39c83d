// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake issue store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{IssueStore, RelicsError};
use async_trait::async_trait;
use hd_core::{BeadId, HookUpdate, Issue, IssueFilter, IssueStatus, IssueUpdate, NewIssue};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Default)]
struct FakeRelicsState {
    // dir -> id -> issue
    stores: BTreeMap<PathBuf, BTreeMap<String, Issue>>,
    // dir -> id prefix used by create
    prefixes: BTreeMap<PathBuf, String>,
    next_id: u64,
    missing_binary: bool,
}

/// Fake issue store for testing
#[derive(Clone, Default)]
pub struct FakeRelics {
    inner: Arc<Mutex<FakeRelicsState>>,
}

impl FakeRelics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an issue into a store directory.
    pub fn insert(&self, dir: &Path, issue: Issue) {
        self.inner
            .lock()
            .stores
            .entry(dir.to_path_buf())
            .or_default()
            .insert(issue.id.as_str().to_string(), issue);
    }

    /// Set the id prefix used by `create` for a store directory.
    pub fn set_prefix(&self, dir: &Path, prefix: &str) {
        self.inner
            .lock()
            .prefixes
            .insert(dir.to_path_buf(), prefix.to_string());
    }

    /// Make every call fail as if the binary were absent.
    pub fn set_missing_binary(&self, missing: bool) {
        self.inner.lock().missing_binary = missing;
    }

    /// Read an issue back out.
    pub fn get(&self, dir: &Path, id: &str) -> Option<Issue> {
        self.inner
            .lock()
            .stores
            .get(dir)
            .and_then(|s| s.get(id))
            .cloned()
    }

    fn check_binary(&self) -> Result<(), RelicsError> {
        if self.inner.lock().missing_binary {
            Err(RelicsError::DependencyMissing("relics".to_string()))
        } else {
            Ok(())
        }
    }
}

fn matches_filter(issue: &Issue, filter: &IssueFilter) -> bool {
    if let Some(status) = filter.status {
        if issue.status != status {
            return false;
        }
    }
    if let Some(ref assignee) = filter.assignee {
        if issue.assignee.as_ref() != Some(assignee) {
            return false;
        }
    }
    filter
        .labels
        .iter()
        .all(|label| issue.labels.contains(label))
}

#[async_trait]
impl IssueStore for FakeRelics {
    async fn create(
        &self,
        dir: &Path,
        _kind: &str,
        issue: NewIssue,
    ) -> Result<BeadId, RelicsError> {
        self.check_binary()?;
        let mut inner = self.inner.lock();
        let id = match &issue.id {
            Some(id) => id.as_str().to_string(),
            None => {
                inner.next_id += 1;
                let prefix = inner
                    .prefixes
                    .get(dir)
                    .cloned()
                    .unwrap_or_else(|| "bead".to_string());
                format!("{}-{}", prefix, inner.next_id)
            }
        };

        let mut record = Issue::new(id.clone(), issue.title);
        record.description = issue.description;
        record.assignee = issue.assignee;
        record.labels = issue.labels;
        record.priority = issue.priority;
        inner
            .stores
            .entry(dir.to_path_buf())
            .or_default()
            .insert(id.clone(), record);
        Ok(BeadId::new(id))
    }

    async fn show(&self, dir: &Path, id: &str) -> Result<Issue, RelicsError> {
        self.check_binary()?;
        self.get(dir, id)
            .ok_or_else(|| RelicsError::NotFound(id.to_string()))
    }

    async fn update(&self, dir: &Path, id: &str, update: IssueUpdate) -> Result<(), RelicsError> {
        self.check_binary()?;
        let mut inner = self.inner.lock();
        let issue = inner
            .stores
            .get_mut(dir)
            .and_then(|s| s.get_mut(id))
            .ok_or_else(|| RelicsError::NotFound(id.to_string()))?;
        if let Some(status) = update.status {
            issue.status = status;
        }
        if let Some(assignee) = update.assignee {
            issue.assignee = Some(assignee);
        }
        match update.hook {
            Some(HookUpdate::Set(bead)) => issue.hook = Some(bead),
            Some(HookUpdate::Clear) => issue.hook = None,
            None => {}
        }
        Ok(())
    }

    async fn list(&self, dir: &Path, filter: IssueFilter) -> Result<Vec<Issue>, RelicsError> {
        self.check_binary()?;
        let inner = self.inner.lock();
        Ok(inner
            .stores
            .get(dir)
            .map(|store| {
                store
                    .values()
                    .filter(|issue| matches_filter(issue, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Pinned status used widely in tests.
pub fn pinned(issue: &Issue) -> bool {
    issue.status == IssueStatus::Pinned
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
