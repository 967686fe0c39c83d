// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Issue (bead) records as consumed from the issue store.
//!
//! The control plane never materializes a pointer graph between beads;
//! every reference is an id handed back to the store for lookup.

use crate::id::{Address, BeadId};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a bead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    #[default]
    Open,
    /// On an agent's hook; drives autonomous mode at the next rally.
    Pinned,
    InProgress,
    Blocked,
    Done,
}

impl IssueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::Pinned => "pinned",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Blocked => "blocked",
            IssueStatus::Done => "done",
        }
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One bead as returned by the issue store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: BeadId,
    pub title: String,
    #[serde(default)]
    pub status: IssueStatus,
    #[serde(default)]
    pub assignee: Option<Address>,
    #[serde(default)]
    pub description: String,
    /// Bead id pinned on this agent's hook (agent beads only).
    #[serde(default)]
    pub hook: Option<BeadId>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub blocked_by: Vec<BeadId>,
    #[serde(default)]
    pub priority: i64,
}

impl Issue {
    pub fn new(id: impl Into<BeadId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: IssueStatus::Open,
            assignee: None,
            description: String::new(),
            hook: None,
            labels: Vec::new(),
            blocked_by: Vec::new(),
            priority: 0,
        }
    }
}

/// Payload for creating a new bead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    /// Explicit bead id; agent beads have deterministic ids, task beads
    /// normally let the store allocate one.
    #[serde(default)]
    pub id: Option<BeadId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assignee: Option<Address>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub priority: i64,
}

impl NewIssue {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<BeadId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<Address>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }
}

/// Change to a bead's hook column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookUpdate {
    Set(BeadId),
    Clear,
}

/// Partial update applied via `IssueStore::update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueUpdate {
    pub status: Option<IssueStatus>,
    pub assignee: Option<Address>,
    pub hook: Option<HookUpdate>,
}

impl IssueUpdate {
    pub fn status(status: IssueStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_assignee(mut self, assignee: impl Into<Address>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_hook(mut self, hook: HookUpdate) -> Self {
        self.hook = Some(hook);
        self
    }
}

/// Filter for `IssueStore::list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    pub kind: Option<String>,
    pub status: Option<IssueStatus>,
    pub assignee: Option<Address>,
    pub labels: Vec<String>,
}

/// One routing-table entry mapping a bead-id prefix to a warband path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub prefix: String,
    pub path: String,
}

/// Bead-id prefix: the characters before the first `-`.
pub fn extract_prefix(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
