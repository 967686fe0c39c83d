// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Issue store adapter shelling out to the `relics` binary.

use super::{IssueStore, RelicsError};
use crate::subprocess::{run_required_binary, BinaryError, RELICS_TIMEOUT};
use async_trait::async_trait;
use hd_core::{BeadId, HookUpdate, Issue, IssueFilter, IssueUpdate, NewIssue};
use std::path::Path;
use std::process::Output;
use tokio::process::Command;

/// Issue store adapter invoking the external `relics` CLI.
#[derive(Clone)]
pub struct RelicsCli {
    binary: String,
}

impl Default for RelicsCli {
    fn default() -> Self {
        Self {
            binary: "relics".to_string(),
        }
    }
}

impl RelicsCli {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, dir: &Path, args: &[String]) -> Result<Output, RelicsError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--dir").arg(dir).args(args);
        run_required_binary(cmd, RELICS_TIMEOUT, &self.binary, "relics")
            .await
            .map_err(|e| match e {
                BinaryError::Missing(binary) => RelicsError::DependencyMissing(binary),
                BinaryError::Failed(detail) => RelicsError::CommandFailed(detail),
            })
    }

    fn check(output: Output, context: &str) -> Result<Vec<u8>, RelicsError> {
        if output.status.success() {
            return Ok(output.stdout);
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.to_ascii_lowercase().contains("not found") {
            return Err(RelicsError::NotFound(context.to_string()));
        }
        Err(RelicsError::CommandFailed(format!("{}: {}", context, stderr)))
    }
}

#[async_trait]
impl IssueStore for RelicsCli {
    async fn create(
        &self,
        dir: &Path,
        kind: &str,
        issue: NewIssue,
    ) -> Result<BeadId, RelicsError> {
        let mut args = vec![
            "create".to_string(),
            "--type".to_string(),
            kind.to_string(),
            "--title".to_string(),
            issue.title,
            "--json".to_string(),
        ];
        if let Some(id) = issue.id {
            args.push("--id".to_string());
            args.push(id.into_inner());
        }
        if !issue.description.is_empty() {
            args.push("--description".to_string());
            args.push(issue.description);
        }
        if let Some(assignee) = issue.assignee {
            args.push("--assignee".to_string());
            args.push(assignee.into_inner());
        }
        for label in issue.labels {
            args.push("--label".to_string());
            args.push(label);
        }
        if issue.priority != 0 {
            args.push("--priority".to_string());
            args.push(issue.priority.to_string());
        }

        let stdout = Self::check(self.run(dir, &args).await?, "create")?;
        let value: serde_json::Value = serde_json::from_slice(&stdout)
            .map_err(|e| RelicsError::InvalidOutput(e.to_string()))?;
        value["id"]
            .as_str()
            .map(BeadId::new)
            .ok_or_else(|| RelicsError::InvalidOutput("create output missing id".to_string()))
    }

    async fn show(&self, dir: &Path, id: &str) -> Result<Issue, RelicsError> {
        let args = vec!["show".to_string(), id.to_string(), "--json".to_string()];
        let stdout = Self::check(self.run(dir, &args).await?, id)?;
        serde_json::from_slice(&stdout).map_err(|e| RelicsError::InvalidOutput(e.to_string()))
    }

    async fn update(&self, dir: &Path, id: &str, update: IssueUpdate) -> Result<(), RelicsError> {
        let mut args = vec!["update".to_string(), id.to_string()];
        if let Some(status) = update.status {
            args.push("--status".to_string());
            args.push(status.as_str().to_string());
        }
        if let Some(assignee) = update.assignee {
            args.push("--assignee".to_string());
            args.push(assignee.into_inner());
        }
        match update.hook {
            Some(HookUpdate::Set(bead)) => {
                args.push("--hook".to_string());
                args.push(bead.into_inner());
            }
            Some(HookUpdate::Clear) => args.push("--clear-hook".to_string()),
            None => {}
        }

        Self::check(self.run(dir, &args).await?, id)?;
        Ok(())
    }

    async fn list(&self, dir: &Path, filter: IssueFilter) -> Result<Vec<Issue>, RelicsError> {
        let mut args = vec!["list".to_string(), "--json".to_string()];
        if let Some(kind) = filter.kind {
            args.push("--type".to_string());
            args.push(kind);
        }
        if let Some(status) = filter.status {
            args.push("--status".to_string());
            args.push(status.as_str().to_string());
        }
        if let Some(assignee) = filter.assignee {
            args.push("--assignee".to_string());
            args.push(assignee.into_inner());
        }
        for label in filter.labels {
            args.push("--label".to_string());
            args.push(label);
        }

        let stdout = Self::check(self.run(dir, &args).await?, "list")?;
        serde_json::from_slice(&stdout).map_err(|e| RelicsError::InvalidOutput(e.to_string()))
    }
}
