// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message bus adapter shelling out to the `drums` binary.

use super::{DrumsError, MessageBus};
use crate::subprocess::{run_required_binary, BinaryError, DRUMS_TIMEOUT};
use async_trait::async_trait;
use hd_core::{Message, MessageKind, NewMessage};
use std::process::Output;
use tokio::process::Command;

/// Message bus adapter invoking the external `drums` CLI.
#[derive(Clone)]
pub struct DrumsCli {
    binary: String,
}

impl Default for DrumsCli {
    fn default() -> Self {
        Self {
            binary: "drums".to_string(),
        }
    }
}

fn kind_str(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Note => "note",
        MessageKind::Handoff => "handoff",
        MessageKind::Escalation => "escalation",
        MessageKind::Announcement => "announcement",
    }
}

impl DrumsCli {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, args: &[String]) -> Result<Output, DrumsError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        run_required_binary(cmd, DRUMS_TIMEOUT, &self.binary, "drums")
            .await
            .map_err(|e| match e {
                BinaryError::Missing(binary) => DrumsError::DependencyMissing(binary),
                BinaryError::Failed(detail) => DrumsError::CommandFailed(detail),
            })
    }

    async fn run_checked(&self, args: &[String], context: &str) -> Result<Vec<u8>, DrumsError> {
        let output = self.run(args).await?;
        if output.status.success() {
            return Ok(output.stdout);
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.to_ascii_lowercase().contains("not found") {
            return Err(DrumsError::NotFound(context.to_string()));
        }
        Err(DrumsError::CommandFailed(format!("{}: {}", context, stderr)))
    }

    async fn list_json(&self, args: Vec<String>) -> Result<Vec<Message>, DrumsError> {
        let stdout = self.run_checked(&args, "list").await?;
        serde_json::from_slice(&stdout).map_err(|e| DrumsError::InvalidOutput(e.to_string()))
    }
}

#[async_trait]
impl MessageBus for DrumsCli {
    async fn send(&self, from: &str, msg: NewMessage) -> Result<String, DrumsError> {
        let mut args = vec![
            "send".to_string(),
            "--from".to_string(),
            from.to_string(),
            "--to".to_string(),
            msg.to.into_inner(),
            "--subject".to_string(),
            msg.subject,
            "--message".to_string(),
            msg.body,
            "--type".to_string(),
            kind_str(msg.kind).to_string(),
            "--json".to_string(),
        ];
        if msg.priority != 0 {
            args.push("--priority".to_string());
            args.push(msg.priority.to_string());
        }
        if let Some(reply_to) = msg.reply_to {
            args.push("--reply-to".to_string());
            args.push(reply_to);
        }
        if msg.ephemeral {
            args.push("--ephemeral".to_string());
        }

        let stdout = self.run_checked(&args, "send").await?;
        let value: serde_json::Value = serde_json::from_slice(&stdout)
            .map_err(|e| DrumsError::InvalidOutput(e.to_string()))?;
        value["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DrumsError::InvalidOutput("send output missing id".to_string()))
    }

    async fn list(&self, address: &str) -> Result<Vec<Message>, DrumsError> {
        self.list_json(vec![
            "inbox".to_string(),
            "--mailbox".to_string(),
            address.to_string(),
            "--json".to_string(),
        ])
        .await
    }

    async fn list_unread(&self, address: &str) -> Result<Vec<Message>, DrumsError> {
        self.list_json(vec![
            "inbox".to_string(),
            "--mailbox".to_string(),
            address.to_string(),
            "--unread".to_string(),
            "--json".to_string(),
        ])
        .await
    }

    async fn count(&self, address: &str) -> Result<usize, DrumsError> {
        Ok(self.list_unread(address).await?.len())
    }

    async fn get(&self, address: &str, id: &str) -> Result<Message, DrumsError> {
        let stdout = self
            .run_checked(
                &[
                    "read".to_string(),
                    id.to_string(),
                    "--mailbox".to_string(),
                    address.to_string(),
                    "--json".to_string(),
                ],
                id,
            )
            .await?;
        serde_json::from_slice(&stdout).map_err(|e| DrumsError::InvalidOutput(e.to_string()))
    }

    async fn delete(&self, address: &str, id: &str) -> Result<(), DrumsError> {
        self.run_checked(
            &[
                "delete".to_string(),
                id.to_string(),
                "--mailbox".to_string(),
                address.to_string(),
            ],
            id,
        )
        .await?;
        Ok(())
    }

    async fn mark_read(&self, address: &str, id: &str) -> Result<(), DrumsError> {
        self.run_checked(
            &[
                "mark".to_string(),
                id.to_string(),
                "--read".to_string(),
                "--mailbox".to_string(),
                address.to_string(),
            ],
            id,
        )
        .await?;
        Ok(())
    }

    async fn mark_unread(&self, address: &str, id: &str) -> Result<(), DrumsError> {
        self.run_checked(
            &[
                "mark".to_string(),
                id.to_string(),
                "--unread".to_string(),
                "--mailbox".to_string(),
                address.to_string(),
            ],
            id,
        )
        .await?;
        Ok(())
    }

    async fn list_by_thread(
        &self,
        address: &str,
        thread: &str,
    ) -> Result<Vec<Message>, DrumsError> {
        self.list_json(vec![
            "thread".to_string(),
            thread.to_string(),
            "--mailbox".to_string(),
            address.to_string(),
            "--json".to_string(),
        ])
        .await
    }

    async fn check_teaser(&self, address: &str) -> Result<Option<String>, DrumsError> {
        let stdout = self
            .run_checked(
                &[
                    "check".to_string(),
                    "--mailbox".to_string(),
                    address.to_string(),
                    "--inject".to_string(),
                ],
                "check",
            )
            .await?;
        let teaser = String::from_utf8_lossy(&stdout).trim().to_string();
        Ok(if teaser.is_empty() { None } else { Some(teaser) })
    }
}
