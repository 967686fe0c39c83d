// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drum messages as consumed from the message bus.

use crate::id::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Note,
    Handoff,
    Escalation,
    Announcement,
}

/// One delivered drum message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub from: Address,
    pub to: Address,
    pub subject: String,
    pub body: String,
    #[serde(default, rename = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub ephemeral: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

/// Payload for sending a new message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub to: Address,
    pub subject: String,
    pub body: String,
    #[serde(default, rename = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub ephemeral: bool,
}

impl NewMessage {
    pub fn new(to: impl Into<Address>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            kind: MessageKind::Note,
            priority: 0,
            reply_to: None,
            ephemeral: false,
        }
    }

    pub fn kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
