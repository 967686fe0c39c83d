// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake message bus for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{DrumsError, MessageBus};
use async_trait::async_trait;
use chrono::Utc;
use hd_core::{Message, NewMessage};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default)]
struct FakeDrumsState {
    // address -> messages in delivery order
    mailboxes: BTreeMap<String, Vec<Message>>,
    next_id: u64,
    missing_binary: bool,
}

/// Fake message bus for testing
#[derive(Clone, Default)]
pub struct FakeDrums {
    inner: Arc<Mutex<FakeDrumsState>>,
}

impl FakeDrums {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the binary were absent.
    pub fn set_missing_binary(&self, missing: bool) {
        self.inner.lock().missing_binary = missing;
    }

    /// All messages ever delivered to an address.
    pub fn delivered(&self, address: &str) -> Vec<Message> {
        self.inner
            .lock()
            .mailboxes
            .get(address)
            .cloned()
            .unwrap_or_default()
    }

    fn check_binary(&self) -> Result<(), DrumsError> {
        if self.inner.lock().missing_binary {
            Err(DrumsError::DependencyMissing("drums".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MessageBus for FakeDrums {
    async fn send(&self, from: &str, msg: NewMessage) -> Result<String, DrumsError> {
        self.check_binary()?;
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = format!("drum-{}", inner.next_id);
        let to = msg.to.clone();
        let message = Message {
            id: id.clone(),
            from: from.into(),
            to: msg.to,
            subject: msg.subject,
            body: msg.body,
            kind: msg.kind,
            priority: msg.priority,
            thread_id: None,
            reply_to: msg.reply_to,
            ephemeral: msg.ephemeral,
            timestamp: Utc::now(),
            read: false,
        };
        inner
            .mailboxes
            .entry(to.into_inner())
            .or_default()
            .push(message);
        Ok(id)
    }

    async fn list(&self, address: &str) -> Result<Vec<Message>, DrumsError> {
        self.check_binary()?;
        Ok(self.delivered(address))
    }

    async fn list_unread(&self, address: &str) -> Result<Vec<Message>, DrumsError> {
        self.check_binary()?;
        Ok(self
            .delivered(address)
            .into_iter()
            .filter(|m| !m.read)
            .collect())
    }

    async fn count(&self, address: &str) -> Result<usize, DrumsError> {
        Ok(self.list_unread(address).await?.len())
    }

    async fn get(&self, address: &str, id: &str) -> Result<Message, DrumsError> {
        self.check_binary()?;
        self.delivered(address)
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| DrumsError::NotFound(id.to_string()))
    }

    async fn delete(&self, address: &str, id: &str) -> Result<(), DrumsError> {
        self.check_binary()?;
        let mut inner = self.inner.lock();
        let mailbox = inner
            .mailboxes
            .get_mut(address)
            .ok_or_else(|| DrumsError::NotFound(id.to_string()))?;
        let before = mailbox.len();
        mailbox.retain(|m| m.id != id);
        if mailbox.len() == before {
            return Err(DrumsError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn mark_read(&self, address: &str, id: &str) -> Result<(), DrumsError> {
        self.check_binary()?;
        let mut inner = self.inner.lock();
        let message = inner
            .mailboxes
            .get_mut(address)
            .and_then(|mb| mb.iter_mut().find(|m| m.id == id))
            .ok_or_else(|| DrumsError::NotFound(id.to_string()))?;
        message.read = true;
        Ok(())
    }

    async fn mark_unread(&self, address: &str, id: &str) -> Result<(), DrumsError> {
        self.check_binary()?;
        let mut inner = self.inner.lock();
        let message = inner
            .mailboxes
            .get_mut(address)
            .and_then(|mb| mb.iter_mut().find(|m| m.id == id))
            .ok_or_else(|| DrumsError::NotFound(id.to_string()))?;
        message.read = false;
        Ok(())
    }

    async fn list_by_thread(
        &self,
        address: &str,
        thread: &str,
    ) -> Result<Vec<Message>, DrumsError> {
        self.check_binary()?;
        Ok(self
            .delivered(address)
            .into_iter()
            .filter(|m| m.thread_id.as_deref() == Some(thread))
            .collect())
    }

    async fn check_teaser(&self, address: &str) -> Result<Option<String>, DrumsError> {
        self.check_binary()?;
        let unread = self.list_unread(address).await?;
        if unread.is_empty() {
            return Ok(None);
        }
        let latest = &unread[unread.len() - 1];
        Ok(Some(format!(
            "{} unread message(s); latest from {}: {}",
            unread.len(),
            latest.from,
            latest.subject
        )))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
