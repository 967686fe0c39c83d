// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message bus (`drums`) adapters.

mod cli;

pub use cli::DrumsCli;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeDrums;

use async_trait::async_trait;
use hd_core::{Address, Message, NewMessage};
use thiserror::Error;

/// Errors from message bus operations
#[derive(Debug, Error)]
pub enum DrumsError {
    #[error("message bus binary not found: {0} (install it or adjust PATH)")]
    DependencyMissing(String),
    #[error("message not found: {0}")]
    NotFound(String),
    #[error("message bus command failed: {0}")]
    CommandFailed(String),
    #[error("invalid message bus output: {0}")]
    InvalidOutput(String),
}

/// Adapter over the external message bus.
///
/// All operations are scoped to a mailbox address; [`Mailbox`] packages
/// the pair for callers that talk to one box repeatedly.
#[async_trait]
pub trait MessageBus: Clone + Send + Sync + 'static {
    /// Deliver a message; returns its id.
    async fn send(&self, from: &str, msg: NewMessage) -> Result<String, DrumsError>;

    async fn list(&self, address: &str) -> Result<Vec<Message>, DrumsError>;

    async fn list_unread(&self, address: &str) -> Result<Vec<Message>, DrumsError>;

    async fn count(&self, address: &str) -> Result<usize, DrumsError>;

    async fn get(&self, address: &str, id: &str) -> Result<Message, DrumsError>;

    async fn delete(&self, address: &str, id: &str) -> Result<(), DrumsError>;

    async fn mark_read(&self, address: &str, id: &str) -> Result<(), DrumsError>;

    async fn mark_unread(&self, address: &str, id: &str) -> Result<(), DrumsError>;

    async fn list_by_thread(&self, address: &str, thread: &str)
        -> Result<Vec<Message>, DrumsError>;

    /// One-line unread teaser for the rally banner (`drums check --inject`).
    async fn check_teaser(&self, address: &str) -> Result<Option<String>, DrumsError>;
}

/// A bus bound to one mailbox address.
#[derive(Clone)]
pub struct Mailbox<B> {
    bus: B,
    address: Address,
}

impl<B: MessageBus> Mailbox<B> {
    pub fn new(bus: B, address: Address) -> Self {
        Self { bus, address }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub async fn send(&self, msg: NewMessage) -> Result<String, DrumsError> {
        self.bus.send(self.address.as_str(), msg).await
    }

    pub async fn list(&self) -> Result<Vec<Message>, DrumsError> {
        self.bus.list(self.address.as_str()).await
    }

    pub async fn list_unread(&self) -> Result<Vec<Message>, DrumsError> {
        self.bus.list_unread(self.address.as_str()).await
    }

    pub async fn count(&self) -> Result<usize, DrumsError> {
        self.bus.count(self.address.as_str()).await
    }

    pub async fn get(&self, id: &str) -> Result<Message, DrumsError> {
        self.bus.get(self.address.as_str(), id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), DrumsError> {
        self.bus.delete(self.address.as_str(), id).await
    }

    pub async fn mark_read(&self, id: &str) -> Result<(), DrumsError> {
        self.bus.mark_read(self.address.as_str(), id).await
    }

    pub async fn mark_unread(&self, id: &str) -> Result<(), DrumsError> {
        self.bus.mark_unread(self.address.as_str(), id).await
    }

    pub async fn list_by_thread(&self, thread: &str) -> Result<Vec<Message>, DrumsError> {
        self.bus.list_by_thread(self.address.as_str(), thread).await
    }
}
