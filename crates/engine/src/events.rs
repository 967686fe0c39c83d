// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only event log under `daemon/events.jsonl`.
//!
//! Events are operational breadcrumbs, not state: nothing replays them.
//! Append failures are logged and swallowed so an unwritable log never
//! fails a rally or a shutdown.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One logged control-plane event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub at: DateTime<Utc>,
    pub kind: EventKind,
    /// Acting agent address, when known.
    #[serde(default)]
    pub actor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    SessionStart {
        session: String,
    },
    Handoff {
        session: String,
        target: String,
    },
    Halt {
        stopped: Vec<String>,
    },
    Escalation {
        bead: String,
    },
}

/// Append-only JSONL event log.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an event; failures are warnings, never errors.
    pub fn emit(&self, kind: EventKind, actor: Option<&str>) {
        let event = Event {
            id: uuid::Uuid::new_v4().to_string(),
            at: Utc::now(),
            kind,
            actor: actor.map(str::to_string),
        };
        if let Err(e) = self.append(&event) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to append event");
        }
    }

    fn append(&self, event: &Event) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(event)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }

    /// Read back all events, skipping malformed lines.
    pub fn read_all(&self) -> Vec<Event> {
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect()
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
