// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-warband operational state.
//!
//! Two layers feed the gate: an ephemeral local "wisp" key-value (set by
//! `park`/`unpark`) and a synced global layer read from labels on the
//! warband's identity bead. Local always wins. When only global labels
//! exist and both `parked` and `docked` are present, `parked` dominates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operational state of a warband.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpState {
    #[default]
    Operational,
    Parked,
    Docked,
}

impl OpState {
    /// Parse a wisp value or bead label. Unrecognized strings are `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "operational" => Some(OpState::Operational),
            "parked" => Some(OpState::Parked),
            "docked" => Some(OpState::Docked),
            _ => None,
        }
    }

    /// Whether the daemon may auto-start agents in this warband.
    /// Manual user-initiated starts ignore the gate entirely.
    pub fn allows_auto_start(self) -> bool {
        matches!(self, OpState::Operational)
    }
}

impl fmt::Display for OpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpState::Operational => write!(f, "OPERATIONAL"),
            OpState::Parked => write!(f, "PARKED"),
            OpState::Docked => write!(f, "DOCKED"),
        }
    }
}

/// Which layer produced the resolved state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateSource {
    Default,
    Local,
    Global,
}

/// Resolved state plus its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateState {
    pub state: OpState,
    pub source: StateSource,
}

impl GateState {
    /// Resolve the gate from the local wisp value and global bead labels.
    ///
    /// A missing identity bead shows up as an empty label slice and
    /// resolves to the default; the gate never fails a scheduler decision.
    pub fn resolve(local: Option<&str>, global_labels: &[String]) -> Self {
        if let Some(state) = local.and_then(OpState::from_label) {
            return GateState {
                state,
                source: StateSource::Local,
            };
        }
        let globals: Vec<OpState> = global_labels
            .iter()
            .filter_map(|l| OpState::from_label(l))
            .collect();
        if globals.contains(&OpState::Parked) {
            return GateState {
                state: OpState::Parked,
                source: StateSource::Global,
            };
        }
        if globals.contains(&OpState::Docked) {
            return GateState {
                state: OpState::Docked,
                source: StateSource::Global,
            };
        }
        GateState {
            state: OpState::Operational,
            source: StateSource::Default,
        }
    }
}

#[cfg(test)]
#[path = "opstate_tests.rs"]
mod tests;
