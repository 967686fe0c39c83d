// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operational-state gate for warbands.
//!
//! The local layer is a "wisp": an ephemeral key-value JSON file under the
//! warband's `.runtime` directory, set by `park`/`unpark` and never synced.
//! The global layer is whatever labels ride on the warband's identity bead
//! in the issue store. Resolution precedence lives in
//! [`hd_core::GateState::resolve`]; this module owns the plumbing.

use crate::error::EngineError;
use crate::workspace::{Workspace, RUNTIME_DIR};
use hd_adapters::relics::RELICS_DIR_NAME;
use hd_adapters::IssueStore;
use hd_core::{GateState, WarbandConfig};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const WISP_FILE: &str = "wisp.json";

/// Key carrying the operational state in the wisp.
pub const STATUS_KEY: &str = "status";

fn wisp_path(warband_dir: &Path) -> PathBuf {
    warband_dir.join(RUNTIME_DIR).join(WISP_FILE)
}

/// Read the warband's wisp key-value store. Missing or corrupt files are
/// an empty map.
pub fn read_wisp(warband_dir: &Path) -> BTreeMap<String, String> {
    let Ok(content) = std::fs::read_to_string(wisp_path(warband_dir)) else {
        return BTreeMap::new();
    };
    serde_json::from_str(&content).unwrap_or_default()
}

/// Set one wisp key.
pub fn set_wisp_key(warband_dir: &Path, key: &str, value: &str) -> Result<(), EngineError> {
    let mut wisp = read_wisp(warband_dir);
    wisp.insert(key.to_string(), value.to_string());
    write_wisp(warband_dir, &wisp)
}

/// Remove one wisp key; an empty wisp file is removed entirely.
pub fn clear_wisp_key(warband_dir: &Path, key: &str) -> Result<(), EngineError> {
    let mut wisp = read_wisp(warband_dir);
    wisp.remove(key);
    if wisp.is_empty() {
        let path = wisp_path(warband_dir);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| EngineError::io(&path, e))?;
        }
        return Ok(());
    }
    write_wisp(warband_dir, &wisp)
}

fn write_wisp(warband_dir: &Path, wisp: &BTreeMap<String, String>) -> Result<(), EngineError> {
    let path = wisp_path(warband_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
    }
    let content = serde_json::to_string_pretty(wisp)
        .unwrap_or_else(|_| String::from("{}"));
    std::fs::write(&path, content).map_err(|e| EngineError::io(&path, e))
}

/// Resolve a warband's operational state from both layers.
///
/// A missing identity bead (or an unreachable store) reads as no global
/// labels; the gate itself never fails a scheduling decision.
pub async fn gate_state<I: IssueStore>(
    ws: &Workspace,
    warband: &WarbandConfig,
    relics: &I,
) -> GateState {
    let warband_dir = warband.dir(ws.root());
    let wisp = read_wisp(&warband_dir);
    let local = wisp.get(STATUS_KEY).map(String::as_str);

    let relics_dir = warband_dir.join(RELICS_DIR_NAME);
    let labels = match relics.show(&relics_dir, &warband.identity_bead()).await {
        Ok(bead) => bead.labels,
        Err(e) => {
            tracing::debug!(
                warband = %warband.name,
                error = %e,
                "no identity bead for gate; using default"
            );
            Vec::new()
        }
    };

    GateState::resolve(local, &labels)
}

#[cfg(test)]
#[path = "opsgate_tests.rs"]
mod tests;
