// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for engine tests.
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::workspace::Workspace;
use hd_core::{EncampmentConfig, WarbandConfig, WarbandRegistry};
use std::path::Path;
use tempfile::TempDir;

/// Build a minimal on-disk encampment with one warband (`greenplace`,
/// prefix `gp`) and the usual agent directories.
pub fn encampment() -> (TempDir, Workspace) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    let mut config = EncampmentConfig::new("basecamp", "camp");
    config.daemon_command = vec!["true".to_string()];
    config.save(root).unwrap();

    let mut registry = WarbandRegistry::default();
    registry
        .add(WarbandConfig::new("greenplace", "gp").unwrap())
        .unwrap();
    registry.save(root).unwrap();

    scaffold_warband(root, "greenplace");
    std::fs::create_dir_all(root.join("shaman")).unwrap();
    std::fs::create_dir_all(root.join("daemon")).unwrap();

    let ws = Workspace::open(root).unwrap();
    (dir, ws)
}

/// Create the standard directory layout for a warband.
pub fn scaffold_warband(root: &Path, name: &str) {
    let band = root.join(name);
    for sub in [
        "witness",
        "forge/warband",
        "warchief/warband",
        "raiders",
        "clan",
        ".relics",
    ] {
        std::fs::create_dir_all(band.join(sub)).unwrap();
    }
}

/// Add a raider workspace directory.
pub fn scaffold_raider(root: &Path, warband: &str, name: &str) {
    std::fs::create_dir_all(root.join(warband).join("raiders").join(name)).unwrap();
}

/// Add a crew workspace directory.
pub fn scaffold_crew(root: &Path, warband: &str, name: &str) {
    std::fs::create_dir_all(root.join(warband).join("clan").join(name)).unwrap();
}
