//! Shared fixtures for the behavioral specs.

use hd_core::{EncampmentConfig, WarbandConfig, WarbandRegistry};
use hd_engine::Workspace;
use std::path::Path;
use tempfile::TempDir;

/// A temp encampment with one warband `greenplace` (prefix `gp`).
pub fn encampment() -> (TempDir, Workspace) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    EncampmentConfig::new("basecamp", "camp").save(root).unwrap();

    let mut registry = WarbandRegistry::default();
    registry
        .add(WarbandConfig::new("greenplace", "gp").unwrap())
        .unwrap();
    registry.save(root).unwrap();

    scaffold_warband(root, "greenplace");
    std::fs::create_dir_all(root.join("shaman")).unwrap();
    std::fs::create_dir_all(root.join("daemon")).unwrap();
    std::fs::create_dir_all(root.join(".relics")).unwrap();

    let ws = Workspace::open(root).unwrap();
    (dir, ws)
}

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

pub fn scaffold_raider(root: &Path, warband: &str, name: &str) {
    std::fs::create_dir_all(root.join(warband).join("raiders").join(name)).unwrap();
}

pub fn scaffold_crew(root: &Path, warband: &str, name: &str) {
    std::fs::create_dir_all(root.join(warband).join("clan").join(name)).unwrap();
}

/// Register a second warband in an existing encampment.
pub fn add_warband(ws: &Workspace, name: &str, prefix: &str) -> Workspace {
    let mut registry = WarbandRegistry::load(ws.root()).unwrap();
    registry
        .add(WarbandConfig::new(name, prefix).unwrap())
        .unwrap();
    registry.save(ws.root()).unwrap();
    scaffold_warband(ws.root(), name);
    Workspace::open(ws.root()).unwrap()
}
