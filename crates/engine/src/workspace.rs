// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An opened encampment workspace.

use crate::error::EngineError;
use hd_core::{EncampmentConfig, Role, WarbandConfig, WarbandRegistry};
use std::path::{Path, PathBuf};

/// Name of the per-agent runtime state directory.
pub const RUNTIME_DIR: &str = ".runtime";

/// An encampment root with its configuration loaded.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    pub encampment: EncampmentConfig,
    pub registry: WarbandRegistry,
}

impl Workspace {
    /// Open the workspace at `root`, loading encampment and registry.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let root = root.into();
        let encampment = EncampmentConfig::load(&root)?;
        let registry = WarbandRegistry::load(&root)?;
        Ok(Self {
            root,
            encampment,
            registry,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn warband(&self, name: &str) -> Result<&WarbandConfig, EngineError> {
        self.registry
            .get(name)
            .ok_or_else(|| EngineError::WarbandNotFound(name.to_string()))
    }

    /// Absolute working directory for a role. `None` for `Unknown`.
    pub fn workdir(&self, role: &Role) -> Option<PathBuf> {
        role.workdir().map(|rel| {
            if rel == Path::new(".") {
                self.root.clone()
            } else {
                self.root.join(rel)
            }
        })
    }

    /// Per-agent runtime state directory (`<workdir>/.runtime`).
    ///
    /// The warchief's workdir is the root itself; its runtime state lives
    /// under `warchief/` so the encampment root stays clean.
    pub fn runtime_dir(&self, role: &Role) -> Option<PathBuf> {
        if *role == Role::Warchief {
            return Some(self.root.join("warchief").join(RUNTIME_DIR));
        }
        self.workdir(role).map(|w| w.join(RUNTIME_DIR))
    }

    /// Bead prefix for a role: warband prefix for warband roles,
    /// encampment prefix otherwise.
    pub fn bead_prefix(&self, role: &Role) -> Result<&str, EngineError> {
        match role.warband() {
            Some(warband) => Ok(&self.warband(warband)?.bead_prefix),
            None => Ok(&self.encampment.bead_prefix),
        }
    }

    pub fn daemon_dir(&self) -> PathBuf {
        self.root.join("daemon")
    }

    pub fn daemon_pid_path(&self) -> PathBuf {
        self.daemon_dir().join("daemon.pid")
    }

    pub fn shutdown_lock_path(&self) -> PathBuf {
        self.daemon_dir().join("shutdown.lock")
    }

    pub fn events_path(&self) -> PathBuf {
        self.daemon_dir().join("events.jsonl")
    }

    /// The warchief's clone of a warband repository.
    pub fn warchief_clone(&self, warband: &WarbandConfig) -> PathBuf {
        warband.dir(&self.root).join("warchief").join("warband")
    }

    /// A raider's workspace directory.
    pub fn raider_dir(&self, warband: &WarbandConfig, name: &str) -> PathBuf {
        warband.dir(&self.root).join("raiders").join(name)
    }

    /// A crew member's workspace directory.
    pub fn crew_dir(&self, warband: &WarbandConfig, name: &str) -> PathBuf {
        warband.dir(&self.root).join("clan").join(name)
    }

    /// Reload the warband registry from disk.
    pub fn reload_registry(&mut self) -> Result<(), EngineError> {
        self.registry = WarbandRegistry::load(&self.root)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
