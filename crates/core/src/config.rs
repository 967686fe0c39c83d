// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Encampment and warband configuration.
//!
//! Two JSON files under `warchief/` hold all registry state:
//! `encampment.json` (encampment identity plus runtime settings) and
//! `warbands.json` (the warband registry). Removing a warband deregisters
//! it without touching its files on disk.

use crate::name::{validate_name, NameError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Relative path of the encampment metadata file.
pub const ENCAMPMENT_FILE: &str = "warchief/encampment.json";

/// Relative path of the warband registry file.
pub const WARBANDS_FILE: &str = "warchief/warbands.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("warband not found: {0}")]
    WarbandNotFound(String),
    #[error("warband already registered: {0}")]
    DuplicateWarband(String),
    #[error(transparent)]
    InvalidName(#[from] NameError),
}

/// LLM runtime settings shared by every agent start and handoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Runtime binary invoked inside each session.
    pub binary: String,
    /// Env var naming the runtime's config directory.
    pub config_dir_env: String,
    /// Named alternates selectable with a runtime alias (`--runtime fast`).
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            binary: "claude".to_string(),
            config_dir_env: "CLAUDE_CONFIG_DIR".to_string(),
            aliases: HashMap::new(),
        }
    }
}

impl RuntimeConfig {
    /// Resolve the binary for an optional alias, falling back to the
    /// default binary when the alias is unknown.
    pub fn binary_for(&self, alias: Option<&str>) -> &str {
        alias
            .and_then(|a| self.aliases.get(a))
            .map_or(&self.binary, String::as_str)
    }
}

/// Encampment identity and runtime settings (`warchief/encampment.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncampmentConfig {
    pub name: String,
    /// Prefix for encampment-level bead ids (e.g. `camp-warchief`).
    pub bead_prefix: String,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Argv used by `up` to ensure the daemon is running.
    #[serde(default)]
    pub daemon_command: Vec<String>,
}

impl EncampmentConfig {
    pub fn new(name: impl Into<String>, bead_prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bead_prefix: bead_prefix.into(),
            runtime: RuntimeConfig::default(),
            daemon_command: Vec::new(),
        }
    }

    pub fn path(root: &Path) -> PathBuf {
        root.join(ENCAMPMENT_FILE)
    }

    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = Self::path(root);
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn save(&self, root: &Path) -> Result<(), ConfigError> {
        let path = Self::path(root);
        write_json(&path, self)
    }
}

/// One warband's registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarbandConfig {
    pub name: String,
    /// Warband directory relative to the encampment root.
    pub path: PathBuf,
    pub default_branch: String,
    /// Prefix for this warband's bead ids (e.g. `gp-task-001`).
    pub bead_prefix: String,
    #[serde(default = "default_true")]
    pub has_witness: bool,
    #[serde(default = "default_true")]
    pub has_forge: bool,
    #[serde(default)]
    pub raiders: Vec<String>,
    #[serde(default)]
    pub crew: Vec<String>,
    /// Natural-language crew startup preference consulted by `up --restore`
    /// (see [`crate::startup_pref`]).
    #[serde(default)]
    pub crew_startup: Option<String>,
}

fn default_true() -> bool {
    true
}

impl WarbandConfig {
    pub fn new(name: impl Into<String>, bead_prefix: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            path: PathBuf::from(&name),
            name,
            default_branch: "main".to_string(),
            bead_prefix: bead_prefix.into(),
            has_witness: true,
            has_forge: true,
            raiders: Vec::new(),
            crew: Vec::new(),
            crew_startup: None,
        })
    }

    /// Absolute warband directory.
    pub fn dir(&self, root: &Path) -> PathBuf {
        root.join(&self.path)
    }

    /// Identity bead id carrying the warband's global labels
    /// (operational-state gate, §4.9).
    pub fn identity_bead(&self) -> String {
        format!("{}-warband-{}", self.bead_prefix, self.name)
    }
}

/// The warband registry (`warchief/warbands.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarbandRegistry {
    pub warbands: Vec<WarbandConfig>,
}

impl WarbandRegistry {
    pub fn path(root: &Path) -> PathBuf {
        root.join(WARBANDS_FILE)
    }

    /// Load the registry; a missing file is an empty registry.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = Self::path(root);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }

    pub fn save(&self, root: &Path) -> Result<(), ConfigError> {
        write_json(&Self::path(root), self)
    }

    pub fn get(&self, name: &str) -> Option<&WarbandConfig> {
        self.warbands.iter().find(|w| w.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut WarbandConfig> {
        self.warbands.iter_mut().find(|w| w.name == name)
    }

    /// Find the warband whose bead prefix matches `prefix`.
    pub fn by_prefix(&self, prefix: &str) -> Option<&WarbandConfig> {
        self.warbands.iter().find(|w| w.bead_prefix == prefix)
    }

    pub fn add(&mut self, warband: WarbandConfig) -> Result<(), ConfigError> {
        if self.get(&warband.name).is_some() {
            return Err(ConfigError::DuplicateWarband(warband.name));
        }
        self.warbands.push(warband);
        self.warbands.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(())
    }

    /// Deregister a warband. Files on disk are left in place.
    pub fn remove(&mut self, name: &str) -> Result<WarbandConfig, ConfigError> {
        let idx = self
            .warbands
            .iter()
            .position(|w| w.name == name)
            .ok_or_else(|| ConfigError::WarbandNotFound(name.to_string()))?;
        Ok(self.warbands.remove(idx))
    }

    /// Warbands in stable name order.
    pub fn sorted(&self) -> Vec<&WarbandConfig> {
        let mut list: Vec<&WarbandConfig> = self.warbands.iter().collect();
        list.sort_by_key(|w| w.name.as_str());
        list
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let content = serde_json::to_string_pretty(value).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
