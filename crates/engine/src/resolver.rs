// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace resolution: find the encampment root and classify the
//! current directory into a role location.
//!
//! Env-derived identity (`HD_ROLE` and friends) takes precedence over the
//! cwd-derived one; when both exist and disagree the caller gets a
//! location-mismatch warning, never a refusal.

use crate::error::EngineError;
use crate::workspace::Workspace;
use hd_core::{validate_name, Role};
use std::path::{Component, Path, PathBuf};

/// Where the resolved role came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    Cwd,
    Env,
}

/// The caller's place in the encampment.
#[derive(Debug, Clone)]
pub struct RoleLocation {
    pub role: Role,
    /// The role's canonical home (the cwd itself for `Unknown`).
    pub home_dir: PathBuf,
    pub source: LocationSource,
    /// Human-readable warning when env and cwd disagree.
    pub mismatch: Option<String>,
}

/// Identity overrides read from the environment.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub root: Option<PathBuf>,
    pub role: Option<String>,
    pub warband: Option<String>,
    pub raider: Option<String>,
    pub crew: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            root: var("HD_ENCAMPMENT_ROOT").map(PathBuf::from),
            role: var("HD_ROLE"),
            warband: var("HD_WARBAND"),
            raider: var("HD_RAIDER"),
            crew: var("HD_CREW"),
        }
    }

    /// Build a role from the env identity, if one is declared.
    fn role(&self) -> Option<Role> {
        let class = self.role.as_deref()?;
        let warband = || self.warband.clone();
        match class {
            "warchief" => Some(Role::Warchief),
            "shaman" => Some(Role::Shaman),
            "witness" => warband().map(|warband| Role::Witness { warband }),
            "forge" => warband().map(|warband| Role::Forge { warband }),
            "raider" => match (warband(), self.raider.clone()) {
                (Some(warband), Some(name)) => Some(Role::Raider { warband, name }),
                _ => None,
            },
            "crew" => match (warband(), self.crew.clone()) {
                (Some(warband), Some(name)) => Some(Role::Crew { warband, name }),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Walk ancestors of `start` until a directory holding the encampment
/// marker (`warchief/encampment.json`, or a bare `warchief/` directory)
/// is found. An env-provided root short-circuits the walk.
pub fn find_root(start: &Path, env: &EnvOverrides) -> Result<PathBuf, EngineError> {
    if let Some(root) = &env.root {
        return Ok(root.clone());
    }
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join("warchief/encampment.json").is_file() || dir.join("warchief").is_dir() {
            return Ok(dir.to_path_buf());
        }
        current = dir.parent();
    }
    Err(EngineError::NotInWorkspace {
        start: start.to_path_buf(),
    })
}

/// Classify `cwd` into a role by its position under the root.
fn classify_cwd(ws: &Workspace, cwd: &Path) -> Role {
    let Ok(rel) = cwd.strip_prefix(ws.root()) else {
        return Role::Unknown;
    };
    let parts: Vec<&str> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(os) => os.to_str(),
            _ => None,
        })
        .collect();

    match parts.as_slice() {
        [] => Role::Warchief,
        ["warchief", ..] => Role::Warchief,
        ["shaman", ..] => Role::Shaman,
        [warband, rest @ ..] if ws.registry.get(warband).is_some() => {
            let warband = warband.to_string();
            match rest {
                ["witness", ..] => Role::Witness { warband },
                ["forge", ..] => Role::Forge { warband },
                // The warchief's per-warband clone is warchief territory
                ["warchief", ..] => Role::Warchief,
                ["raiders", name, ..] if validate_name(name).is_ok() => Role::Raider {
                    warband,
                    name: name.to_string(),
                },
                ["clan", name, ..] if validate_name(name).is_ok() => Role::Crew {
                    warband,
                    name: name.to_string(),
                },
                _ => Role::Unknown,
            }
        }
        _ => Role::Unknown,
    }
}

/// Resolve the caller's role location from cwd and env.
pub fn resolve_location(ws: &Workspace, cwd: &Path, env: &EnvOverrides) -> RoleLocation {
    let cwd_role = classify_cwd(ws, cwd);
    let env_role = env.role();

    match env_role {
        Some(role) => {
            let mismatch = if cwd_role != Role::Unknown && cwd_role != role {
                Some(format!(
                    "location mismatch: environment says {} but the working \
                     directory belongs to {}; proceeding with the environment identity",
                    role, cwd_role
                ))
            } else {
                None
            };
            let home_dir = ws.workdir(&role).unwrap_or_else(|| cwd.to_path_buf());
            RoleLocation {
                role,
                home_dir,
                source: LocationSource::Env,
                mismatch,
            }
        }
        None => {
            let home_dir = ws.workdir(&cwd_role).unwrap_or_else(|| cwd.to_path_buf());
            RoleLocation {
                role: cwd_role,
                home_dir,
                source: LocationSource::Cwd,
                mismatch: None,
            }
        }
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
