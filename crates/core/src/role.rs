// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent roles and the canonical naming bijection.
//!
//! Every agent is identified by `(class, warband?, name?)`. From that tuple
//! the functions here derive four canonical forms: the multiplexer session
//! name, the agent address, the working directory relative to the
//! encampment root, and the agent bead id. Parsing is the exact inverse:
//! any valid session name decodes back to the tuple that produced it.
//!
//! The warband session prefix is a single stable constant. Sibling tooling
//! observes sessions by name, so these strings are a wire-level contract.

use crate::id::{Address, BeadId, SessionName};
use crate::name::{validate_name, validate_raider_name};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prefix for warband-scoped agent sessions.
pub const SESSION_PREFIX: &str = "hd-";

/// Prefix for encampment-scoped agent sessions.
pub const HQ_PREFIX: &str = "hq-";

/// Session name of the encampment coordinator.
pub const WARCHIEF_SESSION: &str = "hq-warchief";

/// Session name of the encampment health-checker.
pub const SHAMAN_SESSION: &str = "hq-shaman";

/// Separator marking a crew session inside a warband namespace.
///
/// `clan-` cannot collide with a raider name: raider names reject both the
/// `-` character and the reserved prefix (see [`crate::name`]).
const CLAN_MARK: &str = "clan-";

/// An agent's role within the encampment.
///
/// Closed sum over the six agent classes plus `Unknown` for directories
/// that do not map to any agent home.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum Role {
    /// Encampment-level coordinator.
    Warchief,
    /// Encampment-level health-check agent.
    Shaman,
    /// Per-warband raider monitor.
    Witness { warband: String },
    /// Per-warband merge-queue processor.
    Forge { warband: String },
    /// Transient worker executing a specific task.
    Raider { warband: String, name: String },
    /// Persistent per-user workspace agent.
    Crew { warband: String, name: String },
    /// Not an agent location.
    Unknown,
}

impl Role {
    /// Lower-case class token (the `HD_ROLE` env value).
    pub fn class_str(&self) -> &'static str {
        match self {
            Role::Warchief => "warchief",
            Role::Shaman => "shaman",
            Role::Witness { .. } => "witness",
            Role::Forge { .. } => "forge",
            Role::Raider { .. } => "raider",
            Role::Crew { .. } => "crew",
            Role::Unknown => "unknown",
        }
    }

    /// Warband this role belongs to, if warband-scoped.
    pub fn warband(&self) -> Option<&str> {
        match self {
            Role::Witness { warband }
            | Role::Forge { warband }
            | Role::Raider { warband, .. }
            | Role::Crew { warband, .. } => Some(warband),
            _ => None,
        }
    }

    /// Per-agent name (raiders and crew only).
    pub fn agent_name(&self) -> Option<&str> {
        match self {
            Role::Raider { name, .. } | Role::Crew { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Worker classes hold an identity lock; singleton classes are
    /// protected by their unique session name alone.
    pub fn is_worker(&self) -> bool {
        matches!(self, Role::Raider { .. } | Role::Crew { .. })
    }

    /// Encampment-scoped (`hq-`) classes.
    pub fn is_encampment(&self) -> bool {
        matches!(self, Role::Warchief | Role::Shaman)
    }

    /// Canonical session name. `None` for [`Role::Unknown`].
    pub fn session_name(&self) -> Option<SessionName> {
        let name = match self {
            Role::Warchief => WARCHIEF_SESSION.to_string(),
            Role::Shaman => SHAMAN_SESSION.to_string(),
            Role::Witness { warband } => format!("{SESSION_PREFIX}{warband}-witness"),
            Role::Forge { warband } => format!("{SESSION_PREFIX}{warband}-forge"),
            Role::Raider { warband, name } => format!("{SESSION_PREFIX}{warband}-{name}"),
            Role::Crew { warband, name } => {
                format!("{SESSION_PREFIX}{warband}-{CLAN_MARK}{name}")
            }
            Role::Unknown => return None,
        };
        Some(SessionName::new(name))
    }

    /// Canonical agent address. `None` for [`Role::Unknown`].
    pub fn address(&self) -> Option<Address> {
        let addr = match self {
            Role::Warchief => "warchief/".to_string(),
            Role::Shaman => "shaman/".to_string(),
            Role::Witness { warband } => format!("{warband}/witness"),
            Role::Forge { warband } => format!("{warband}/forge"),
            Role::Raider { warband, name } => format!("{warband}/{name}"),
            Role::Crew { warband, name } => format!("{warband}/clan/{name}"),
            Role::Unknown => return None,
        };
        Some(Address::new(addr))
    }

    /// Working directory relative to the encampment root.
    /// `None` for [`Role::Unknown`].
    pub fn workdir(&self) -> Option<PathBuf> {
        let dir = match self {
            Role::Warchief => PathBuf::from("."),
            Role::Shaman => PathBuf::from("shaman"),
            Role::Witness { warband } => [warband.as_str(), "witness"].iter().collect(),
            Role::Forge { warband } => [warband.as_str(), "forge", "warband"].iter().collect(),
            Role::Raider { warband, name } => {
                [warband.as_str(), "raiders", name.as_str()].iter().collect()
            }
            Role::Crew { warband, name } => {
                [warband.as_str(), "clan", name.as_str()].iter().collect()
            }
            Role::Unknown => return None,
        };
        Some(dir)
    }

    /// Agent bead id. `prefix` is the encampment bead prefix for
    /// encampment roles and the warband bead prefix otherwise.
    /// `None` for [`Role::Unknown`].
    pub fn bead_id(&self, prefix: &str) -> Option<BeadId> {
        let id = match self {
            Role::Warchief => format!("{prefix}-warchief"),
            Role::Shaman => format!("{prefix}-shaman"),
            Role::Witness { warband } => format!("{prefix}-witness-{warband}"),
            Role::Forge { warband } => format!("{prefix}-forge-{warband}"),
            Role::Raider { warband, name } => format!("{prefix}-raider-{warband}-{name}"),
            Role::Crew { warband, name } => format!("{prefix}-crew-{warband}-{name}"),
            Role::Unknown => return None,
        };
        Some(BeadId::new(id))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.address() {
            Some(addr) => write!(f, "{}", addr),
            None => write!(f, "unknown"),
        }
    }
}

/// True when a session name belongs to this encampment's fleet.
pub fn is_horde_session(name: &str) -> bool {
    name == WARCHIEF_SESSION || name == SHAMAN_SESSION || name.starts_with(SESSION_PREFIX)
}

/// Decode a canonical session name back into a [`Role`].
///
/// Returns `None` for names outside the fleet namespace or names that do
/// not decode unambiguously (e.g. a raider segment containing `-`).
pub fn parse_session_name(session: &str) -> Option<Role> {
    match session {
        WARCHIEF_SESSION => return Some(Role::Warchief),
        SHAMAN_SESSION => return Some(Role::Shaman),
        _ => {}
    }
    let rest = session.strip_prefix(SESSION_PREFIX)?;
    let (warband, tail) = rest.split_once('-')?;
    validate_name(warband).ok()?;
    if tail == "witness" {
        return Some(Role::Witness {
            warband: warband.to_string(),
        });
    }
    if tail == "forge" {
        return Some(Role::Forge {
            warband: warband.to_string(),
        });
    }
    if let Some(name) = tail.strip_prefix(CLAN_MARK) {
        validate_name(name).ok()?;
        return Some(Role::Crew {
            warband: warband.to_string(),
            name: name.to_string(),
        });
    }
    // Anything left must be a raider; reserved tokens were consumed above
    // and the raider charset guarantees no further '-' segments.
    validate_raider_name(tail).ok()?;
    Some(Role::Raider {
        warband: warband.to_string(),
        name: tail.to_string(),
    })
}

/// Decode a canonical agent address back into a [`Role`].
pub fn parse_address(address: &str) -> Option<Role> {
    let trimmed = address.trim_end_matches('/');
    match trimmed {
        "warchief" => return Some(Role::Warchief),
        "shaman" => return Some(Role::Shaman),
        _ => {}
    }
    let mut parts = trimmed.split('/');
    let warband = parts.next()?;
    validate_name(warband).ok()?;
    let second = parts.next()?;
    match (second, parts.next(), parts.next()) {
        ("witness", None, _) => Some(Role::Witness {
            warband: warband.to_string(),
        }),
        ("forge", None, _) => Some(Role::Forge {
            warband: warband.to_string(),
        }),
        ("clan", Some(name), None) => {
            validate_name(name).ok()?;
            Some(Role::Crew {
                warband: warband.to_string(),
                name: name.to_string(),
            })
        }
        (name, None, _) => {
            validate_raider_name(name).ok()?;
            Some(Role::Raider {
                warband: warband.to_string(),
                name: name.to_string(),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "role_tests.rs"]
mod tests;
