// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation for warband and agent names.
//!
//! Session names embed warband and agent names with `-` as the only
//! separator, so names themselves must never contain one. Path separators
//! and whitespace are excluded for the same reason: names become directory
//! components and tmux target strings verbatim.

use thiserror::Error;

/// Rejection reasons for warband/agent names.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("name must not be empty")]
    Empty,
    #[error("invalid name {name:?}: character {ch:?} is not allowed (no '-', '.', '/', '\\', or whitespace)")]
    ForbiddenChar { name: String, ch: char },
    #[error("invalid raider name {0:?}: reserved for the witness session")]
    ReservedWitness(String),
    #[error("invalid raider name {0:?}: reserved for the forge session")]
    ReservedForge(String),
    #[error("invalid raider name {0:?}: the 'clan-' prefix is reserved for crew sessions")]
    ReservedClanPrefix(String),
}

/// Validate a warband or crew name.
///
/// Accepted: any non-empty string without `-`, `.`, `/`, `\`, whitespace,
/// or control characters.
pub fn validate_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    for ch in name.chars() {
        if matches!(ch, '-' | '.' | '/' | '\\') || ch.is_whitespace() || ch.is_control() {
            return Err(NameError::ForbiddenChar {
                name: name.to_string(),
                ch,
            });
        }
    }
    Ok(())
}

/// Validate a raider name.
///
/// Raider names share the warband session namespace with witness, forge,
/// and crew sessions, so the tokens that identify those are rejected here
/// to keep `hd-<warband>-<name>` uniquely decodable.
pub fn validate_raider_name(name: &str) -> Result<(), NameError> {
    validate_name(name)?;
    if name == "witness" {
        return Err(NameError::ReservedWitness(name.to_string()));
    }
    if name == "forge" {
        return Err(NameError::ReservedForge(name.to_string()));
    }
    if name.starts_with("clan") && name.len() > 4 {
        // "clan-x" is already rejected by the '-' rule; this arm exists so
        // a future relaxation of the charset cannot silently open the hole.
        if let Some(rest) = name.strip_prefix("clan-") {
            if !rest.is_empty() {
                return Err(NameError::ReservedClanPrefix(name.to_string()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "name_tests.rs"]
mod tests;
