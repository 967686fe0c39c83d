// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hd-core: Core library for the Horde (hd) control plane

pub mod config;
pub mod id;
pub mod issue;
pub mod message;
pub mod name;
pub mod opstate;
pub mod role;
pub mod startup_pref;

pub use config::{ConfigError, EncampmentConfig, RuntimeConfig, WarbandConfig, WarbandRegistry};
pub use id::{Address, BeadId, PaneId, SessionName};
pub use issue::{
    extract_prefix, HookUpdate, Issue, IssueFilter, IssueStatus, IssueUpdate, NewIssue, Route,
};
pub use message::{Message, MessageKind, NewMessage};
pub use name::{validate_name, validate_raider_name, NameError};
pub use opstate::{GateState, OpState, StateSource};
pub use role::{is_horde_session, parse_address, parse_session_name, Role, HQ_PREFIX, SESSION_PREFIX};
pub use startup_pref::CrewStartup;
