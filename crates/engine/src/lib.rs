// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hd-engine: the agent lifecycle and coordination core of the Horde
//! control plane.

pub mod daemon;
pub mod error;
pub mod events;
pub mod fleet;
pub mod handoff;
pub mod hook;
pub mod identity;
pub mod lifecycle;
pub mod opsgate;
pub mod rally;
pub mod resolver;
pub mod runtime_cmd;
pub mod shutdown;
pub mod workspace;

#[cfg(test)]
mod test_helpers;

pub use daemon::{DaemonHandle, DaemonState};
pub use error::EngineError;
pub use events::{Event, EventKind, EventLog};
pub use fleet::{
    AgentReport, BufferReporter, Fleet, FleetStatus, Reporter, StdoutReporter, UpOptions, UpReport,
    START_POOL_CAP,
};
pub use handoff::{
    consume_handoff_marker, write_handoff_marker, HandoffEngine, HandoffOptions, HandoffReport,
};
pub use hook::{resolve_target_spec, ChargeOutcome, HookRouter};
pub use identity::{pid_alive, IdentityLock, LockInfo};
pub use lifecycle::{
    list_raider_sessions, recorded_state, stop_all_raiders, AgentState, AgentStatus, CrewManager,
    ForgeManager, Lifecycle, RaiderManager, ShamanManager, StartOptions, StartOutcome,
    StateRecord, StopOutcome, WarchiefManager, WitnessManager,
};
pub use rally::{Rally, RallyBanner};
pub use resolver::{find_root, resolve_location, EnvOverrides, LocationSource, RoleLocation};
pub use shutdown::{ShutdownCoordinator, ShutdownLock, ShutdownOptions, ShutdownReport};
pub use workspace::Workspace;
