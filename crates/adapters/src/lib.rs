// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hd-adapters: typed adapters over the external collaborators of the
//! Horde control plane — the terminal multiplexer, git, the issue store
//! (`relics`), and the message bus (`drums`).

pub mod drums;
pub mod mux;
pub mod relics;
pub mod subprocess;
pub mod vcs;

pub use drums::{DrumsCli, DrumsError, Mailbox, MessageBus};
pub use mux::{Multiplexer, MuxError, TmuxMux};
pub use relics::{
    append_route, load_routes, resolve_relics_dir, IssueStore, RelicsCli, RelicsError,
};
pub use vcs::{GitVcs, UncommittedWork, Vcs, VcsError, VcsStatus};

#[cfg(any(test, feature = "test-support"))]
pub use drums::FakeDrums;
#[cfg(any(test, feature = "test-support"))]
pub use mux::{FakeMux, FakeMuxSession, MuxCall};
#[cfg(any(test, feature = "test-support"))]
pub use relics::FakeRelics;
#[cfg(any(test, feature = "test-support"))]
pub use vcs::FakeVcs;
