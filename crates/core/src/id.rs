// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Newtype identifiers shared across the control plane.
//!
//! Session names, addresses, and bead ids are all wire-level strings with
//! their own derivation rules (see [`crate::role`]). Wrapping them keeps
//! the three from being swapped at call sites.

/// Define a newtype ID wrapper around `String`.
///
/// Generates `new()`, `as_str()`, `Display`, `From<String>`, `From<&str>`,
/// `PartialEq<str>`, `PartialEq<&str>`, and `Borrow<str>` implementations.
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the newtype, returning the inner `String`.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

crate::define_id! {
    /// Canonical multiplexer session name (e.g. `hd-greenplace-clan-joe`).
    ///
    /// Derivation and parsing live in [`crate::role`]; every session name is
    /// uniquely decodable back to the agent that owns it.
    pub struct SessionName;
}

crate::define_id! {
    /// Agent address used by the issue store and message bus
    /// (e.g. `greenplace/clan/joe`, `warchief/`).
    pub struct Address;
}

crate::define_id! {
    /// Identifier of a bead (issue or message record) owned by the
    /// issue store, e.g. `gp-task-001`.
    pub struct BeadId;
}

crate::define_id! {
    /// Multiplexer pane identifier (e.g. `%12`).
    pub struct PaneId;
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
