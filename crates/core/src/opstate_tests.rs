// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn labels(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[test]
fn default_is_operational() {
    let gate = GateState::resolve(None, &[]);
    assert_eq!(gate.state, OpState::Operational);
    assert_eq!(gate.source, StateSource::Default);
}

#[test]
fn local_wisp_wins_over_global_labels() {
    let gate = GateState::resolve(Some("docked"), &labels(&["parked"]));
    assert_eq!(gate.state, OpState::Docked);
    assert_eq!(gate.source, StateSource::Local);
}

#[test]
fn global_label_applies_without_local() {
    let gate = GateState::resolve(None, &labels(&["docked"]));
    assert_eq!(gate.state, OpState::Docked);
    assert_eq!(gate.source, StateSource::Global);
}

#[test]
fn parked_dominates_docked_in_global_layer() {
    let gate = GateState::resolve(None, &labels(&["docked", "parked"]));
    assert_eq!(gate.state, OpState::Parked);
    assert_eq!(gate.source, StateSource::Global);
}

#[test]
fn unrecognized_values_fall_through() {
    let gate = GateState::resolve(Some("weird"), &labels(&["urgent", "bug"]));
    assert_eq!(gate.state, OpState::Operational);
    assert_eq!(gate.source, StateSource::Default);
}

#[parameterized(
    operational = { OpState::Operational, true },
    parked = { OpState::Parked, false },
    docked = { OpState::Docked, false },
)]
fn auto_start_gate(state: OpState, allowed: bool) {
    assert_eq!(state.allows_auto_start(), allowed);
}

#[parameterized(
    lower = { "parked" },
    upper = { "PARKED" },
    padded = { "  Parked " },
)]
fn label_parse_is_case_insensitive(label: &str) {
    assert_eq!(OpState::from_label(label), Some(OpState::Parked));
}

#[test]
fn display_is_upper_case() {
    assert_eq!(OpState::Operational.to_string(), "OPERATIONAL");
    assert_eq!(OpState::Parked.to_string(), "PARKED");
    assert_eq!(OpState::Docked.to_string(), "DOCKED");
}
