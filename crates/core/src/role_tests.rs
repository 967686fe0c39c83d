// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn witness(warband: &str) -> Role {
    Role::Witness {
        warband: warband.to_string(),
    }
}

fn raider(warband: &str, name: &str) -> Role {
    Role::Raider {
        warband: warband.to_string(),
        name: name.to_string(),
    }
}

fn crew(warband: &str, name: &str) -> Role {
    Role::Crew {
        warband: warband.to_string(),
        name: name.to_string(),
    }
}

#[test]
fn warchief_canonical_forms() {
    let role = Role::Warchief;
    assert_eq!(role.session_name().unwrap(), "hq-warchief");
    assert_eq!(role.address().unwrap(), "warchief/");
    assert_eq!(role.workdir().unwrap(), std::path::PathBuf::from("."));
    assert_eq!(role.bead_id("camp").unwrap(), "camp-warchief");
}

#[test]
fn shaman_canonical_forms() {
    let role = Role::Shaman;
    assert_eq!(role.session_name().unwrap(), "hq-shaman");
    assert_eq!(role.address().unwrap(), "shaman/");
    assert_eq!(role.workdir().unwrap(), std::path::PathBuf::from("shaman"));
    assert_eq!(role.bead_id("camp").unwrap(), "camp-shaman");
}

#[test]
fn crew_canonical_forms_match_spec_example() {
    // (Crew, "greenplace", "joe") is the worked example for the bijection.
    let role = crew("greenplace", "joe");
    assert_eq!(role.session_name().unwrap(), "hd-greenplace-clan-joe");
    assert_eq!(
        role.workdir().unwrap(),
        std::path::PathBuf::from("greenplace/clan/joe")
    );
    assert_eq!(role.address().unwrap(), "greenplace/clan/joe");
    assert_eq!(role.bead_id("gp").unwrap(), "gp-crew-greenplace-joe");
    assert_eq!(
        parse_session_name("hd-greenplace-clan-joe"),
        Some(crew("greenplace", "joe"))
    );
}

#[test]
fn forge_workdir_nests_the_worktree() {
    let role = Role::Forge {
        warband: "greenplace".to_string(),
    };
    assert_eq!(
        role.workdir().unwrap(),
        std::path::PathBuf::from("greenplace/forge/warband")
    );
    assert_eq!(role.bead_id("gp").unwrap(), "gp-forge-greenplace");
}

#[parameterized(
    warchief = { Role::Warchief },
    shaman = { Role::Shaman },
    witness_case = { Role::Witness { warband: "greenplace".to_string() } },
    forge = { Role::Forge { warband: "greenplace".to_string() } },
    raider_case = { Role::Raider { warband: "greenplace".to_string(), name: "toast".to_string() } },
    crew_case = { Role::Crew { warband: "greenplace".to_string(), name: "joe".to_string() } },
)]
fn session_name_round_trips(role: Role) {
    let session = role.session_name().unwrap();
    assert_eq!(parse_session_name(session.as_str()), Some(role));
}

#[parameterized(
    warchief = { Role::Warchief },
    shaman = { Role::Shaman },
    witness_case = { Role::Witness { warband: "greenplace".to_string() } },
    forge = { Role::Forge { warband: "greenplace".to_string() } },
    raider_case = { Role::Raider { warband: "greenplace".to_string(), name: "toast".to_string() } },
    crew_case = { Role::Crew { warband: "greenplace".to_string(), name: "joe".to_string() } },
)]
fn address_round_trips(role: Role) {
    let address = role.address().unwrap();
    assert_eq!(parse_address(address.as_str()), Some(role));
}

#[test]
fn unknown_role_has_no_canonical_forms() {
    assert_eq!(Role::Unknown.session_name(), None);
    assert_eq!(Role::Unknown.address(), None);
    assert_eq!(Role::Unknown.workdir(), None);
    assert_eq!(Role::Unknown.bead_id("x"), None);
}

#[parameterized(
    foreign = { "weechat" },
    hq_unknown = { "hq-scribe" },
    empty = { "" },
    prefix_only = { "hd-" },
    missing_tail = { "hd-greenplace" },
    torn_raider = { "hd-greenplace-big-toast" },
    bad_warband = { "hd-green.place-witness" },
    clan_empty = { "hd-greenplace-clan-" },
)]
fn parse_rejects_invalid_session_names(session: &str) {
    assert_eq!(parse_session_name(session), None);
}

#[test]
fn reserved_tokens_never_parse_as_raiders() {
    assert_eq!(
        parse_session_name("hd-greenplace-witness"),
        Some(witness("greenplace"))
    );
    assert_eq!(
        parse_session_name("hd-greenplace-forge"),
        Some(Role::Forge {
            warband: "greenplace".to_string()
        })
    );
    // "clan-" routes to crew parsing, never raider
    assert_eq!(
        parse_session_name("hd-greenplace-clan-joe"),
        Some(crew("greenplace", "joe"))
    );
}

#[test]
fn raider_parse_is_exact() {
    assert_eq!(
        parse_session_name("hd-greenplace-toast"),
        Some(raider("greenplace", "toast"))
    );
}

#[test]
fn horde_session_filter_matches_fleet_namespace() {
    assert!(is_horde_session("hq-warchief"));
    assert!(is_horde_session("hq-shaman"));
    assert!(is_horde_session("hd-greenplace-toast"));
    assert!(!is_horde_session("hq-scribe"));
    assert!(!is_horde_session("weechat"));
}

#[test]
fn parse_address_handles_trailing_slash_singletons() {
    assert_eq!(parse_address("warchief/"), Some(Role::Warchief));
    assert_eq!(parse_address("warchief"), Some(Role::Warchief));
    assert_eq!(parse_address("shaman/"), Some(Role::Shaman));
}

#[test]
fn parse_address_rejects_deep_paths() {
    assert_eq!(parse_address("greenplace/clan/joe/extra"), None);
}

#[test]
fn bare_clan_segment_is_a_raider_named_clan() {
    // Only the "clan-" prefix is reserved; "clan" itself is an ordinary name.
    assert_eq!(parse_address("greenplace/clan"), Some(raider("greenplace", "clan")));
}

#[test]
fn display_uses_the_address() {
    assert_eq!(crew("greenplace", "joe").to_string(), "greenplace/clan/joe");
    assert_eq!(Role::Unknown.to_string(), "unknown");
}
