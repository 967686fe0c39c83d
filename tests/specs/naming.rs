//! Scenario: the session-name bijection is exact and total over the
//! fleet namespace.

use hd_core::{parse_session_name, Role};

#[test]
fn crew_joe_of_greenplace_has_the_documented_canonical_forms() {
    let role = Role::Crew {
        warband: "greenplace".to_string(),
        name: "joe".to_string(),
    };

    assert_eq!(role.session_name().unwrap(), "hd-greenplace-clan-joe");
    assert_eq!(
        role.workdir().unwrap(),
        std::path::PathBuf::from("greenplace/clan/joe")
    );
    assert_eq!(role.address().unwrap(), "greenplace/clan/joe");
    assert_eq!(role.bead_id("gp").unwrap(), "gp-crew-greenplace-joe");

    assert_eq!(parse_session_name("hd-greenplace-clan-joe"), Some(role));
}

#[test]
fn every_fleet_session_in_a_mixed_set_decodes_to_an_agent() {
    let sessions = [
        "hq-warchief",
        "hq-shaman",
        "hd-greenplace-witness",
        "hd-greenplace-forge",
        "hd-greenplace-toast",
        "hd-greenplace-clan-joe",
        "hd-other-crumb",
    ];
    for session in sessions {
        let role = parse_session_name(session)
            .unwrap_or_else(|| panic!("{session} must decode to an agent"));
        assert_eq!(
            role.session_name().unwrap().as_str(),
            session,
            "decode then encode must be the identity"
        );
    }
}

#[test]
fn foreign_sessions_do_not_decode() {
    for session in ["weechat", "hq-scribe", "hd-", "hd-greenplace", "hd-a-b-c"] {
        assert_eq!(parse_session_name(session), None, "{session}");
    }
}
