//! Round-trip laws over names, routes, and markers.

use crate::prelude::*;
use hd_adapters::{append_route, load_routes};
use hd_core::{parse_session_name, Route};
use hd_engine::{consume_handoff_marker, write_handoff_marker};

#[test]
fn canonical_after_parse_is_identity_on_valid_session_names() {
    for session in [
        "hq-warchief",
        "hq-shaman",
        "hd-greenplace-witness",
        "hd-greenplace-forge",
        "hd-greenplace-toast",
        "hd-greenplace-clan-joe",
    ] {
        let role = parse_session_name(session).unwrap();
        assert_eq!(role.session_name().unwrap().as_str(), session);
    }
}

#[test]
fn appended_routes_are_always_loadable() {
    let (_dir, ws) = encampment();
    let routes = [
        Route {
            prefix: "gp".to_string(),
            path: "greenplace/warchief/warband".to_string(),
        },
        Route {
            prefix: "ot".to_string(),
            path: "other/warchief/warband".to_string(),
        },
    ];
    for route in &routes {
        append_route(ws.root(), route).unwrap();
        let loaded = load_routes(ws.root()).unwrap();
        assert!(loaded.contains(route), "load ⊇ appended");
    }
}

#[test]
fn marker_write_then_consume_leaves_nothing() {
    let (_dir, ws) = encampment();
    let runtime_dir = ws.root().join(".runtime");

    write_handoff_marker(&runtime_dir, "hq-warchief").unwrap();
    assert_eq!(
        consume_handoff_marker(&runtime_dir).as_deref(),
        Some("hq-warchief")
    );
    assert!(!runtime_dir.join("handoff.marker").exists());
    assert_eq!(consume_handoff_marker(&runtime_dir), None);
}
