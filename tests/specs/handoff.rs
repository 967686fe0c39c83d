//! Scenario: in-place handoff of the warchief session.

use crate::prelude::*;
use hd_adapters::{FakeDrums, FakeMux, FakeRelics, MuxCall};
use hd_core::Role;
use hd_engine::{HandoffEngine, HandoffOptions, LocationSource, RoleLocation};

fn warchief_location(ws: &hd_engine::Workspace) -> RoleLocation {
    RoleLocation {
        role: Role::Warchief,
        home_dir: ws.root().to_path_buf(),
        source: LocationSource::Env,
        mismatch: None,
    }
}

#[tokio::test]
async fn warchief_handoff_pins_self_bead_and_respawns_same_pane() {
    let (_dir, ws) = encampment();
    let mux = FakeMux::new();
    mux.add_session("hq-warchief");
    mux.set_inside(Some("hq-warchief"));
    let pane = mux.get_session("hq-warchief").unwrap().pane_id;
    let relics = FakeRelics::new();
    relics.set_prefix(&ws.root().join(".relics"), "camp-handoff");
    let drums = FakeDrums::new();

    let engine = HandoffEngine::new(ws.clone(), mux.clone(), relics.clone(), drums.clone());
    let opts = HandoffOptions {
        subject: Some("x".to_string()),
        message: Some("y".to_string()),
        ..HandoffOptions::default()
    };
    let report = engine.handoff(&warchief_location(&ws), &opts).await.unwrap();

    // Self-bead: created, titled with the handoff prefix, pinned on self
    let store = ws.root().join(".relics");
    let bead = relics.get(&store, report.self_bead.as_ref().unwrap()).unwrap();
    assert_eq!(bead.title, "🤝 HANDOFF: x");
    assert_eq!(bead.status, hd_core::IssueStatus::Pinned);

    // Marker holds the previous session name
    let marker = ws.root().join("warchief/.runtime/handoff.marker");
    assert_eq!(
        std::fs::read_to_string(&marker).unwrap().trim(),
        "hq-warchief"
    );

    // History cleared on the same pane, then respawned; session name and
    // pane id unchanged
    assert_eq!(report.session, "hq-warchief");
    assert_eq!(report.pane, pane.as_str());
    let session_after = mux.get_session("hq-warchief").unwrap();
    assert_eq!(session_after.pane_id, pane);
    assert!(mux.calls().iter().any(
        |c| matches!(c, MuxCall::ClearHistory { pane: p } if *p == pane)
    ));

    // The respawn command re-establishes home, identity env, and execs
    // the runtime with a handoff beacon
    let root = ws.root().display().to_string();
    assert!(session_after.cmd.starts_with(&format!("cd {}", root)));
    assert!(session_after.cmd.contains("export"));
    assert!(session_after.cmd.contains("HD_ROLE=\"warchief\""));
    assert!(session_after.cmd.contains("BD_ACTOR=\"warchief\""));
    assert!(session_after.cmd.contains("&& exec claude \""));
}

#[tokio::test]
async fn failed_respawn_leaves_the_previous_process() {
    let (_dir, ws) = encampment();
    let mux = FakeMux::new();
    mux.add_session("hq-warchief");
    mux.set_inside(Some("hq-warchief"));
    let cmd_before = mux.get_session("hq-warchief").unwrap().cmd;

    // Kill the session between pane lookup and respawn: simulate by
    // using a target with no session at all
    let engine = HandoffEngine::new(
        ws.clone(),
        mux.clone(),
        FakeRelics::new(),
        FakeDrums::new(),
    );
    let opts = HandoffOptions {
        target: Some("greenplace/witness".to_string()),
        ..HandoffOptions::default()
    };
    assert!(engine.handoff(&warchief_location(&ws), &opts).await.is_err());

    // Our own session is untouched
    assert_eq!(mux.get_session("hq-warchief").unwrap().cmd, cmd_before);
}
