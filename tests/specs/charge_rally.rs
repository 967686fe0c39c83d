//! Scenarios: charge routes beads onto hooks (cross-warband included)
//! and the next rally of the target enters autonomous mode.

use crate::prelude::*;
use hd_adapters::{append_route, FakeDrums, FakeRelics};
use hd_core::{Issue, IssueStatus, Role, Route};
use hd_engine::{HookRouter, LocationSource, Rally, RoleLocation};

fn location(ws: &hd_engine::Workspace, role: Role) -> RoleLocation {
    let home_dir = ws
        .workdir(&role)
        .unwrap_or_else(|| ws.root().to_path_buf());
    RoleLocation {
        role,
        home_dir,
        source: LocationSource::Cwd,
        mismatch: None,
    }
}

#[tokio::test]
async fn charge_then_rally_enters_autonomous_mode_with_the_bead_id() {
    let (_dir, ws) = encampment();
    scaffold_raider(ws.root(), "greenplace", "toast");
    let relics = FakeRelics::new();
    let store = ws.root().join("greenplace/.relics");
    relics.insert(&store, Issue::new("gp-task-001", "hunt the flaky test"));
    relics.insert(&store, Issue::new("gp-raider-greenplace-toast", "agent"));

    let raider = Role::Raider {
        warband: "greenplace".to_string(),
        name: "toast".to_string(),
    };

    HookRouter::new(ws.clone(), relics.clone())
        .charge("gp-task-001", None, &location(&ws, raider.clone()))
        .await
        .unwrap();

    let banner = Rally::new(ws.clone(), relics.clone(), FakeDrums::new())
        .rally(&location(&ws, raider))
        .await
        .unwrap();

    assert!(banner.autonomous());
    let text = banner.render();
    assert!(text.contains("mode: AUTONOMOUS"));
    assert!(text.contains("gp-task-001"));
}

#[tokio::test]
async fn cross_warband_charge_resolves_via_route_and_updates_both_stores() {
    let (_dir, ws) = encampment();
    let ws = add_warband(&ws, "other", "ot");
    scaffold_crew(ws.root(), "other", "joe");

    append_route(
        ws.root(),
        &Route {
            prefix: "gp".to_string(),
            path: "greenplace/warchief/warband".to_string(),
        },
    )
    .unwrap();

    let relics = FakeRelics::new();
    let gp_store = ws.root().join("greenplace/warchief/warband/.relics");
    relics.insert(&gp_store, Issue::new("gp-task-001", "cross-band work"));
    let other_store = ws.root().join("other/.relics");
    relics.insert(&other_store, Issue::new("ot-crew-other-joe", "agent"));

    HookRouter::new(ws.clone(), relics.clone())
        .charge(
            "gp-task-001",
            Some("other/joe"),
            &location(&ws, Role::Warchief),
        )
        .await
        .unwrap();

    let bead = relics.get(&gp_store, "gp-task-001").unwrap();
    assert_eq!(bead.status, IssueStatus::Pinned);
    assert_eq!(bead.assignee.unwrap(), "other/clan/joe");

    let agent = relics.get(&other_store, "ot-crew-other-joe").unwrap();
    assert_eq!(agent.hook.unwrap(), "gp-task-001");
}
