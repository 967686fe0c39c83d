// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::resolver::{LocationSource, RoleLocation};
use crate::test_helpers::{encampment, scaffold_crew, scaffold_warband};
use hd_adapters::{append_route, FakeRelics};
use hd_core::{Issue, Route, WarbandRegistry};

fn caller(role: Role, ws: &Workspace) -> RoleLocation {
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

fn raider_role(name: &str) -> Role {
    Role::Raider {
        warband: "greenplace".to_string(),
        name: name.to_string(),
    }
}

#[tokio::test]
async fn charge_self_pins_and_hooks() {
    let (_dir, ws) = encampment();
    let relics = FakeRelics::new();
    let store = ws.root().join("greenplace/.relics");
    relics.insert(&store, Issue::new("gp-task-001", "hunt the bug"));
    relics.insert(&store, Issue::new("gp-raider-greenplace-toast", "agent"));

    let router = HookRouter::new(ws.clone(), relics.clone());
    let outcome = router
        .charge("gp-task-001", None, &caller(raider_role("toast"), &ws))
        .await
        .unwrap();

    assert_eq!(outcome.bead, "gp-task-001");
    let bead = relics.get(&store, "gp-task-001").unwrap();
    assert_eq!(bead.status, IssueStatus::Pinned);
    assert_eq!(bead.assignee.unwrap(), "greenplace/toast");
    assert_eq!(
        relics
            .get(&store, "gp-raider-greenplace-toast")
            .unwrap()
            .hook
            .unwrap(),
        "gp-task-001"
    );
}

#[tokio::test]
async fn newer_pin_supersedes_older() {
    let (_dir, ws) = encampment();
    let relics = FakeRelics::new();
    let store = ws.root().join("greenplace/.relics");
    relics.insert(&store, Issue::new("gp-task-001", "first"));
    relics.insert(&store, Issue::new("gp-task-002", "second"));
    relics.insert(&store, Issue::new("gp-raider-greenplace-toast", "agent"));

    let router = HookRouter::new(ws.clone(), relics.clone());
    let me = caller(raider_role("toast"), &ws);
    router.charge("gp-task-001", None, &me).await.unwrap();
    router.charge("gp-task-002", None, &me).await.unwrap();

    assert_eq!(
        relics
            .get(&store, "gp-raider-greenplace-toast")
            .unwrap()
            .hook
            .unwrap(),
        "gp-task-002",
        "an agent has at most one hooked bead"
    );
}

#[tokio::test]
async fn charge_unknown_caller_without_target_is_refused() {
    let (_dir, ws) = encampment();
    let router = HookRouter::new(ws.clone(), FakeRelics::new());

    let err = router
        .charge("gp-task-001", None, &caller(Role::Unknown, &ws))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NoRoleHere(_)));
}

#[tokio::test]
async fn target_path_prefers_crew_when_clan_dir_exists() {
    let (_dir, ws) = encampment();
    scaffold_crew(ws.root(), "greenplace", "joe");
    let relics = FakeRelics::new();
    let store = ws.root().join("greenplace/.relics");
    relics.insert(&store, Issue::new("gp-task-001", "shared name task"));
    relics.insert(&store, Issue::new("gp-crew-greenplace-joe", "agent"));

    let router = HookRouter::new(ws.clone(), relics.clone());
    let outcome = router
        .charge(
            "gp-task-001",
            Some("greenplace/joe"),
            &caller(Role::Warchief, &ws),
        )
        .await
        .unwrap();

    assert!(matches!(outcome.target, Role::Crew { .. }));
    assert_eq!(
        relics.get(&store, "gp-task-001").unwrap().assignee.unwrap(),
        "greenplace/clan/joe"
    );
}

#[tokio::test]
async fn target_path_without_clan_dir_is_a_raider() {
    let (_dir, ws) = encampment();
    let relics = FakeRelics::new();
    let store = ws.root().join("greenplace/.relics");
    relics.insert(&store, Issue::new("gp-task-001", "task"));
    relics.insert(&store, Issue::new("gp-raider-greenplace-toast", "agent"));

    let router = HookRouter::new(ws.clone(), relics.clone());
    let outcome = router
        .charge(
            "gp-task-001",
            Some("greenplace/toast"),
            &caller(Role::Warchief, &ws),
        )
        .await
        .unwrap();

    assert!(matches!(outcome.target, Role::Raider { .. }));
}

#[tokio::test]
async fn cross_warband_charge_follows_the_routing_table() {
    let (_dir, ws) = encampment();
    // Second warband whose crew member will receive a greenplace bead
    let mut registry = WarbandRegistry::load(ws.root()).unwrap();
    let mut other = hd_core::WarbandConfig::new("other", "ot").unwrap();
    other.crew.push("joe".to_string());
    registry.add(other).unwrap();
    registry.save(ws.root()).unwrap();
    scaffold_warband(ws.root(), "other");
    scaffold_crew(ws.root(), "other", "joe");
    let ws = Workspace::open(ws.root()).unwrap();

    // The route resolves gp- beads into greenplace's warchief clone store
    append_route(
        ws.root(),
        &Route {
            prefix: "gp".to_string(),
            path: "greenplace/warchief/warband".to_string(),
        },
    )
    .unwrap();

    let relics = FakeRelics::new();
    let routed_store = ws.root().join("greenplace/warchief/warband/.relics");
    relics.insert(&routed_store, Issue::new("gp-task-001", "cross-band work"));
    let other_store = ws.root().join("other/.relics");
    relics.insert(&other_store, Issue::new("ot-crew-other-joe", "agent"));

    let router = HookRouter::new(ws.clone(), relics.clone());
    let outcome = router
        .charge("gp-task-001", Some("other/joe"), &caller(Role::Warchief, &ws))
        .await
        .unwrap();

    assert_eq!(outcome.bead_store, routed_store);
    let bead = relics.get(&routed_store, "gp-task-001").unwrap();
    assert_eq!(bead.status, IssueStatus::Pinned);
    assert_eq!(bead.assignee.unwrap(), "other/clan/joe");
    assert_eq!(
        relics.get(&other_store, "ot-crew-other-joe").unwrap().hook.unwrap(),
        "gp-task-001"
    );
}

#[tokio::test]
async fn charge_materializes_missing_agent_bead() {
    let (_dir, ws) = encampment();
    let relics = FakeRelics::new();
    let store = ws.root().join("greenplace/.relics");
    relics.insert(&store, Issue::new("gp-task-001", "task"));

    let router = HookRouter::new(ws.clone(), relics.clone());
    router
        .charge("gp-task-001", None, &caller(raider_role("toast"), &ws))
        .await
        .unwrap();

    let agent = relics.get(&store, "gp-raider-greenplace-toast").unwrap();
    assert_eq!(agent.hook.unwrap(), "gp-task-001");
    assert_eq!(agent.assignee.unwrap(), "greenplace/toast");
}

#[tokio::test]
async fn charge_missing_bead_surfaces_not_found() {
    let (_dir, ws) = encampment();
    let router = HookRouter::new(ws.clone(), FakeRelics::new());

    let err = router
        .charge("gp-ghost", None, &caller(raider_role("toast"), &ws))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Relics(hd_adapters::RelicsError::NotFound(_))
    ));
}
