// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::{encampment, scaffold_raider, scaffold_warband};
use hd_adapters::{FakeMux, FakeVcs};
use hd_core::WarbandRegistry;
use serial_test::serial;

fn coordinator(ws: &Workspace, mux: &FakeMux, vcs: &FakeVcs) -> ShutdownCoordinator<FakeMux, FakeVcs> {
    ShutdownCoordinator::new(ws.clone(), mux.clone(), vcs.clone())
}

fn seed_sessions(mux: &FakeMux, sessions: &[&str]) {
    for s in sessions {
        mux.add_session(s);
    }
}

fn add_warband(ws: &Workspace, name: &str, prefix: &str) {
    let mut registry = WarbandRegistry::load(ws.root()).unwrap();
    registry
        .add(hd_core::WarbandConfig::new(name, prefix).unwrap())
        .unwrap();
    registry.save(ws.root()).unwrap();
    scaffold_warband(ws.root(), name);
}

#[tokio::test]
async fn down_stops_infrastructure_but_keeps_raiders() {
    let (_dir, ws) = encampment();
    let mux = FakeMux::new();
    seed_sessions(
        &mux,
        &[
            "hq-warchief",
            "hq-shaman",
            "hd-greenplace-witness",
            "hd-greenplace-forge",
            "hd-greenplace-toast",
            "weechat",
        ],
    );

    let report = coordinator(&ws, &mux, &FakeVcs::new())
        .run(&ShutdownOptions::default())
        .await
        .unwrap();

    assert!(report.ok());
    assert!(mux.get_session("hd-greenplace-toast").is_some(), "raider kept");
    assert!(mux.get_session("weechat").is_some(), "foreign session untouched");
    assert!(mux.get_session("hq-warchief").is_none());
    assert!(mux.get_session("hd-greenplace-witness").is_none());
}

#[tokio::test]
async fn kill_order_is_shaman_then_others_then_warchief() {
    let (_dir, ws) = encampment();
    add_warband(&ws, "aband", "ab");
    add_warband(&ws, "bband", "bb");
    let ws = Workspace::open(ws.root()).unwrap();
    let mux = FakeMux::new();
    seed_sessions(
        &mux,
        &[
            "hq-warchief",
            "hq-shaman",
            "hd-aband-witness",
            "hd-aband-forge",
            "hd-bband-witness",
        ],
    );

    let report = coordinator(&ws, &mux, &FakeVcs::new())
        .run(&ShutdownOptions::default())
        .await
        .unwrap();

    assert!(report.ok());
    let order = mux.kill_order();
    assert_eq!(order.first().map(String::as_str), Some("hq-shaman"));
    assert_eq!(order.last().map(String::as_str), Some("hq-warchief"));
    let middle: Vec<&String> = order[1..order.len() - 1].iter().collect();
    assert_eq!(middle.len(), 3);
    assert!(middle.iter().all(|s| s.starts_with("hd-")));
    // Final state: none of the fleet sessions remain
    assert!(mux.list_sessions().await.unwrap().is_empty());
}

#[tokio::test]
async fn cancel_key_precedes_each_kill() {
    let (_dir, ws) = encampment();
    let mux = FakeMux::new();
    seed_sessions(&mux, &["hq-warchief"]);

    coordinator(&ws, &mux, &FakeVcs::new())
        .run(&ShutdownOptions::default())
        .await
        .unwrap();

    let calls = mux.calls();
    let cancel = calls
        .iter()
        .position(|c| matches!(c, hd_adapters::MuxCall::SendKeysRaw { keyspec, .. } if keyspec == "C-c"));
    let kill = calls
        .iter()
        .position(|c| matches!(c, hd_adapters::MuxCall::KillSessionWithProcesses { .. }));
    assert!(cancel.unwrap() < kill.unwrap());
}

#[tokio::test]
async fn uncommitted_work_refuses_everything_without_nuclear() {
    let (_dir, ws) = encampment();
    scaffold_raider(ws.root(), "greenplace", "toast");
    let mux = FakeMux::new();
    seed_sessions(&mux, &["hq-warchief", "hd-greenplace-toast"]);
    let vcs = FakeVcs::new();
    vcs.set_dirty(&ws.root().join("greenplace/raiders/toast"), "src/main.rs");

    let err = coordinator(&ws, &mux, &vcs)
        .run(&ShutdownOptions {
            stop_raiders: true,
            ..ShutdownOptions::default()
        })
        .await
        .unwrap_err();

    match err {
        EngineError::UncommittedWorkRefused { warband, offenders } => {
            assert_eq!(warband, "greenplace");
            assert_eq!(offenders.len(), 1);
            assert_eq!(offenders[0].0, "toast");
            assert!(offenders[0].1.contains("1 modified"));
        }
        other => panic!("expected UncommittedWorkRefused, got {other:?}"),
    }
    // Nothing was stopped, nothing removed
    assert!(mux.get_session("hq-warchief").is_some());
    assert!(mux.get_session("hd-greenplace-toast").is_some());
    assert!(vcs.worktrees_removed().is_empty());
}

#[tokio::test]
async fn nuclear_overrides_the_guard_and_cleans_worktrees() {
    let (_dir, ws) = encampment();
    scaffold_raider(ws.root(), "greenplace", "toast");
    let mux = FakeMux::new();
    seed_sessions(&mux, &["hd-greenplace-toast"]);
    let vcs = FakeVcs::new();
    vcs.set_dirty(&ws.root().join("greenplace/raiders/toast"), "src/main.rs");

    let report = coordinator(&ws, &mux, &vcs)
        .run(&ShutdownOptions {
            stop_raiders: true,
            cleanup_worktrees: true,
            nuclear: true,
            ..ShutdownOptions::default()
        })
        .await
        .unwrap();

    assert!(report.ok());
    assert!(mux.get_session("hd-greenplace-toast").is_none());
    assert_eq!(report.cleaned, vec!["greenplace/toast"]);
    assert_eq!(
        vcs.worktrees_removed(),
        vec![ws.root().join("greenplace/raiders/toast")]
    );
    assert_eq!(vcs.branches_deleted(), vec!["raiders/toast"]);
}

#[tokio::test]
async fn raiders_only_leaves_infrastructure_alone() {
    let (_dir, ws) = encampment();
    let mux = FakeMux::new();
    seed_sessions(
        &mux,
        &["hq-warchief", "hq-shaman", "hd-greenplace-witness", "hd-greenplace-toast"],
    );

    let report = coordinator(&ws, &mux, &FakeVcs::new())
        .run(&ShutdownOptions {
            raiders_only: true,
            stop_raiders: true,
            ..ShutdownOptions::default()
        })
        .await
        .unwrap();

    assert!(report.ok());
    assert!(mux.get_session("hd-greenplace-toast").is_none());
    assert!(mux.get_session("hq-warchief").is_some());
    assert!(mux.get_session("hq-shaman").is_some());
    assert!(mux.get_session("hd-greenplace-witness").is_some());
}

#[tokio::test]
async fn dry_run_reports_plan_without_killing() {
    let (_dir, ws) = encampment();
    let mux = FakeMux::new();
    seed_sessions(&mux, &["hq-warchief", "hq-shaman"]);

    let report = coordinator(&ws, &mux, &FakeVcs::new())
        .run(&ShutdownOptions {
            dry_run: true,
            ..ShutdownOptions::default()
        })
        .await
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.killed.len(), 2);
    assert!(mux.get_session("hq-warchief").is_some());
    assert!(mux.kill_order().is_empty());
}

#[tokio::test]
#[serial(nuke_env)]
async fn nuke_without_acknowledgement_is_refused() {
    let (_dir, ws) = encampment();
    std::env::remove_var(NUKE_ACK_ENV);
    let mux = FakeMux::new();
    seed_sessions(&mux, &["hq-warchief"]);

    let err = coordinator(&ws, &mux, &FakeVcs::new())
        .run(&ShutdownOptions {
            nuke: true,
            stop_raiders: true,
            ..ShutdownOptions::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::NukeNotAcknowledged));
    assert!(mux.get_session("hq-warchief").is_some());
    assert!(!mux.server_killed());
}

#[tokio::test]
#[serial(nuke_env)]
async fn nuke_with_acknowledgement_kills_the_server() {
    let (_dir, ws) = encampment();
    std::env::set_var(NUKE_ACK_ENV, "1");
    let mux = FakeMux::new();
    seed_sessions(&mux, &["hq-warchief", "hd-greenplace-toast"]);

    let report = coordinator(&ws, &mux, &FakeVcs::new())
        .run(&ShutdownOptions {
            nuke: true,
            stop_raiders: true,
            ..ShutdownOptions::default()
        })
        .await
        .unwrap();

    std::env::remove_var(NUKE_ACK_ENV);
    assert!(report.server_killed);
    assert!(mux.server_killed());
}

#[tokio::test]
async fn shutdown_lock_is_mutually_exclusive() {
    let (_dir, ws) = encampment();
    let path = ws.shutdown_lock_path();

    let held = ShutdownLock::acquire(&path, Duration::from_millis(50)).unwrap();
    assert_eq!(held.path(), path);

    let err = ShutdownLock::acquire(&path, Duration::from_millis(200)).unwrap_err();
    assert!(matches!(err, EngineError::ShutdownLockHeld { .. }));

    drop(held);
    assert!(ShutdownLock::acquire(&path, Duration::from_millis(50)).is_ok());
}

#[tokio::test]
async fn halt_event_lists_stopped_sessions() {
    let (_dir, ws) = encampment();
    let mux = FakeMux::new();
    seed_sessions(&mux, &["hq-warchief", "hq-shaman"]);

    coordinator(&ws, &mux, &FakeVcs::new())
        .run(&ShutdownOptions::default())
        .await
        .unwrap();

    let events = crate::events::EventLog::new(ws.events_path()).read_all();
    let halt = events
        .iter()
        .find_map(|e| match &e.kind {
            crate::events::EventKind::Halt { stopped } => Some(stopped.clone()),
            _ => None,
        })
        .expect("halt event emitted");
    assert!(halt.contains(&"hq-warchief".to_string()));
    assert!(halt.contains(&"hq-shaman".to_string()));
}
