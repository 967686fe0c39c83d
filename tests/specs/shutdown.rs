//! Scenarios: shutdown ordering and the uncommitted-work guard.

use crate::prelude::*;
use hd_adapters::{FakeMux, FakeVcs, Multiplexer};
use hd_engine::{EngineError, ShutdownCoordinator, ShutdownLock, ShutdownOptions};
use std::time::Duration;

#[tokio::test]
async fn shutdown_order_is_shaman_then_warband_agents_then_warchief() {
    let (_dir, ws) = encampment();
    let ws = add_warband(&ws, "aband", "ab");
    let ws = add_warband(&ws, "bband", "bb");
    let mux = FakeMux::new();
    for session in [
        "hq-warchief",
        "hq-shaman",
        "hd-aband-witness",
        "hd-aband-forge",
        "hd-bband-witness",
    ] {
        mux.add_session(session);
    }

    let report = ShutdownCoordinator::new(ws, mux.clone(), FakeVcs::new())
        .run(&ShutdownOptions::default())
        .await
        .unwrap();

    assert!(report.ok());
    let order = mux.kill_order();
    assert_eq!(order.len(), 5);
    assert_eq!(order[0], "hq-shaman");
    assert_eq!(order[4], "hq-warchief");
    let middle: std::collections::BTreeSet<&str> =
        order[1..4].iter().map(String::as_str).collect();
    assert_eq!(
        middle,
        ["hd-aband-witness", "hd-aband-forge", "hd-bband-witness"]
            .into_iter()
            .collect()
    );
    // Final multiplexer state: none of these sessions present
    assert!(mux.list_sessions().await.unwrap().is_empty());
}

#[tokio::test]
async fn uncommitted_work_guard_refuses_and_stops_nothing() {
    let (_dir, ws) = encampment();
    scaffold_raider(ws.root(), "greenplace", "toast");
    let mux = FakeMux::new();
    mux.add_session("hq-warchief");
    mux.add_session("hd-greenplace-toast");
    let vcs = FakeVcs::new();
    vcs.set_dirty(&ws.root().join("greenplace/raiders/toast"), "src/lib.rs");

    let err = ShutdownCoordinator::new(ws.clone(), mux.clone(), vcs.clone())
        .run(&ShutdownOptions {
            stop_raiders: true,
            cleanup_worktrees: true,
            ..ShutdownOptions::default()
        })
        .await
        .unwrap_err();

    match err {
        EngineError::UncommittedWorkRefused { warband, offenders } => {
            assert_eq!(warband, "greenplace");
            assert_eq!(offenders[0].0, "toast");
            assert!(offenders[0].1.contains("1 modified"));
        }
        other => panic!("expected UncommittedWorkRefused, got {other:?}"),
    }

    // Nothing stopped, nothing removed
    assert_eq!(mux.list_sessions().await.unwrap().len(), 2);
    assert!(vcs.worktrees_removed().is_empty());
}

#[test]
fn only_one_shutdown_can_hold_the_lock() {
    let (_dir, ws) = encampment();
    let path = ws.shutdown_lock_path();

    let held = ShutdownLock::acquire(&path, Duration::from_millis(50)).unwrap();
    assert!(matches!(
        ShutdownLock::acquire(&path, Duration::from_millis(150)),
        Err(EngineError::ShutdownLockHeld { .. })
    ));
    drop(held);
    assert!(ShutdownLock::acquire(&path, Duration::from_millis(50)).is_ok());
}
