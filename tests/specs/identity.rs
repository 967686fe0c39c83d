//! Scenario: two processes rally over the same raider identity; exactly
//! one wins the lock, the loser learns who holds it.

use crate::prelude::*;
use hd_adapters::{FakeDrums, FakeRelics};
use hd_engine::{
    EngineError, IdentityLock, LocationSource, Rally, RoleLocation,
};
use hd_core::Role;

fn raider_location(ws: &hd_engine::Workspace) -> RoleLocation {
    RoleLocation {
        role: Role::Raider {
            warband: "greenplace".to_string(),
            name: "toast".to_string(),
        },
        home_dir: ws.root().join("greenplace/raiders/toast"),
        source: LocationSource::Cwd,
        mismatch: None,
    }
}

#[tokio::test]
async fn concurrent_rallies_serialize_on_the_identity_lock() {
    let (_dir, ws) = encampment();
    scaffold_raider(ws.root(), "greenplace", "toast");

    // First claimant: another live process (pid 1 stands in for it)
    let home = ws.root().join("greenplace/raiders/toast");
    let first = IdentityLock::new(&home)
        .acquire_as(1, "hd-greenplace-toast")
        .unwrap();

    // Second claimant: this process, through a real rally
    let rally = Rally::new(ws.clone(), FakeRelics::new(), FakeDrums::new());
    let err = rally.rally(&raider_location(&ws)).await.unwrap_err();

    match err {
        EngineError::SessionHeld {
            holder_pid,
            holder_session,
            acquired_at,
            ..
        } => {
            assert_eq!(holder_pid, 1);
            assert_eq!(holder_session, "hd-greenplace-toast");
            assert_eq!(acquired_at, first.acquired_at);
        }
        other => panic!("expected SessionHeld, got {other:?}"),
    }
}

#[tokio::test]
async fn stale_holder_is_reclaimed_by_the_next_rally() {
    let (_dir, ws) = encampment();
    scaffold_raider(ws.root(), "greenplace", "toast");
    let home = ws.root().join("greenplace/raiders/toast");

    // A dead process left its lock behind
    let mut dead_child = std::process::Command::new("true").spawn().unwrap();
    dead_child.wait().unwrap();
    #[allow(clippy::cast_possible_wrap)]
    let dead_pid = dead_child.id() as i32;
    IdentityLock::new(&home)
        .acquire_as(dead_pid, "hd-greenplace-toast")
        .unwrap();

    let rally = Rally::new(ws.clone(), FakeRelics::new(), FakeDrums::new());
    let banner = rally.rally(&raider_location(&ws)).await.unwrap();
    assert_eq!(banner.role.class_str(), "raider");

    // The lock now belongs to this process
    #[allow(clippy::cast_possible_wrap)]
    let me = std::process::id() as i32;
    let holder = IdentityLock::new(&home).read_holder().unwrap();
    assert_eq!(holder.pid, me);
}
