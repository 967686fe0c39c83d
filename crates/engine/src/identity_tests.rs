// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

fn lock_in(dir: &TempDir) -> IdentityLock {
    IdentityLock::new(dir.path())
}

#[test]
fn acquire_writes_holder_info() {
    let dir = TempDir::new().unwrap();
    let lock = lock_in(&dir);

    let info = lock.acquire("hd-greenplace-toast").unwrap();

    assert_eq!(info.session, "hd-greenplace-toast");
    let holder = lock.read_holder().unwrap();
    assert_eq!(holder.pid, info.pid);
    assert!(lock.path().ends_with(".runtime/agent.lock"));
}

#[test]
fn second_claimant_gets_session_held() {
    let dir = TempDir::new().unwrap();
    let lock = lock_in(&dir);
    lock.acquire("hd-greenplace-toast").unwrap();

    // A different (live) pid tries to claim the same identity
    let other = lock_in(&dir);
    let err = other.acquire_as(1, "hd-greenplace-toast").unwrap_err();

    match err {
        EngineError::SessionHeld {
            holder_pid,
            holder_session,
            ..
        } => {
            #[allow(clippy::cast_possible_wrap)]
            let me = std::process::id() as i32;
            assert_eq!(holder_pid, me);
            assert_eq!(holder_session, "hd-greenplace-toast");
        }
        other => panic!("expected SessionHeld, got {other:?}"),
    }
}

#[test]
fn dead_holder_is_reclaimed_by_next_claimant() {
    let dir = TempDir::new().unwrap();
    let lock = lock_in(&dir);
    let dead = dead_pid();
    lock.acquire_as(dead, "hd-greenplace-toast").unwrap();
    assert!(lock.read_holder().is_some());
    assert!(lock.live_holder().is_none(), "holder pid must be dead");

    let info = lock.acquire("hd-greenplace-toast").unwrap();
    #[allow(clippy::cast_possible_wrap)]
    let me = std::process::id() as i32;
    assert_eq!(info.pid, me);
    assert_eq!(lock.read_holder().unwrap().pid, me);
}

#[test]
fn reacquire_by_same_pid_refreshes() {
    let dir = TempDir::new().unwrap();
    let lock = lock_in(&dir);
    lock.acquire("session-one").unwrap();
    let info = lock.acquire("session-two").unwrap();

    assert_eq!(info.session, "session-two");
    assert_eq!(lock.read_holder().unwrap().session, "session-two");
}

#[test]
fn release_removes_only_own_lock() {
    let dir = TempDir::new().unwrap();
    let lock = lock_in(&dir);
    lock.acquire("mine").unwrap();

    // A stranger's release must not unlock us
    lock.release_as(1);
    assert!(lock.read_holder().is_some());

    lock.release();
    assert!(lock.read_holder().is_none());
    assert!(!lock.path().exists());
}

#[test]
fn release_session_removes_matching_holder_regardless_of_pid() {
    let dir = TempDir::new().unwrap();
    let lock = lock_in(&dir);
    lock.acquire_as(1, "hd-greenplace-toast").unwrap();

    // A different session name leaves the lock alone
    lock.release_session("hd-greenplace-crumb");
    assert!(lock.read_holder().is_some());

    lock.release_session("hd-greenplace-toast");
    assert!(lock.read_holder().is_none());
}

#[test]
fn corrupt_lock_file_is_reclaimed() {
    let dir = TempDir::new().unwrap();
    let lock = lock_in(&dir);
    std::fs::create_dir_all(lock.path().parent().unwrap()).unwrap();
    std::fs::write(lock.path(), "not json at all").unwrap();

    let info = lock.acquire("fresh").unwrap();
    assert_eq!(lock.read_holder().unwrap().session, info.session);
}

#[test]
fn pid_alive_detects_self_and_dead() {
    #[allow(clippy::cast_possible_wrap)]
    let me = std::process::id() as i32;
    assert!(pid_alive(me));
    assert!(!pid_alive(dead_pid()));
}
