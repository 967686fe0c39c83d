// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::encampment;
use hd_adapters::{FakeMux, FakeRelics};
use hd_core::{Issue, IssueStatus};

#[tokio::test]
async fn forge_workdir_is_the_warband_worktree() {
    let (_dir, ws) = encampment();
    let forge =
        ForgeManager::new(ws.clone(), "greenplace", FakeMux::new(), FakeRelics::new()).unwrap();

    assert_eq!(forge.session_name().as_str(), "hd-greenplace-forge");
    assert_eq!(forge.workdir(), ws.root().join("greenplace/forge/warband"));
}

#[tokio::test]
async fn queue_depth_counts_open_work_assigned_to_forge() {
    let (_dir, ws) = encampment();
    let relics = FakeRelics::new();
    let store = ws.root().join("greenplace/.relics");

    let mut queued = Issue::new("gp-10", "merge branch a");
    queued.assignee = Some("greenplace/forge".into());
    relics.insert(&store, queued);

    let mut working = Issue::new("gp-11", "merge branch b");
    working.status = IssueStatus::InProgress;
    working.assignee = Some("greenplace/forge".into());
    relics.insert(&store, working);

    let mut done = Issue::new("gp-12", "merged already");
    done.status = IssueStatus::Done;
    done.assignee = Some("greenplace/forge".into());
    relics.insert(&store, done);

    let mut other = Issue::new("gp-13", "not mine");
    other.assignee = Some("greenplace/toast".into());
    relics.insert(&store, other);

    let forge = ForgeManager::new(ws, "greenplace", FakeMux::new(), relics).unwrap();
    assert_eq!(forge.queue_depth().await.unwrap(), 2);
}
