// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;

#[tokio::test]
async fn create_show_update_round_trip() {
    let relics = FakeRelics::new();
    let dir = Path::new("/store");
    relics.set_prefix(dir, "gp-task");

    let id = relics
        .create(dir, "task", NewIssue::new("fix the gate"))
        .await
        .unwrap();
    assert_eq!(id, "gp-task-1");

    relics
        .update(
            dir,
            id.as_str(),
            IssueUpdate::status(IssueStatus::Pinned).with_assignee("greenplace/toast"),
        )
        .await
        .unwrap();

    let issue = relics.show(dir, id.as_str()).await.unwrap();
    assert!(pinned(&issue));
    assert_eq!(issue.assignee.unwrap(), "greenplace/toast");
}

#[tokio::test]
async fn show_missing_is_not_found() {
    let relics = FakeRelics::new();
    assert!(matches!(
        relics.show(Path::new("/store"), "ghost").await,
        Err(RelicsError::NotFound(_))
    ));
}

#[tokio::test]
async fn list_filters_by_status_and_assignee() {
    let relics = FakeRelics::new();
    let dir = Path::new("/store");

    let mut pinned_issue = Issue::new("gp-1", "pinned work");
    pinned_issue.status = IssueStatus::Pinned;
    pinned_issue.assignee = Some("greenplace/toast".into());
    relics.insert(dir, pinned_issue);
    relics.insert(dir, Issue::new("gp-2", "open work"));

    let found = relics
        .list(
            dir,
            IssueFilter {
                status: Some(IssueStatus::Pinned),
                assignee: Some("greenplace/toast".into()),
                ..IssueFilter::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "gp-1");
}

#[tokio::test]
async fn hook_set_and_clear() {
    let relics = FakeRelics::new();
    let dir = Path::new("/store");
    relics.insert(dir, Issue::new("gp-agent", "agent bead"));

    relics
        .update(
            dir,
            "gp-agent",
            IssueUpdate::default().with_hook(HookUpdate::Set(BeadId::new("gp-task-1"))),
        )
        .await
        .unwrap();
    assert_eq!(
        relics.get(dir, "gp-agent").unwrap().hook.unwrap(),
        "gp-task-1"
    );

    relics
        .update(
            dir,
            "gp-agent",
            IssueUpdate::default().with_hook(HookUpdate::Clear),
        )
        .await
        .unwrap();
    assert!(relics.get(dir, "gp-agent").unwrap().hook.is_none());
}

#[tokio::test]
async fn missing_binary_mode_surfaces_dependency_error() {
    let relics = FakeRelics::new();
    relics.set_missing_binary(true);
    assert!(matches!(
        relics.show(Path::new("/store"), "x").await,
        Err(RelicsError::DependencyMissing(_))
    ));
}
