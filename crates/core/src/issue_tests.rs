// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn issue_defaults_are_open_and_unassigned() {
    let issue = Issue::new("gp-task-001", "fix the gate");
    assert_eq!(issue.status, IssueStatus::Open);
    assert!(issue.assignee.is_none());
    assert!(issue.hook.is_none());
    assert!(issue.labels.is_empty());
}

#[test]
fn issue_deserializes_with_missing_optional_fields() {
    let issue: Issue =
        serde_json::from_str(r#"{"id": "gp-task-001", "title": "fix the gate"}"#).unwrap();
    assert_eq!(issue.id, "gp-task-001");
    assert_eq!(issue.status, IssueStatus::Open);
    assert_eq!(issue.priority, 0);
}

#[test]
fn status_serializes_snake_case() {
    assert_eq!(
        serde_json::to_string(&IssueStatus::InProgress).unwrap(),
        "\"in_progress\""
    );
    assert_eq!(
        serde_json::to_string(&IssueStatus::Pinned).unwrap(),
        "\"pinned\""
    );
}

#[parameterized(
    simple = { "gp-task-001", "gp" },
    no_dash = { "gptask", "gptask" },
    leading_dash = { "-task", "" },
)]
fn prefix_extraction(id: &str, prefix: &str) {
    assert_eq!(extract_prefix(id), prefix);
}

#[test]
fn update_builder_composes() {
    let update = IssueUpdate::status(IssueStatus::Pinned)
        .with_assignee("greenplace/clan/joe")
        .with_hook(HookUpdate::Set(BeadId::new("gp-task-001")));
    assert_eq!(update.status, Some(IssueStatus::Pinned));
    assert_eq!(update.assignee, Some(Address::new("greenplace/clan/joe")));
    assert_eq!(
        update.hook,
        Some(HookUpdate::Set(BeadId::new("gp-task-001")))
    );
}
