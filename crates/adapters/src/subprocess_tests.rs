// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use tokio::process::Command;

#[tokio::test]
async fn run_with_timeout_returns_output() {
    let mut cmd = Command::new("echo");
    cmd.arg("hello");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "echo")
        .await
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
}

#[tokio::test]
async fn run_with_timeout_times_out() {
    let mut cmd = Command::new("sleep");
    cmd.arg("5");
    let err = run_with_timeout(cmd, Duration::from_millis(50), "sleep")
        .await
        .unwrap_err();
    assert!(err.contains("timed out"), "unexpected error: {}", err);
}

#[tokio::test]
async fn run_with_timeout_reports_spawn_failure() {
    let cmd = Command::new("definitely-not-a-binary-xyz");
    let err = run_with_timeout(cmd, Duration::from_secs(1), "missing")
        .await
        .unwrap_err();
    assert!(err.contains("missing failed"), "unexpected error: {}", err);
}

#[tokio::test]
async fn run_required_binary_flags_missing_binary() {
    let cmd = Command::new("definitely-not-a-binary-xyz");
    let err = run_required_binary(
        cmd,
        Duration::from_secs(1),
        "definitely-not-a-binary-xyz",
        "probe",
    )
    .await
    .unwrap_err();
    assert!(matches!(err, BinaryError::Missing(name) if name == "definitely-not-a-binary-xyz"));
}

#[tokio::test]
async fn run_required_binary_passes_through_success() {
    let mut cmd = Command::new("echo");
    cmd.arg("ok");
    let output = run_required_binary(cmd, Duration::from_secs(5), "echo", "echo")
        .await
        .unwrap();
    assert!(output.status.success());
}
