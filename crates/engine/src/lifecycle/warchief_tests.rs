// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::lifecycle::AgentState;
use crate::test_helpers::encampment;
use hd_adapters::FakeMux;

#[tokio::test]
async fn warchief_canonical_forms() {
    let (_dir, ws) = encampment();
    let warchief = WarchiefManager::new(ws.clone(), FakeMux::new()).unwrap();

    assert_eq!(warchief.session_name().as_str(), "hq-warchief");
    assert_eq!(warchief.role().class_str(), "warchief");
    assert_eq!(warchief.workdir(), ws.root(), "the warchief's home is the root");
}

#[tokio::test]
async fn warchief_start_stop_round_trip() {
    let (_dir, ws) = encampment();
    let mux = FakeMux::new();
    let warchief = WarchiefManager::new(ws, mux.clone()).unwrap();

    assert_eq!(
        warchief.start(&StartOptions::default()).await.unwrap(),
        StartOutcome::Started
    );
    assert_eq!(warchief.status().await.unwrap().state, AgentState::Running);
    assert_eq!(warchief.stop().await.unwrap(), StopOutcome::Stopped);
    assert!(mux.get_session("hq-warchief").is_none());
}

#[tokio::test]
async fn warchief_session_env_names_the_coordinator() {
    let (_dir, ws) = encampment();
    let mux = FakeMux::new();
    let warchief = WarchiefManager::new(ws, mux.clone()).unwrap();
    warchief.start(&StartOptions::default()).await.unwrap();

    let env = mux.get_session("hq-warchief").unwrap().env;
    assert!(env.contains(&("HD_ROLE".to_string(), "warchief".to_string())));
    assert!(env.contains(&("BD_ACTOR".to_string(), "warchief".to_string())));
}
