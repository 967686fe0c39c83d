// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn message_deserializes_wire_shape() {
    let json = r#"{
        "id": "m-1",
        "from": "warchief/",
        "to": "greenplace/toast",
        "subject": "hello",
        "body": "check in",
        "type": "handoff",
        "timestamp": "2026-01-05T12:00:00Z"
    }"#;
    let msg: Message = serde_json::from_str(json).unwrap();
    assert_eq!(msg.kind, MessageKind::Handoff);
    assert_eq!(msg.from, "warchief/");
    assert!(!msg.read);
    assert!(msg.thread_id.is_none());
}

#[test]
fn new_message_defaults_to_note() {
    let msg = NewMessage::new("warchief/", "subject", "body");
    assert_eq!(msg.kind, MessageKind::Note);
    assert_eq!(msg.priority, 0);
    assert!(!msg.ephemeral);
}

#[test]
fn kind_builder_sets_type() {
    let msg = NewMessage::new("warchief/", "s", "b").kind(MessageKind::Escalation);
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["type"], "escalation");
}
