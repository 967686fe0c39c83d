// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::drums::Mailbox;
use hd_core::MessageKind;

#[tokio::test]
async fn send_then_list_round_trips() {
    let drums = FakeDrums::new();
    let id = drums
        .send("warchief/", NewMessage::new("greenplace/toast", "hi", "body"))
        .await
        .unwrap();

    let inbox = drums.list("greenplace/toast").await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].id, id);
    assert_eq!(inbox[0].from, "warchief/");
    assert!(!inbox[0].read);
}

#[tokio::test]
async fn unread_count_tracks_mark_read() {
    let drums = FakeDrums::new();
    let id = drums
        .send("warchief/", NewMessage::new("shaman/", "s", "b"))
        .await
        .unwrap();

    assert_eq!(drums.count("shaman/").await.unwrap(), 1);
    drums.mark_read("shaman/", &id).await.unwrap();
    assert_eq!(drums.count("shaman/").await.unwrap(), 0);
    drums.mark_unread("shaman/", &id).await.unwrap();
    assert_eq!(drums.count("shaman/").await.unwrap(), 1);
}

#[tokio::test]
async fn teaser_mentions_latest_sender_and_subject() {
    let drums = FakeDrums::new();
    assert!(drums.check_teaser("warchief/").await.unwrap().is_none());

    drums
        .send(
            "greenplace/witness",
            NewMessage::new("warchief/", "raider down", "details").kind(MessageKind::Escalation),
        )
        .await
        .unwrap();

    let teaser = drums.check_teaser("warchief/").await.unwrap().unwrap();
    assert!(teaser.contains("1 unread"));
    assert!(teaser.contains("greenplace/witness"));
    assert!(teaser.contains("raider down"));
}

#[tokio::test]
async fn delete_removes_message() {
    let drums = FakeDrums::new();
    let id = drums
        .send("a/", NewMessage::new("b/", "s", "m"))
        .await
        .unwrap();

    drums.delete("b/", &id).await.unwrap();
    assert!(matches!(
        drums.get("b/", &id).await,
        Err(DrumsError::NotFound(_))
    ));
}

#[tokio::test]
async fn mailbox_wrapper_scopes_address() {
    let drums = FakeDrums::new();
    drums
        .send("a/", NewMessage::new("warchief/", "s", "m"))
        .await
        .unwrap();

    let mailbox = Mailbox::new(drums, "warchief/".into());
    assert_eq!(mailbox.count().await.unwrap(), 1);
    assert_eq!(mailbox.list().await.unwrap().len(), 1);
}
