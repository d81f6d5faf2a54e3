// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::event::{EventKind, MessagePayload, MessageSubtype, Sender};

fn event_from(user_id: &str) -> Event {
    Event {
        time: 0,
        self_id: "1".into(),
        kind: EventKind::Message(MessagePayload {
            message_id: None,
            segments: vec![],
            text: String::new(),
            sender: Sender { user_id: user_id.into(), nickname: None, role: None, anonymous: false },
            group_id: None,
            subtype: MessageSubtype::Private,
        }),
    }
}

#[tokio::test]
async fn none_rule_never_registers_in_space() {
    let space = SessionSpace::new();
    let rule = SessionRule::None;
    let a = SessionManager::acquire(&space, &rule, &event_from("1")).await.unwrap();
    let b = SessionManager::acquire(&space, &rule, &event_from("1")).await.unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(space.sessions.lock().await.len(), 0);
}

#[tokio::test]
async fn key_rule_reuses_session_for_same_key() {
    let space = SessionSpace::new();
    let rule = SessionRule::by_sender();
    let a = SessionManager::acquire(&space, &rule, &event_from("1")).await.unwrap();
    SessionManager::release(&a).await;
    let b = SessionManager::acquire(&space, &rule, &event_from("1")).await.unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(b.lock().await.event_records().len(), 2);
}

#[tokio::test]
async fn key_rule_creates_separate_sessions_for_different_keys() {
    let space = SessionSpace::new();
    let rule = SessionRule::by_sender();
    let a = SessionManager::acquire(&space, &rule, &event_from("1")).await.unwrap();
    let b = SessionManager::acquire(&space, &rule, &event_from("2")).await.unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(space.sessions.lock().await.len(), 2);
}

#[tokio::test]
async fn reentrant_acquire_while_activated_is_refused() {
    let space = SessionSpace::new();
    let rule = SessionRule::by_sender();
    let _a = SessionManager::acquire(&space, &rule, &event_from("1")).await.unwrap();
    let b = SessionManager::acquire(&space, &rule, &event_from("1")).await;
    assert!(b.is_none());
}

#[tokio::test]
async fn destroy_is_idempotent_and_removes_from_space() {
    let space = SessionSpace::new();
    let rule = SessionRule::by_sender();
    let a = SessionManager::acquire(&space, &rule, &event_from("1")).await.unwrap();
    SessionManager::destroy(&space, &a).await;
    assert_eq!(space.sessions.lock().await.len(), 0);
    SessionManager::destroy(&space, &a).await;
    assert_eq!(space.sessions.lock().await.len(), 0);
}

#[tokio::test]
async fn repeated_identical_events_increment_repetition_count() {
    let space = SessionSpace::new();
    let rule = SessionRule::by_sender();
    let a = SessionManager::acquire(&space, &rule, &event_from("1")).await.unwrap();
    SessionManager::release(&a).await;
    let b = SessionManager::acquire(&space, &rule, &event_from("1")).await.unwrap();
    let guard = b.lock().await;
    assert_eq!(guard.event_records().len(), 1);
    assert_eq!(guard.event_records()[0].1, 2);
}
