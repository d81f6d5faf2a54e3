// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn parses_private_message_with_cq_string() {
    let frame = json!({
        "post_type": "message",
        "message_type": "private",
        "sub_type": "friend",
        "time": 1,
        "self_id": 10,
        "user_id": 20,
        "sender": {"user_id": 20, "nickname": "alice"},
        "message_id": 5,
        "message": "~echo#hi",
    });
    let event = Event::from_frame(&frame).unwrap().unwrap();
    assert!(event.is_private_friend());
    let msg = event.message().unwrap();
    assert_eq!(msg.text, "~echo#hi");
    assert_eq!(msg.sender.user_id, "20");
}

#[test]
fn parses_group_normal_message_with_array_form() {
    let frame = json!({
        "post_type": "message",
        "message_type": "group",
        "sub_type": "normal",
        "time": 1,
        "self_id": 10,
        "group_id": 99,
        "sender": {"user_id": 20},
        "message": [{"type": "text", "data": {"text": "hello"}}],
    });
    let event = Event::from_frame(&frame).unwrap().unwrap();
    assert!(event.is_group_normal());
    assert_eq!(event.group_id(), Some("99"));
}

#[test]
fn unrecognized_post_type_is_unexpected_event() {
    let frame = json!({"post_type": "bogus"});
    let err = Event::from_frame(&frame).unwrap_err();
    assert_eq!(err, ErrorKind::UnexpectedEvent);
}

#[test]
fn response_frame_has_no_post_type() {
    let frame = json!({"retcode": 0, "status": "ok", "echo": "123"});
    let event = Event::from_frame(&frame).unwrap().unwrap();
    match event.kind {
        EventKind::Response(r) => {
            assert_eq!(r.echo.as_deref(), Some("123"));
            assert_eq!(r.status, ResponseStatus::Ok);
        }
        other => panic!("expected Response, got {other:?}"),
    }
}

#[test]
fn self_poke_notice_is_detected() {
    let frame = json!({
        "post_type": "notice",
        "notice_type": "poke",
        "self_id": 10,
        "target_id": 10,
        "user_id": 20,
    });
    let event = Event::from_frame(&frame).unwrap().unwrap();
    assert!(event.is_self_poke());
}

#[test]
fn queue_full_wraps_origin() {
    let frame = json!({
        "post_type": "message",
        "message_type": "private",
        "sub_type": "friend",
        "self_id": 10,
        "sender": {"user_id": 20},
        "message": "hi",
    });
    let origin = Event::from_frame(&frame).unwrap().unwrap();
    let wrapped = Event::queue_full(origin.clone());
    match wrapped.kind {
        EventKind::Kernel(k) => {
            assert_eq!(k.subtype, "queue_full");
            assert_eq!(*k.origin.unwrap(), origin);
        }
        other => panic!("expected Kernel, got {other:?}"),
    }
}
