// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::event::{Event, EventKind, MessagePayload, MessageSubtype, Sender};

fn msg_event(user_id: &str, group_id: Option<&str>, subtype: MessageSubtype, anonymous: bool) -> Event {
    Event {
        time: 0,
        self_id: "1".into(),
        kind: EventKind::Message(MessagePayload {
            message_id: None,
            segments: vec![],
            text: String::new(),
            sender: Sender { user_id: user_id.into(), nickname: None, role: None, anonymous },
            group_id: group_id.map(str::to_owned),
            subtype,
        }),
    }
}

#[test]
fn owner_outranks_everyone() {
    let checker = AuthChecker { owner: Some("1".into()), ..Default::default() };
    let event = msg_event("1", None, MessageSubtype::Private, false);
    assert_eq!(checker.level(&event), OWNER);
    assert!(checker.check(SYS.min(OWNER), &event) || checker.check(OWNER, &event));
}

#[test]
fn blacklist_is_absorbing_even_for_owner() {
    let mut checker = AuthChecker { owner: Some("1".into()), ..Default::default() };
    checker.black_list.insert("1".into());
    let event = msg_event("1", None, MessageSubtype::Private, false);
    assert_eq!(checker.level(&event), BLACK);
    assert!(!checker.check(USER, &event));
}

#[test]
fn group_anonymous_is_black() {
    let checker = AuthChecker::default();
    let event = msg_event("1", Some("9"), MessageSubtype::GroupAnonym, true);
    assert_eq!(checker.level(&event), BLACK);
}

#[test]
fn unlisted_group_denies_even_authorized_user() {
    let mut checker = AuthChecker { owner: Some("1".into()), ..Default::default() };
    checker.white_groups.insert("100".into());
    let event = msg_event("1", Some("200"), MessageSubtype::GroupNormal, false);
    assert!(!checker.check(USER, &event));
}

#[test]
fn empty_white_group_list_denies_every_group_message() {
    let checker = AuthChecker { owner: Some("1".into()), ..Default::default() };
    let event = msg_event("1", Some("200"), MessageSubtype::GroupNormal, false);
    assert!(!checker.check(USER, &event));
}

#[test]
fn default_level_is_user() {
    let checker = AuthChecker::default();
    let event = msg_event("42", None, MessageSubtype::Private, false);
    assert_eq!(checker.level(&event), USER);
    assert!(checker.check(USER, &event));
    assert!(!checker.check(SU, &event));
}

#[test]
fn notice_checker_mirrors_message_checker_without_event_context() {
    let mut checker = NoticeAuthChecker { owner: Some("1".into()), ..Default::default() };
    checker.black_list.insert("2".into());
    assert_eq!(checker.level("1"), OWNER);
    assert_eq!(checker.level("2"), BLACK);
    assert!(!checker.check(USER, "2"));
}
