// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn user_visible_kinds_carry_a_message() {
    for kind in [
        ErrorKind::CommandExecFailed("boom".to_owned()),
        ErrorKind::ArgumentError,
        ErrorKind::Timeout,
        ErrorKind::QueueFull,
    ] {
        assert!(kind.user_visible());
        assert!(kind.user_message().is_some());
    }
}

#[test]
fn silent_kinds_carry_no_message() {
    for kind in [
        ErrorKind::UnknownCommand,
        ErrorKind::UnexpectedEvent,
        ErrorKind::UnexpectedFormat,
        ErrorKind::TransportClosed,
    ] {
        assert!(!kind.user_visible());
        assert!(kind.user_message().is_none());
    }
}

#[test]
fn exec_failed_message_is_propagated_verbatim() {
    let kind = ErrorKind::CommandExecFailed("division by zero".to_owned());
    assert_eq!(kind.user_message().unwrap(), "division by zero");
    assert_eq!(kind.to_string(), "COMMAND_EXEC_FAILED: division by zero");
}
