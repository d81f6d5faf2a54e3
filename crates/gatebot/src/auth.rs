// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User level classification and authorization checks.

use crate::event::Event;
use std::collections::HashSet;

pub type UserLevel = i32;

pub const BLACK: UserLevel = -1;
pub const USER: UserLevel = 70;
pub const WHITE: UserLevel = 80;
pub const SU: UserLevel = 90;
pub const OWNER: UserLevel = 100;
pub const SYS: UserLevel = 101;

#[derive(Debug, Clone, Default)]
pub struct AuthChecker {
    pub owner: Option<String>,
    pub super_users: HashSet<String>,
    pub white_list: HashSet<String>,
    pub black_list: HashSet<String>,
    pub white_groups: HashSet<String>,
}

impl AuthChecker {
    pub fn level(&self, event: &Event) -> UserLevel {
        let Some(sender) = event.sender_id() else { return BLACK };
        if self.black_list.contains(sender) || event.is_group_anonymous() {
            return BLACK;
        }
        if self.owner.as_deref() == Some(sender) {
            return OWNER;
        }
        if self.super_users.contains(sender) {
            return SU;
        }
        if self.white_list.contains(sender) {
            return WHITE;
        }
        USER
    }

    /// True iff `event`'s originator is authorized for `required`.
    pub fn check(&self, required: UserLevel, event: &Event) -> bool {
        if event.is_group_normal() || event.is_group_anonymous() {
            if let Some(gid) = event.group_id() {
                if !self.white_groups.contains(gid) {
                    return false;
                }
            }
        }
        let level = self.level(event);
        level > BLACK && level >= required
    }
}

/// Parallel checker for notice/request events, which carry a raw user id
/// rather than a full `Event` with sender/group context.
#[derive(Debug, Clone, Default)]
pub struct NoticeAuthChecker {
    pub owner: Option<String>,
    pub super_users: HashSet<String>,
    pub white_list: HashSet<String>,
    pub black_list: HashSet<String>,
}

impl NoticeAuthChecker {
    pub fn level(&self, user_id: &str) -> UserLevel {
        if self.black_list.contains(user_id) {
            return BLACK;
        }
        if self.owner.as_deref() == Some(user_id) {
            return OWNER;
        }
        if self.super_users.contains(user_id) {
            return SU;
        }
        if self.white_list.contains(user_id) {
            return WHITE;
        }
        USER
    }

    pub fn check(&self, required: UserLevel, user_id: &str) -> bool {
        let level = self.level(user_id);
        level > BLACK && level >= required
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
