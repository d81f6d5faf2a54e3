// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The value passed to every command handler invocation.

use crate::action::{self, Action};
use crate::event::Event;
use crate::responder::ResponseRouter;
use crate::session::SharedSession;
use std::sync::Arc;

/// Everything a handler needs: the triggering event, its parsed arguments,
/// its bound session (if the descriptor's rule registers one), and a handle
/// back into the runtime for emitting actions.
pub struct CommandContext {
    pub event: Event,
    pub args: Vec<String>,
    pub session: Option<SharedSession>,
    router: Arc<ResponseRouter>,
}

impl CommandContext {
    pub fn new(event: Event, args: Vec<String>, session: Option<SharedSession>, router: Arc<ResponseRouter>) -> Self {
        CommandContext { event, args, session, router }
    }

    /// Reply in the originating conversation: the event's group if it has
    /// one, otherwise the sender directly.
    pub async fn reply(&self, text: &str) {
        let group_id = self.event.group_id();
        let user_id = if group_id.is_none() { self.event.sender_id() } else { None };
        self.router.throw(action::send_msg(user_id, group_id, text), false).await;
    }

    /// Emit an action without waiting for a response.
    pub async fn throw(&self, action: Action) {
        self.router.throw(action, false).await;
    }

    /// Emit an action and await its correlated response.
    pub async fn wait(&self, action: Action) -> Option<crate::event::ResponsePayload> {
        self.router.wait(action, false).await.await.ok()
    }
}
