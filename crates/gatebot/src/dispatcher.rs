// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Consumes inbound events and executes the command(s) they resolve to,
//! enforcing authorization, working-status, cooldown, and locking.

use crate::action;
use crate::auth::{AuthChecker, NoticeAuthChecker};
use crate::context::CommandContext;
use crate::event::{Event, EventKind};
use crate::fuzzy::FuzzyTable;
use crate::parser::Parser;
use crate::registry::CommandRegistry;
use crate::responder::ResponseRouter;
use crate::session::SessionManager;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub struct Dispatcher {
    pub registry: Arc<CommandRegistry>,
    pub auth: Arc<AuthChecker>,
    pub notice_auth: Arc<NoticeAuthChecker>,
    pub parser: Arc<Parser>,
    pub router: Arc<ResponseRouter>,
    pub fuzzy: Arc<FuzzyTable>,
    pub fuzzy_fire_counts: Mutex<HashMap<String, u32>>,
    pub task_timeout: Duration,
    pub working: Arc<AtomicBool>,
}

impl Dispatcher {
    /// Handle one event end to end. Never panics or propagates: every error
    /// path either drops silently or produces a user-visible echo, per the
    /// "dispatcher is the last line of defense" propagation policy.
    ///
    /// Takes `self: &Arc<Self>` (rather than `&self`) because exact-command
    /// execution fans out into one task per invocation, each of which needs
    /// its own owned handle back to the dispatcher.
    pub async fn handle_event(self: &Arc<Self>, event: Event) {
        match &event.kind {
            EventKind::Response(_) => {
                self.router.handle_response(event).await;
            }
            EventKind::Kernel(kernel) if kernel.subtype == "queue_full" => {
                if let Some(origin) = &kernel.origin {
                    self.reply_to(origin, "too many tasks, try later").await;
                }
            }
            EventKind::Kernel(kernel) => {
                debug!(subtype = %kernel.subtype, "unhandled kernel event subtype");
            }
            EventKind::Notice(_) if event.is_self_poke() => {
                self.clone().execute_invocation(vec!["poke".to_owned()], event).await;
            }
            EventKind::Message(msg)
                if (event.is_private_friend() || event.is_group_normal()) && !msg.text.is_empty() =>
            {
                self.handle_message(event.clone(), msg.text.clone()).await;
            }
            _ => {}
        }
    }

    async fn handle_message(self: &Arc<Self>, event: Event, text: String) {
        let invocations = self.parser.parse(&text);
        if !invocations.is_empty() {
            let mut tasks = tokio::task::JoinSet::new();
            for invocation in invocations {
                let this = self.clone();
                let event = event.clone();
                tasks.spawn(async move { this.execute_invocation(invocation, event).await });
            }
            while tasks.join_next().await.is_some() {}
            return;
        }

        let hits = {
            let fire_counts = self.fuzzy_fire_counts.lock().await;
            self.fuzzy.matches(&text, &fire_counts)
        };
        if hits.is_empty() {
            return;
        }
        let mut fire_counts = self.fuzzy_fire_counts.lock().await;
        for hit in &hits {
            *fire_counts.entry(hit.clone()).or_insert(0) += 1;
        }
        drop(fire_counts);
        for answer in hits {
            self.clone().execute_invocation(vec!["echo".to_owned(), answer], event.clone()).await;
        }
    }

    /// Execute one `[name, args...]` invocation against `event`.
    async fn execute_invocation(self: Arc<Self>, parts: Vec<String>, event: Event) {
        let Some((name, args)) = parts.split_first() else { return };
        let args = args.to_vec();

        let Ok(canonical) = self.registry.resolve(name) else { return };
        let canonical = canonical.to_owned();
        let Some(descriptor) = self.registry.descriptor(&canonical).cloned() else { return };
        let Some(state) = self.registry.state(&canonical).cloned() else { return };

        let Some(session) = SessionManager::acquire(&state.space, &descriptor.session_rule, &event).await
        else {
            self.reply_to(&event, "a session for this conversation is already in progress").await;
            return;
        };

        // Notices carry a raw user id rather than full sender/group context,
        // so they're authorized through the dedicated notice checker rather
        // than the message-shaped `AuthChecker`.
        let authorized = match &event.kind {
            EventKind::Notice(notice) => match notice.user_id.as_deref() {
                Some(user_id) => self.notice_auth.check(descriptor.required_level, user_id),
                None => false,
            },
            _ => self.auth.check(descriptor.required_level, &event),
        };
        if !self.registry.is_system(&canonical) && !authorized {
            SessionManager::release(&session).await;
            return;
        }

        if !self.working.load(Ordering::SeqCst) && canonical != "lifecycle" {
            SessionManager::release(&session).await;
            return;
        }

        // Cooldown/lock enforcement, per dispatch step 5.
        let _call_guard = if !descriptor.cooldown.is_zero() {
            let Ok(guard) = state.call_lock.try_lock() else {
                self.reply_to(&event, "command busy, try again shortly").await;
                SessionManager::release(&session).await;
                return;
            };
            let last_call = *state.last_call.lock().await;
            if let Some(last) = last_call {
                let elapsed = last.elapsed();
                if elapsed < descriptor.cooldown {
                    let rest = (descriptor.cooldown - elapsed).as_secs_f64().ceil() as u64;
                    self.reply_to(&event, &format!("on cooldown, {rest} s remaining")).await;
                    SessionManager::release(&session).await;
                    return;
                }
            }
            Some(guard)
        } else if descriptor.lock {
            Some(state.call_lock.lock().await)
        } else {
            None
        };

        let ctx = CommandContext::new(event.clone(), args, Some(session.clone()), self.router.clone());
        let handler = descriptor.handler.clone();
        let result = tokio::time::timeout(self.task_timeout, handler(ctx)).await;

        if !descriptor.cooldown.is_zero() {
            *state.last_call.lock().await = Some(Instant::now());
        }
        SessionManager::release(&session).await;

        match result {
            Ok(Ok(())) => {}
            Ok(Err(kind)) => {
                if let Some(message) = kind.user_message() {
                    self.reply_to(&event, &message).await;
                } else {
                    warn!(command = %canonical, %kind, "command failed silently");
                }
            }
            Err(_) => {
                self.reply_to(&event, "timed out, giving up").await;
            }
        }
    }

    async fn reply_to(&self, event: &Event, text: &str) {
        let group_id = event.group_id();
        let user_id = if group_id.is_none() { event.sender_id() } else { None };
        self.router.throw(action::send_msg(user_id, group_id, text), false).await;
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
