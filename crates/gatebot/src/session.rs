// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-conversation session state and the equivalence-rule session manager.
//!
//! The original keys sessions by reflecting an attribute path off the event
//! (`event.sender.user_id`, etc). That reflection is replaced here by a
//! plain closure `(event) -> String`, per the key-extractor redesign: it
//! subsumes attribute-path projection and custom predicates alike, since
//! any attribute path or equivalence predicate can be expressed as "compute
//! a string key and compare keys for equality".

use crate::event::Event;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

pub type SharedSession = Arc<Mutex<Session>>;
pub type KeyFn = Arc<dyn Fn(&Event) -> String + Send + Sync>;

/// How an inbound event is bound to an existing or new session.
#[derive(Clone)]
pub enum SessionRule {
    /// Ephemeral: a fresh session per call, never registered in a space.
    None,
    /// Events with equal extracted keys share a session.
    Key(KeyFn),
}

impl SessionRule {
    /// Key by sender id — the common "one session per user" case.
    pub fn by_sender() -> Self {
        SessionRule::Key(Arc::new(|e: &Event| e.sender_id().unwrap_or("").to_owned()))
    }

    /// Key by group id — "one session per group" case.
    pub fn by_group() -> Self {
        SessionRule::Key(Arc::new(|e: &Event| e.group_id().unwrap_or("").to_owned()))
    }

    /// Key by (group id, sender id) — "one session per user-in-group" case.
    pub fn by_sender_and_group() -> Self {
        SessionRule::Key(Arc::new(|e: &Event| {
            format!("{}:{}", e.group_id().unwrap_or(""), e.sender_id().unwrap_or(""))
        }))
    }
}

pub struct Session {
    key: String,
    events: Vec<(Event, u32)>,
    store: HashMap<String, Value>,
    created_at: u64,
    activated: bool,
    expired: bool,
}

impl Session {
    fn new(key: String, event: Event) -> Self {
        let mut session = Session {
            key,
            events: Vec::new(),
            store: HashMap::new(),
            created_at: now_secs(),
            activated: false,
            expired: false,
        };
        session.push_event(event);
        session
    }

    fn push_event(&mut self, event: Event) {
        if let Some((last, count)) = self.events.last_mut() {
            if *last == event {
                *count += 1;
                return;
            }
        }
        self.events.push((event, 1));
    }

    /// The most recently observed event (the "current event"). `None` only
    /// for a session that has somehow had every event record stripped out.
    pub fn current_event(&self) -> Option<&Event> {
        self.events.last().map(|(event, _)| event)
    }

    pub fn event_records(&self) -> &[(Event, u32)] {
        &self.events
    }

    pub fn store(&self) -> &HashMap<String, Value> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut HashMap<String, Value> {
        &mut self.store
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }
}

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

/// One command's session-space: an ordered list of live sessions, guarded by
/// a single lock so the scan-then-insert-or-append in [`SessionManager::acquire`]
/// is atomic.
#[derive(Default)]
pub struct SessionSpace {
    sessions: Mutex<Vec<SharedSession>>,
}

impl SessionSpace {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct SessionManager;

impl SessionManager {
    /// Bind `event` to a session per `rule`. Returns `None` only for the
    /// active-duplicate-refusal case (an existing, still-`activated` session
    /// matches the key).
    pub async fn acquire(
        space: &SessionSpace,
        rule: &SessionRule,
        event: &Event,
    ) -> Option<SharedSession> {
        match rule {
            SessionRule::None => {
                let mut session = Session::new(String::new(), event.clone());
                session.activated = true;
                Some(Arc::new(Mutex::new(session)))
            }
            SessionRule::Key(key_fn) => {
                let key = key_fn(event);
                let mut sessions = space.sessions.lock().await;
                for existing in sessions.iter() {
                    let mut guard = existing.lock().await;
                    if guard.key == key {
                        if guard.activated {
                            return None;
                        }
                        guard.activated = true;
                        guard.push_event(event.clone());
                        drop(guard);
                        return Some(existing.clone());
                    }
                }
                let mut session = Session::new(key, event.clone());
                session.activated = true;
                let shared = Arc::new(Mutex::new(session));
                sessions.push(shared.clone());
                Some(shared)
            }
        }
    }

    /// Clear `activated` so the next matching event can acquire this session.
    /// No-op for ephemeral sessions (nothing references them afterward anyway).
    pub async fn release(session: &SharedSession) {
        session.lock().await.activated = false;
    }

    /// Remove `session` from `space`, idempotently. No-op for ephemeral
    /// sessions, which were never registered.
    pub async fn destroy(space: &SessionSpace, session: &SharedSession) {
        {
            let mut guard = session.lock().await;
            if guard.expired {
                return;
            }
            guard.expired = true;
        }
        let mut sessions = space.sessions.lock().await;
        sessions.retain(|s| !Arc::ptr_eq(s, session));
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
