// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response correlation by echo id.

use crate::action::Action;
use crate::event::{Event, EventKind, ResponsePayload};
use crate::snowflake::Snowflake;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, warn};

type PendingTable = Mutex<HashMap<String, oneshot::Sender<ResponsePayload>>>;

/// Owns the pending-response table and the two outbound action queues.
pub struct ResponseRouter {
    pending: PendingTable,
    snowflake: Snowflake,
    action_tx: mpsc::Sender<Action>,
    prior_action_tx: mpsc::Sender<Action>,
    kernel_timeout: Duration,
}

impl ResponseRouter {
    pub fn new(
        action_tx: mpsc::Sender<Action>,
        prior_action_tx: mpsc::Sender<Action>,
        kernel_timeout: Duration,
    ) -> Self {
        ResponseRouter {
            pending: Mutex::new(HashMap::new()),
            snowflake: Snowflake::new(0, 0),
            action_tx,
            prior_action_tx,
            kernel_timeout,
        }
    }

    /// Place `action` on the corresponding outbound queue. If the queue is
    /// full, wait up to `kernel_timeout` then abandon with a warning.
    pub async fn throw(&self, action: Action, priority: bool) {
        let tx = if priority { &self.prior_action_tx } else { &self.action_tx };
        match tokio::time::timeout(self.kernel_timeout, tx.send(action)).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => warn!("action queue closed; dropping action"),
            Err(_) => warn!("action queue full past kernel_timeout; abandoning action"),
        }
    }

    /// Emit `action` (assigning it a fresh echo id) and return a receiver
    /// that resolves when the matching response frame arrives.
    pub async fn wait(&self, mut action: Action, priority: bool) -> oneshot::Receiver<ResponsePayload> {
        let echo_id = self.snowflake.next_id();
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(echo_id.clone(), tx);
        action = action.with_echo(echo_id);
        self.throw(action, priority).await;
        rx
    }

    /// Resolve or discard one response event. Intended to be driven in a
    /// loop fed by the transport's response stream.
    pub async fn handle_response(&self, event: Event) {
        let EventKind::Response(response) = event.kind else {
            debug!("handle_response called with a non-response event; ignoring");
            return;
        };
        let Some(echo_id) = response.echo.clone() else {
            debug!("response has no echo id; unsolicited ack, dropping");
            return;
        };
        let mut pending = self.pending.lock().await;
        match pending.remove(&echo_id) {
            Some(tx) => {
                let _ = tx.send(response);
            }
            None => warn!(echo_id, "response matched no pending request; discarding"),
        }
    }

    #[cfg(test)]
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}
