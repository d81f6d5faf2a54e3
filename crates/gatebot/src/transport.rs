// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single bidirectional connection to the gateway.
//!
//! A dropped gateway connection here is terminal: it trips the kernel's
//! cancellation token rather than reconnecting with backoff.

use crate::action::Action;
use crate::event::Event;
use crate::parser::Parser;
use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub struct Transport;

impl Transport {
    /// Connect to the gateway, discard the hello frame, and run the inbound
    /// and outbound loops until `cancel` trips or the peer closes.
    ///
    /// `event_tx`/`priority_event_tx` receive decoded inbound events, already
    /// split by the priority-bypass rule (see [`classify_priority`]).
    /// `action_rx`/`priority_action_rx` each get their own outbound loop
    /// sharing the one sink under a mutex, so a priority action is never
    /// stuck behind the normal loop's cooldown sleep.
    pub async fn run(
        url: &str,
        cooldown: Duration,
        parser: Arc<Parser>,
        priority_auth_ok: impl Fn(&Event) -> bool + Send + Sync + 'static,
        event_tx: mpsc::Sender<Event>,
        priority_event_tx: mpsc::Sender<Event>,
        mut action_rx: mpsc::Receiver<Action>,
        mut priority_action_rx: mpsc::Receiver<Action>,
        cancel: CancellationToken,
    ) -> Result<()> {
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .with_context(|| format!("connecting to gateway at {url}"))?;
        info!(url, "connected to gateway");
        let (write, mut read) = ws.split();
        let write = Arc::new(Mutex::new(write));

        // Discard the gateway's hello frame.
        let _ = read.next().await;

        let inbound = {
            let cancel = cancel.clone();
            async move {
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        frame = read.next() => {
                            match frame {
                                Some(Ok(Message::Text(text))) => {
                                    if text.is_empty() {
                                        continue;
                                    }
                                    handle_inbound_text(
                                        &text,
                                        &parser,
                                        &priority_auth_ok,
                                        &event_tx,
                                        &priority_event_tx,
                                    )
                                    .await;
                                }
                                Some(Ok(_)) => continue,
                                Some(Err(err)) => {
                                    warn!(%err, "gateway connection error");
                                    cancel.cancel();
                                    break;
                                }
                                None => {
                                    warn!("gateway closed the connection");
                                    cancel.cancel();
                                    break;
                                }
                            }
                        }
                    }
                }
            }
        };

        // Two independent writer loops share the one sink under a mutex.
        // The priority loop never sleeps, so a priority action can be sent
        // the instant it arrives even while the normal loop is parked in
        // its cooldown sleep.
        let priority_outbound = {
            let cancel = cancel.clone();
            let write = write.clone();
            async move {
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        action = priority_action_rx.recv() => {
                            match action {
                                Some(action) => send_action(&mut *write.lock().await, &action).await,
                                None => break,
                            }
                        }
                    }
                }
            }
        };

        let outbound = {
            let cancel = cancel.clone();
            async move {
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        action = action_rx.recv() => {
                            match action {
                                Some(action) => {
                                    send_action(&mut *write.lock().await, &action).await;
                                    tokio::time::sleep(cooldown).await;
                                }
                                None => break,
                            }
                        }
                    }
                }
            }
        };

        tokio::join!(inbound, outbound, priority_outbound);
        Ok(())
    }
}

async fn handle_inbound_text(
    text: &str,
    parser: &Parser,
    priority_auth_ok: &(impl Fn(&Event) -> bool + Send + Sync),
    event_tx: &mpsc::Sender<Event>,
    priority_event_tx: &mpsc::Sender<Event>,
) {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(err) => {
            warn!(%err, "malformed inbound frame, dropping");
            return;
        }
    };
    let event = match Event::from_frame(&value) {
        Ok(Some(event)) => event,
        Ok(None) => return,
        Err(err) => {
            debug!(%err, "unrecognized inbound frame, dropping");
            return;
        }
    };

    if classify_priority(&event, parser, priority_auth_ok) {
        let _ = priority_event_tx.send(event).await;
        return;
    }

    if event_tx.capacity() == 0 {
        let full_event = Event::queue_full(event);
        let _ = priority_event_tx.send(full_event).await;
        return;
    }

    if event_tx.send(event).await.is_err() {
        warn!("event queue closed");
    }
}

/// True iff `event` should bypass the normal event queue: it is a priority
/// text per the parser *and* its sender is SU-or-above.
fn classify_priority(event: &Event, parser: &Parser, priority_auth_ok: &(impl Fn(&Event) -> bool + Send + Sync)) -> bool {
    let Some(msg) = event.message() else { return false };
    if msg.text.is_empty() {
        return false;
    }
    parser.is_priority(&msg.text) && priority_auth_ok(event)
}

async fn send_action<S>(write: &mut S, action: &Action)
where
    S: SinkExt<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let Ok(text) = serde_json::to_string(action) else {
        warn!(action_type = action.action_type, "could not encode action, dropping");
        return;
    };
    if let Err(err) = write.send(Message::Text(text.into())).await {
        error!(%err, "failed to send action to gateway");
    }
}
