// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A minimal gateway double for exercising the real websocket transport
//! end-to-end: accepts one connection, sends the expected hello frame, and
//! exposes channels for pushing inbound frames and observing outbound ones.

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// A running mock gateway. Dropping it stops accepting new connections but
/// does not close an already-established one; tests rely on `working_time`
/// or the gatebot binary's own shutdown path to end the run.
pub struct MockGateway {
    pub port: u16,
    pub inbound: mpsc::Sender<serde_json::Value>,
    pub outbound: mpsc::Receiver<serde_json::Value>,
}

impl MockGateway {
    /// Bind a free port, accept exactly one connection, send the hello
    /// frame, then pump `inbound` frames out to the peer and decoded peer
    /// frames into `outbound`.
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await.context("binding mock gateway listener")?;
        let port = listener.local_addr()?.port();

        let (inbound_tx, mut inbound_rx) = mpsc::channel::<serde_json::Value>(16);
        let (outbound_tx, outbound_rx) = mpsc::channel::<serde_json::Value>(16);

        tokio::spawn(async move {
            let Ok((stream, _)) = listener.accept().await else { return };
            let Ok(ws) = tokio_tungstenite::accept_async(stream).await else { return };
            let (mut write, mut read) = ws.split();

            let hello = serde_json::json!({
                "post_type": "meta_event",
                "meta_event_type": "lifecycle",
                "sub_type": "connect",
                "self_id": 1,
                "time": 0,
            });
            if write.send(Message::Text(hello.to_string().into())).await.is_err() {
                return;
            }

            loop {
                tokio::select! {
                    frame = inbound_rx.recv() => {
                        match frame {
                            Some(frame) => {
                                if write.send(Message::Text(frame.to_string().into())).await.is_err() {
                                    break;
                                }
                            }
                            None => break,
                        }
                    }
                    frame = read.next() => {
                        match frame {
                            Some(Ok(Message::Text(text))) => {
                                if let Ok(value) = serde_json::from_str(&text) {
                                    if outbound_tx.send(value).await.is_err() {
                                        break;
                                    }
                                }
                            }
                            Some(Ok(_)) => continue,
                            _ => break,
                        }
                    }
                }
            }
        });

        Ok(MockGateway { port, inbound: inbound_tx, outbound: outbound_rx })
    }

    /// A private-message event frame from `user_id` with the given text.
    pub fn private_message(user_id: &str, text: &str) -> serde_json::Value {
        serde_json::json!({
            "post_type": "message",
            "message_type": "private",
            "sub_type": "friend",
            "self_id": 1,
            "time": 0,
            "message_id": 1,
            "user_id": user_id,
            "message": text,
            "sender": { "user_id": user_id },
        })
    }
}
