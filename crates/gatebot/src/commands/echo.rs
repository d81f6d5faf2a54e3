// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `echo` — a plain user-level command that repeats its arguments back.
//! Distinct from the auth-bypassing error/notice replies the dispatcher
//! sends directly via `reply_to`, which never go through this descriptor.

use crate::auth::USER;
use crate::registry::{CommandDescriptor, CommandDescriptorBuilder};
use std::sync::Arc;

pub fn descriptor() -> CommandDescriptor {
    CommandDescriptorBuilder::new("echo")
        .required_level(USER)
        .help("repeats its arguments back")
        .params_help("<text...>")
        .build(Arc::new(|ctx| {
            Box::pin(async move {
                ctx.reply(&ctx.args.join(" ")).await;
                Ok(())
            })
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CommandContext;
    use crate::event::{EventKind, MessagePayload, MessageSubtype, Sender};
    use crate::responder::ResponseRouter;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn event() -> crate::event::Event {
        crate::event::Event {
            time: 0,
            self_id: "1".into(),
            kind: EventKind::Message(MessagePayload {
                message_id: None,
                segments: vec![],
                text: String::new(),
                sender: Sender { user_id: "1".into(), nickname: None, role: None, anonymous: false },
                group_id: None,
                subtype: MessageSubtype::Private,
            }),
        }
    }

    #[tokio::test]
    async fn joins_args_with_spaces() {
        let (action_tx, mut action_rx) = mpsc::channel(8);
        let (prior_tx, _prior_rx) = mpsc::channel(8);
        let router = Arc::new(ResponseRouter::new(action_tx, prior_tx, Duration::from_millis(100)));
        let ctx = CommandContext::new(event(), vec!["hello".into(), "world".into()], None, router);
        (descriptor().handler)(ctx).await.unwrap();
        let sent = action_rx.recv().await.unwrap();
        assert_eq!(sent.params["message"], serde_json::json!("hello world"));
    }
}
