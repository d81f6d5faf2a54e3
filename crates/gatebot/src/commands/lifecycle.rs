// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `lifecycle` — toggles working-status. Exempt from the not-working gate
//! in dispatch (the dispatcher special-cases this command's canonical name).

use crate::auth::WHITE;
use crate::registry::{CommandDescriptor, CommandDescriptorBuilder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub fn descriptor(working: Arc<AtomicBool>) -> CommandDescriptor {
    CommandDescriptorBuilder::new("lifecycle")
        .required_level(WHITE)
        .help("toggles working-status on or off")
        .params_help("[on|off]")
        .build(Arc::new(move |ctx| {
            let working = working.clone();
            Box::pin(async move {
                let desired = match ctx.args.first().map(String::as_str) {
                    Some("on") => true,
                    Some("off") => false,
                    _ => !working.load(Ordering::SeqCst),
                };
                working.store(desired, Ordering::SeqCst);
                ctx.reply(if desired { "now working" } else { "now paused" }).await;
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
    async fn toggles_working_flag_with_no_args() {
        let (action_tx, mut action_rx) = mpsc::channel(8);
        let (prior_tx, _prior_rx) = mpsc::channel(8);
        let router = Arc::new(ResponseRouter::new(action_tx, prior_tx, Duration::from_millis(100)));
        let working = Arc::new(AtomicBool::new(true));
        let descriptor = descriptor(working.clone());
        let ctx = CommandContext::new(event(), vec![], None, router);
        (descriptor.handler)(ctx).await.unwrap();
        assert!(!working.load(Ordering::SeqCst));
        let sent = action_rx.recv().await.unwrap();
        assert!(sent.params["message"].as_str().unwrap().contains("paused"));
    }

    #[tokio::test]
    async fn explicit_on_sets_working_true() {
        let (action_tx, _action_rx) = mpsc::channel(8);
        let (prior_tx, _prior_rx) = mpsc::channel(8);
        let router = Arc::new(ResponseRouter::new(action_tx, prior_tx, Duration::from_millis(100)));
        let working = Arc::new(AtomicBool::new(false));
        let descriptor = descriptor(working.clone());
        let ctx = CommandContext::new(event(), vec!["on".into()], None, router);
        (descriptor.handler)(ctx).await.unwrap();
        assert!(working.load(Ordering::SeqCst));
    }
}
