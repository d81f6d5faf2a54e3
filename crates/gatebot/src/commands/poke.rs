// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `poke` — pokes back whoever triggered it: the sender of an explicit
//! `~poke` call, or the operator of a self-poke notice.

use crate::action;
use crate::auth::USER;
use crate::event::EventKind;
use crate::registry::{CommandDescriptor, CommandDescriptorBuilder};
use std::sync::Arc;

pub fn descriptor() -> CommandDescriptor {
    CommandDescriptorBuilder::new("poke")
        .alias("戳")
        .required_level(USER)
        .help("pokes you back")
        .build(Arc::new(|ctx| {
            Box::pin(async move {
                let (user_id, group_id) = match &ctx.event.kind {
                    EventKind::Notice(notice) => {
                        (notice.operator_id.clone(), notice.group_id.clone())
                    }
                    _ => (ctx.event.sender_id().map(str::to_owned), ctx.event.group_id().map(str::to_owned)),
                };
                if let Some(user_id) = user_id {
                    ctx.throw(action::poke(&user_id, group_id.as_deref())).await;
                }
                Ok(())
            })
        }))
}
