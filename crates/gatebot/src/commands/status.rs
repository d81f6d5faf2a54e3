// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `status` — reports working-status and uptime.

use crate::registry::{CommandDescriptor, CommandDescriptorBuilder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub fn descriptor(working: Arc<AtomicBool>, started_at: Instant) -> CommandDescriptor {
    CommandDescriptorBuilder::new("status")
        .help("reports working-status and uptime")
        .build(Arc::new(move |ctx| {
            let working = working.clone();
            Box::pin(async move {
                let status = if working.load(Ordering::SeqCst) { "working" } else { "paused" };
                let uptime = started_at.elapsed().as_secs();
                ctx.reply(&format!("{status}, up {uptime}s")).await;
                Ok(())
            })
        }))
}
