// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in command handlers wired into the registry at startup.

mod echo;
mod help;
mod lifecycle;
mod poke;
mod status;

use crate::registry::CommandRegistry;
use anyhow::Result;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// Registers `echo`, `poke`, `help`, `status`, and `lifecycle`.
///
/// `registry_handle` is filled by the caller once the registry has been
/// wrapped in its final `Arc`, so `help`'s handler (which needs to list
/// every registered command) can see the table it is itself a part of.
pub fn register_builtins(
    registry: &mut CommandRegistry,
    working: Arc<AtomicBool>,
    started_at: Instant,
    registry_handle: Arc<OnceLock<Arc<CommandRegistry>>>,
) -> Result<()> {
    registry.register(echo::descriptor())?;
    registry.register(poke::descriptor())?;
    registry.register(help::descriptor(registry_handle))?;
    registry.register(status::descriptor(working.clone(), started_at))?;
    registry.register(lifecycle::descriptor(working))?;
    Ok(())
}
