// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command table: descriptors, per-command runtime state, alias resolution.

use crate::auth::UserLevel;
use crate::context::CommandContext;
use crate::error::ErrorKind;
use crate::session::SessionRule;
use anyhow::{bail, Result};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
pub type Handler = Arc<dyn Fn(CommandContext) -> BoxFuture<'static, Result<(), ErrorKind>> + Send + Sync>;
pub type LifecycleHook = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Immutable-after-registration command metadata.
pub struct CommandDescriptor {
    pub name: String,
    pub aliases: HashSet<String>,
    pub required_level: UserLevel,
    pub lock: bool,
    pub cooldown: Duration,
    pub help: String,
    pub params_help: String,
    pub session_rule: SessionRule,
    pub handler: Handler,
    pub preload: Option<LifecycleHook>,
    pub dispose: Option<LifecycleHook>,
}

pub struct CommandDescriptorBuilder {
    name: String,
    aliases: HashSet<String>,
    required_level: UserLevel,
    lock: bool,
    cooldown: Duration,
    help: String,
    params_help: String,
    session_rule: SessionRule,
    preload: Option<LifecycleHook>,
    dispose: Option<LifecycleHook>,
}

impl CommandDescriptorBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        CommandDescriptorBuilder {
            name: name.into(),
            aliases: HashSet::new(),
            required_level: crate::auth::USER,
            lock: false,
            cooldown: Duration::ZERO,
            help: String::new(),
            params_help: String::new(),
            session_rule: SessionRule::None,
            preload: None,
            dispose: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.insert(alias.into());
        self
    }

    pub fn required_level(mut self, level: UserLevel) -> Self {
        self.required_level = level;
        self
    }

    pub fn lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }

    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn params_help(mut self, params_help: impl Into<String>) -> Self {
        self.params_help = params_help.into();
        self
    }

    pub fn session_rule(mut self, rule: SessionRule) -> Self {
        self.session_rule = rule;
        self
    }

    pub fn preload(mut self, hook: LifecycleHook) -> Self {
        self.preload = Some(hook);
        self
    }

    pub fn dispose(mut self, hook: LifecycleHook) -> Self {
        self.dispose = Some(hook);
        self
    }

    pub fn build(self, handler: Handler) -> CommandDescriptor {
        CommandDescriptor {
            name: self.name,
            aliases: self.aliases,
            required_level: self.required_level,
            lock: self.lock,
            cooldown: self.cooldown,
            help: self.help,
            params_help: self.params_help,
            session_rule: self.session_rule,
            handler,
            preload: self.preload,
            dispose: self.dispose,
        }
    }
}

/// Per-command mutable runtime state: the session-space and the
/// cooldown/lock bookkeeping the dispatcher enforces before invoking a
/// handler.
pub struct CommandState {
    pub space: crate::session::SessionSpace,
    pub call_lock: Mutex<()>,
    pub last_call: Mutex<Option<Instant>>,
}

impl Default for CommandState {
    fn default() -> Self {
        CommandState {
            space: crate::session::SessionSpace::new(),
            call_lock: Mutex::new(()),
            last_call: Mutex::new(None),
        }
    }
}

#[derive(Default)]
pub struct CommandRegistry {
    descriptors: HashMap<String, Arc<CommandDescriptor>>,
    aliases: HashMap<String, String>,
    states: HashMap<String, Arc<CommandState>>,
    system_names: HashSet<String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user-facing command. Fails fatally (per `WrongCommandFlag`)
    /// on a duplicate name or an alias collision with any existing command.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<()> {
        self.register_inner(descriptor, false)
    }

    /// Register a system command: one the dispatcher runs without an
    /// authorization check (`Dispatcher::execute_invocation`'s
    /// `is_system` short-circuit). No built-in currently needs this; error
    /// and notice replies go straight through `reply_to`/`router.throw`
    /// instead of a registered command. Kept for handlers that must be
    /// reachable even from a blacklisted sender.
    pub fn register_system(&mut self, descriptor: CommandDescriptor) -> Result<()> {
        let name = descriptor.name.clone();
        self.register_inner(descriptor, true)?;
        self.system_names.insert(name);
        Ok(())
    }

    fn register_inner(&mut self, descriptor: CommandDescriptor, _system: bool) -> Result<()> {
        if self.descriptors.contains_key(&descriptor.name) {
            bail!("duplicate command name: {}", descriptor.name);
        }
        if self.aliases.contains_key(&descriptor.name) {
            bail!("command name collides with an existing alias: {}", descriptor.name);
        }
        for alias in &descriptor.aliases {
            if self.aliases.contains_key(alias) || self.descriptors.contains_key(alias) {
                bail!("alias {alias:?} is already registered");
            }
        }
        let name = descriptor.name.clone();
        for alias in &descriptor.aliases {
            self.aliases.insert(alias.clone(), name.clone());
        }
        self.states.insert(name.clone(), Arc::new(CommandState::default()));
        self.descriptors.insert(name, Arc::new(descriptor));
        Ok(())
    }

    /// Resolve a token (name or alias) to its canonical command name.
    pub fn resolve(&self, token: &str) -> Result<&str, ErrorKind> {
        if let Some(d) = self.descriptors.get(token) {
            return Ok(d.name.as_str());
        }
        if let Some(name) = self.aliases.get(token) {
            return Ok(name.as_str());
        }
        Err(ErrorKind::UnknownCommand)
    }

    pub fn descriptor(&self, name: &str) -> Option<&Arc<CommandDescriptor>> {
        self.descriptors.get(name)
    }

    pub fn state(&self, name: &str) -> Option<&Arc<CommandState>> {
        self.states.get(name)
    }

    pub fn is_system(&self, name: &str) -> bool {
        self.system_names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CommandDescriptor>> {
        self.descriptors.values()
    }

    /// Run every registered preload hook, in registration order, awaiting
    /// each sequentially, as step 3 of kernel startup requires.
    pub async fn run_preload_hooks(&self) -> Result<()> {
        for descriptor in self.descriptors.values() {
            if let Some(hook) = &descriptor.preload {
                hook().await?;
            }
        }
        Ok(())
    }

    /// Run every registered dispose hook, in reverse registration order.
    pub async fn run_dispose_hooks(&self) {
        for descriptor in self.descriptors.values() {
            if let Some(hook) = &descriptor.dispose {
                if let Err(err) = hook().await {
                    tracing::warn!(command = %descriptor.name, %err, "dispose hook failed");
                }
            }
        }
    }
}
