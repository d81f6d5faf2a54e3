// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup, queue wiring, and graceful/forced teardown.

use crate::action;
use crate::auth::{AuthChecker, NoticeAuthChecker, SU};
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::event::Event;
use crate::fuzzy::FuzzyTable;
use crate::parser::Parser;
use crate::registry::CommandRegistry;
use crate::responder::ResponseRouter;
use crate::transport::Transport;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// A periodic background job, run on its own interval independent of the
/// event-driven command path — e.g. session garbage collection.
pub type RoutineTask = Arc<dyn Fn() -> crate::registry::BoxFuture<'static, ()> + Send + Sync>;

#[derive(Default)]
pub struct RoutineSchedule {
    entries: Vec<(std::time::Duration, RoutineTask)>,
}

impl RoutineSchedule {
    pub fn register(&mut self, period: std::time::Duration, task: RoutineTask) {
        self.entries.push((period, task));
    }
}

/// Initialize the global structured logger from config. Uses `try_init` so
/// it is safe to call more than once, e.g. across integration tests.
pub fn init_tracing(config: &Config) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let _ = fmt::fmt().with_env_filter(filter).try_init();
}

/// Build the registry, wire the queues, connect the transport, and run until
/// `working_time` elapses or a shutdown signal arrives.
pub async fn run(config: Config, mut registry: CommandRegistry, routines: RoutineSchedule) -> Result<()> {
    let working = Arc::new(AtomicBool::new(true));
    let started_at = Instant::now();
    let registry_handle: Arc<OnceLock<Arc<CommandRegistry>>> = Arc::new(OnceLock::new());
    crate::commands::register_builtins(&mut registry, working.clone(), started_at, registry_handle.clone())?;
    registry.run_preload_hooks().await?;
    let registry = Arc::new(registry);
    let _ = registry_handle.set(registry.clone());

    let (event_tx, mut event_rx) = mpsc::channel::<Event>(config.work_queue_len);
    let (priority_event_tx, mut priority_event_rx) = mpsc::channel::<Event>(config.priority_queue_len);
    let (action_tx, action_rx) = mpsc::channel(config.action_queue_len());
    let (priority_action_tx, priority_action_rx) = mpsc::channel(config.priority_action_queue_len());

    let mut auth = AuthChecker::default();
    auth.owner = config.owner.clone();
    auth.super_users = config.super_user.iter().cloned().collect();
    auth.white_list = config.white_list.iter().cloned().collect();
    auth.black_list = config.black_list.iter().cloned().collect();
    auth.white_groups = config.white_group_list.iter().cloned().collect();
    let auth = Arc::new(auth);

    let mut notice_auth = NoticeAuthChecker::default();
    notice_auth.owner = config.owner.clone();
    notice_auth.super_users = config.super_user.iter().cloned().collect();
    notice_auth.white_list = config.white_list.iter().cloned().collect();
    notice_auth.black_list = config.black_list.iter().cloned().collect();
    let notice_auth = Arc::new(notice_auth);

    let parser = Arc::new(Parser::new(
        config.command_start.clone(),
        config.priority_command_start.clone(),
        config.command_sep.clone(),
    )?);

    let router = Arc::new(ResponseRouter::new(action_tx, priority_action_tx, config.kernel_timeout()));

    let dispatcher = Arc::new(Dispatcher {
        registry: registry.clone(),
        auth: auth.clone(),
        notice_auth: notice_auth.clone(),
        parser: parser.clone(),
        router: router.clone(),
        fuzzy: Arc::new(FuzzyTable::new()),
        fuzzy_fire_counts: Mutex::new(HashMap::new()),
        task_timeout: config.task_timeout(),
        working,
    });

    let cancel = CancellationToken::new();

    spawn_signal_handler(cancel.clone());

    let transport_cancel = cancel.clone();
    let transport_url = config.gateway_url();
    let transport_cooldown = config.cooldown_time();
    let transport_parser = parser.clone();
    let transport_auth = auth.clone();
    let transport = tokio::spawn(async move {
        let priority_auth_ok = move |event: &Event| transport_auth.check(SU, event);
        if let Err(err) = Transport::run(
            &transport_url,
            transport_cooldown,
            transport_parser,
            priority_auth_ok,
            event_tx,
            priority_event_tx,
            action_rx,
            priority_action_rx,
            transport_cancel.clone(),
        )
        .await
        {
            warn!(%err, "transport terminated");
            transport_cancel.cancel();
        }
    });

    let event_loop = {
        let dispatcher = dispatcher.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    event = priority_event_rx.recv() => {
                        match event {
                            Some(event) => dispatcher.handle_event(event).await,
                            None => break,
                        }
                    }
                    event = event_rx.recv() => {
                        match event {
                            Some(event) => dispatcher.handle_event(event).await,
                            None => break,
                        }
                    }
                }
            }
        })
    };

    let routine_handles: Vec<_> = routines
        .entries
        .into_iter()
        .map(|(period, task)| {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(period) => task().await,
                    }
                }
            })
        })
        .collect();

    if let Some(response) = router.wait(action::get_login_info(), false).await.await.ok() {
        info!(?response.data, "fetched bot identity");
    }

    match config.working_time() {
        Some(duration) => {
            tokio::select! {
                _ = tokio::time::sleep(duration) => info!("working_time elapsed, shutting down"),
                _ = cancel.cancelled() => {}
            }
        }
        None => cancel.cancelled().await,
    }
    cancel.cancel();

    transport.abort();
    event_loop.abort();
    for handle in routine_handles {
        handle.abort();
    }

    registry.run_dispose_hooks().await;
    Ok(())
}

fn spawn_signal_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()).ok();

        tokio::select! {
            _ = async { if let Some(s) = sigterm.as_mut() { s.recv().await } else { std::future::pending().await } } => {
                info!("received SIGTERM");
            }
            _ = async { if let Some(s) = sigint.as_mut() { s.recv().await } else { std::future::pending().await } } => {
                info!("received SIGINT");
            }
        }
        cancel.cancel();

        tokio::select! {
            _ = async { if let Some(s) = sigterm.as_mut() { s.recv().await } else { std::future::pending().await } } => {
                info!("received SIGTERM again, forcing exit");
            }
            _ = async { if let Some(s) = sigint.as_mut() { s.recv().await } else { std::future::pending().await } } => {
                info!("received SIGINT again, forcing exit");
            }
        }
        std::process::exit(130);
    });
}
