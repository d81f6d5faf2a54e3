// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration, resolved in ascending precedence: built-in defaults, an
//! optional TOML overlay file, environment variables, then CLI flags.

use anyhow::{bail, Context, Result};
use clap::Parser as ClapParser;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, ClapParser)]
#[command(name = "gatebot", version, about)]
pub struct Config {
    /// Gateway websocket host.
    #[arg(long, env = "GATEBOT_CONNECT_HOST", default_value = "localhost")]
    pub connect_host: String,

    /// Gateway websocket port.
    #[arg(long, env = "GATEBOT_CONNECT_PORT", default_value_t = 8080)]
    pub connect_port: u16,

    /// Normal event queue depth; the action queue is sized at 3x this.
    #[arg(long, env = "GATEBOT_WORK_QUEUE_LEN", default_value_t = 20)]
    pub work_queue_len: usize,

    /// Priority event queue depth; the priority action queue is sized at 3x this.
    #[arg(long, env = "GATEBOT_PRIORITY_QUEUE_LEN", default_value_t = 10)]
    pub priority_queue_len: usize,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "GATEBOT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Per-handler execution timeout, in seconds.
    #[arg(long, env = "GATEBOT_TASK_TIMEOUT", default_value_t = 15)]
    pub task_timeout_secs: u64,

    /// Minimum spacing between outbound actions, in seconds.
    #[arg(long, env = "GATEBOT_COOLDOWN_TIME", default_value_t = 1)]
    pub cooldown_time_secs: u64,

    /// Bound on how long a queue put may block before being treated as full, in seconds.
    #[arg(long, env = "GATEBOT_KERNEL_TIMEOUT", default_value_t = 4)]
    pub kernel_timeout_secs: u64,

    /// Total run time, in seconds. `<= 0` means unbounded.
    #[arg(long, env = "GATEBOT_WORKING_TIME", default_value_t = -1)]
    pub working_time_secs: i64,

    /// The single account with OWNER-level authorization.
    #[arg(long, env = "GATEBOT_OWNER")]
    pub owner: Option<String>,

    /// Display name the bot uses for itself.
    #[arg(long, env = "GATEBOT_BOT_NAME", default_value = "gatebot")]
    pub bot_name: String,

    /// Command start prefixes.
    #[arg(long = "command-start", env = "GATEBOT_COMMAND_START", value_delimiter = ',', default_value = "~")]
    pub command_start: Vec<String>,

    /// Command argument separators.
    #[arg(long = "command-sep", env = "GATEBOT_COMMAND_SEP", value_delimiter = ',', default_value = "#")]
    pub command_sep: Vec<String>,

    /// Priority command start prefixes, usable only by SU-and-above senders.
    #[arg(long = "priority-command-start", env = "GATEBOT_PRIORITY_COMMAND_START", value_delimiter = ',')]
    pub priority_command_start: Vec<String>,

    #[arg(skip)]
    pub super_user: Vec<String>,
    #[arg(skip)]
    pub white_list: Vec<String>,
    #[arg(skip)]
    pub black_list: Vec<String>,
    #[arg(skip)]
    pub white_group_list: Vec<String>,

    /// Path to an optional TOML overlay file. Created with defaults and the
    /// process exits non-zero if it does not yet exist.
    #[arg(long, env = "GATEBOT_CONFIG")]
    pub config_path: Option<PathBuf>,
}

/// Shape of the optional TOML overlay; every field is optional so the file
/// may set only what it needs to override.
#[derive(Debug, Default, Deserialize)]
struct Overlay {
    connect_host: Option<String>,
    connect_port: Option<u16>,
    work_queue_len: Option<usize>,
    priority_queue_len: Option<usize>,
    log_level: Option<String>,
    task_timeout_secs: Option<u64>,
    cooldown_time_secs: Option<u64>,
    kernel_timeout_secs: Option<u64>,
    working_time_secs: Option<i64>,
    owner: Option<String>,
    bot_name: Option<String>,
    command_start: Option<Vec<String>>,
    command_sep: Option<Vec<String>>,
    priority_command_start: Option<Vec<String>>,
    super_user: Option<Vec<String>>,
    white_list: Option<Vec<String>>,
    black_list: Option<Vec<String>>,
    white_group_list: Option<Vec<String>>,
}

const DEFAULT_OVERLAY_TEXT: &str = r##"# gatebot configuration overlay.
# Uncommented values here take precedence over built-in defaults but are
# themselves overridden by environment variables and CLI flags.

# connect_host = "localhost"
# connect_port = 8080
# owner = "123456"
# super_user = []
# white_group_list = []
# command_start = ["~"]
# command_sep = ["#"]
"##;

impl Config {
    /// Apply the optional TOML overlay named by `config_path`, if set.
    ///
    /// If the path is set but the file does not exist, it is created with
    /// [`DEFAULT_OVERLAY_TEXT`] and this returns an error so the caller can
    /// log and exit, mirroring the create-on-missing startup behavior this
    /// was adapted from.
    pub fn apply_overlay(mut self) -> Result<Self> {
        let Some(path) = self.config_path.clone() else { return Ok(self) };
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating config directory {}", parent.display()))?;
            }
            std::fs::write(&path, DEFAULT_OVERLAY_TEXT)
                .with_context(|| format!("writing default config to {}", path.display()))?;
            bail!(
                "no config file found at {}; a default one has been written, fill it in and restart",
                path.display()
            );
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let overlay: Overlay =
            toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))?;

        if let Some(v) = overlay.connect_host {
            self.connect_host = v;
        }
        if let Some(v) = overlay.connect_port {
            self.connect_port = v;
        }
        if let Some(v) = overlay.work_queue_len {
            self.work_queue_len = v;
        }
        if let Some(v) = overlay.priority_queue_len {
            self.priority_queue_len = v;
        }
        if let Some(v) = overlay.log_level {
            self.log_level = v;
        }
        if let Some(v) = overlay.task_timeout_secs {
            self.task_timeout_secs = v;
        }
        if let Some(v) = overlay.cooldown_time_secs {
            self.cooldown_time_secs = v;
        }
        if let Some(v) = overlay.kernel_timeout_secs {
            self.kernel_timeout_secs = v;
        }
        if let Some(v) = overlay.working_time_secs {
            self.working_time_secs = v;
        }
        if overlay.owner.is_some() {
            self.owner = overlay.owner;
        }
        if let Some(v) = overlay.bot_name {
            self.bot_name = v;
        }
        if let Some(v) = overlay.command_start {
            self.command_start = v;
        }
        if let Some(v) = overlay.command_sep {
            self.command_sep = v;
        }
        if let Some(v) = overlay.priority_command_start {
            self.priority_command_start = v;
        }
        if let Some(v) = overlay.super_user {
            self.super_user = v;
        }
        if let Some(v) = overlay.white_list {
            self.white_list = v;
        }
        if let Some(v) = overlay.black_list {
            self.black_list = v;
        }
        if let Some(v) = overlay.white_group_list {
            self.white_group_list = v;
        }
        Ok(self)
    }

    /// Validate cross-field invariants not expressible via clap alone.
    pub fn validate(&self) -> Result<()> {
        if self.work_queue_len == 0 {
            bail!("work_queue_len must be nonzero");
        }
        if self.priority_queue_len == 0 {
            bail!("priority_queue_len must be nonzero");
        }
        if self.command_start.is_empty() {
            bail!("command_start must be non-empty");
        }
        if self.command_sep.is_empty() {
            bail!("command_sep must be non-empty");
        }
        Ok(())
    }

    pub fn action_queue_len(&self) -> usize {
        self.work_queue_len * 3
    }

    pub fn priority_action_queue_len(&self) -> usize {
        self.priority_queue_len * 3
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    pub fn cooldown_time(&self) -> Duration {
        Duration::from_secs(self.cooldown_time_secs)
    }

    pub fn kernel_timeout(&self) -> Duration {
        Duration::from_secs(self.kernel_timeout_secs)
    }

    /// `<= 0` means unbounded.
    pub fn working_time(&self) -> Option<Duration> {
        if self.working_time_secs <= 0 {
            None
        } else {
            Some(Duration::from_secs(self.working_time_secs as u64))
        }
    }

    pub fn gateway_url(&self) -> String {
        format!("ws://{}:{}/", self.connect_host, self.connect_port)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
