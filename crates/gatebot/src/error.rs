// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Taxonomy of recoverable runtime errors surfaced to the dispatcher.
///
/// Fatal setup failures (bad config, transport connect failure) are not
/// represented here; callers in `kernel`/`config` return `anyhow::Result`
/// for those instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownCommand,
    UnexpectedEvent,
    CommandExecFailed(String),
    UnexpectedFormat,
    ArgumentError,
    Timeout,
    QueueFull,
    TransportClosed,
}

impl ErrorKind {
    /// Machine-readable tag, stable across versions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "UNKNOWN_COMMAND",
            Self::UnexpectedEvent => "UNEXPECTED_EVENT",
            Self::CommandExecFailed(_) => "COMMAND_EXEC_FAILED",
            Self::UnexpectedFormat => "UNEXPECTED_FORMAT",
            Self::ArgumentError => "ARGUMENT_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::QueueFull => "QUEUE_FULL",
            Self::TransportClosed => "TRANSPORT_CLOSED",
        }
    }

    /// True if this error should produce a user-visible echo from the dispatcher.
    pub fn user_visible(&self) -> bool {
        matches!(
            self,
            Self::CommandExecFailed(_) | Self::ArgumentError | Self::Timeout | Self::QueueFull
        )
    }

    /// Text echoed back to the originating user, if `user_visible()`.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::CommandExecFailed(msg) => Some(msg.clone()),
            Self::ArgumentError => Some("bad arguments".to_owned()),
            Self::Timeout => Some("timed out, giving up".to_owned()),
            Self::QueueFull => Some("too many tasks, try later".to_owned()),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandExecFailed(msg) => write!(f, "{}: {msg}", self.as_str()),
            other => f.write_str(other.as_str()),
        }
    }
}

impl std::error::Error for ErrorKind {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
