// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use thiserror::Error;

/// Raised by a plugin's `process` when it cannot handle its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{plugin}: {message}")]
pub struct ProcessingError {
    pub plugin: String,
    pub message: String,
}

impl ProcessingError {
    pub fn new(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            message: message.into(),
        }
    }
}

/// Plugin resolution or execution failure.
///
/// Never escapes the dispatchers; the step that produced it passes its input through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("no local plugin named '{name}'")]
    UnknownPlugin { name: String },

    #[error("plugin failed: {0}")]
    Processing(#[from] ProcessingError),

    #[error("plugin '{name}' panicked")]
    PluginPanicked { name: String },

    #[error("malformed remote address '{address}', expected remote:<device>:<plugin>")]
    MalformedAddress { address: String },

    #[error("no message bus configured for remote plugin '{address}'")]
    BusUnavailable { address: String },

    #[error("could not encode request for '{address}': {reason}")]
    Encode { address: String, reason: String },

    #[error("publish to '{topic}' failed")]
    PublishFailed { topic: String },

    #[error("no reply on '{key}' within {timeout:?}")]
    Timeout { key: String, timeout: Duration },

    #[error("reply slot for '{key}' was dropped before a reply arrived")]
    ReplyChannelClosed { key: String },
}
