// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for plugin dispatch.
//!
//! This module contains message types for logging events related to:
//! * Local plugin resolution and execution failures
//! * Remote invocation requests published to the bus
//! * Reply correlation (arrival, timeout, unclaimed replies)

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// A local plugin could not be resolved or raised an error.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct LocalDispatchFailed<'a> {
    pub plugin: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for LocalDispatchFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Local plugin '{}' failed, returning input unchanged: {}",
            self.plugin, self.error
        )
    }
}

impl StructuredLog for LocalDispatchFailed<'_> {
    fn log(&self) {
        tracing::error!(plugin = self.plugin, error = %self.error, "{}", self);
    }
}

/// An invocation request for a remote plugin went out on the bus.
///
/// # Log Level
/// `info!`
pub struct RemoteRequestPublished<'a> {
    pub address: &'a str,
    pub topic: &'a str,
    pub await_reply: bool,
}

impl Display for RemoteRequestPublished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let mode = if self.await_reply {
            "awaiting reply"
        } else {
            "fire-and-forget"
        };
        write!(
            f,
            "Sent request for remote plugin '{}' to '{}' ({})",
            self.address, self.topic, mode
        )
    }
}

impl StructuredLog for RemoteRequestPublished<'_> {
    fn log(&self) {
        tracing::info!(
            address = self.address,
            topic = self.topic,
            await_reply = self.await_reply,
            "{}", self
        );
    }
}

/// Remote dispatch failed before or while waiting; the input is returned unchanged.
///
/// # Log Level
/// `error!`
pub struct RemoteDispatchFailed<'a> {
    pub address: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for RemoteDispatchFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Remote plugin '{}' failed, returning input unchanged: {}",
            self.address, self.error
        )
    }
}

impl StructuredLog for RemoteDispatchFailed<'_> {
    fn log(&self) {
        tracing::error!(address = self.address, error = %self.error, "{}", self);
    }
}

/// The awaited reply did not arrive in time.
///
/// # Log Level
/// `warn!`
pub struct RemoteReplyTimedOut<'a> {
    pub key: &'a str,
    pub timeout: Duration,
}

impl Display for RemoteReplyTimedOut<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Timed out after {:?} waiting for reply on '{}'",
            self.timeout, self.key
        )
    }
}

impl StructuredLog for RemoteReplyTimedOut<'_> {
    fn log(&self) {
        tracing::warn!(
            key = self.key,
            timeout_ms = self.timeout.as_millis() as u64,
            "{}", self
        );
    }
}

/// # Log Level
/// `debug!`
pub struct RemoteReplyReceived<'a> {
    pub key: &'a str,
    pub waited: Duration,
}

impl Display for RemoteReplyReceived<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Reply on '{}' after {:?}", self.key, self.waited)
    }
}

impl StructuredLog for RemoteReplyReceived<'_> {
    fn log(&self) {
        tracing::debug!(
            key = self.key,
            waited_ms = self.waited.as_millis() as u64,
            "{}", self
        );
    }
}

/// A reply arrived with no dispatch waiting for it; kept for inspection only.
///
/// # Log Level
/// `debug!`
pub struct UnclaimedReply<'a> {
    pub key: &'a str,
}

impl Display for UnclaimedReply<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Reply on '{}' had no waiting request; stored for diagnostics", self.key)
    }
}

impl StructuredLog for UnclaimedReply<'_> {
    fn log(&self) {
        tracing::debug!(key = self.key, "{}", self);
    }
}

/// A message on a reply topic could not be used.
///
/// # Log Level
/// `warn!`
pub struct ReplyRejected<'a> {
    pub topic: &'a str,
    pub reason: &'a str,
}

impl Display for ReplyRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Ignoring reply on '{}': {}", self.topic, self.reason)
    }
}

impl StructuredLog for ReplyRejected<'_> {
    fn log(&self) {
        tracing::warn!(topic = self.topic, reason = self.reason, "{}", self);
    }
}

/// Severity requested by the `Log` plugin's `log_level` param.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl DataLogLevel {
    /// Unknown names fall back to `Info`.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "debug" => Self::Debug,
            "warning" | "warn" => Self::Warning,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }
}

/// Data seen by the `Log` plugin.
///
/// # Log Level
/// Chosen per step through [`DataLogLevel`]
pub struct DataReceived<'a> {
    pub plugin: &'a str,
    pub data: &'a serde_json::Value,
    pub level: DataLogLevel,
}

impl Display for DataReceived<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} received data: {}", self.plugin, self.data)
    }
}

impl StructuredLog for DataReceived<'_> {
    fn log(&self) {
        match self.level {
            DataLogLevel::Debug => tracing::debug!(plugin = self.plugin, "{}", self),
            DataLogLevel::Info => tracing::info!(plugin = self.plugin, "{}", self),
            DataLogLevel::Warning => tracing::warn!(plugin = self.plugin, "{}", self),
            DataLogLevel::Error => tracing::error!(plugin = self.plugin, "{}", self),
        }
    }
}

/// One field of the data, emitted when `log_details` is set.
///
/// # Log Level
/// `info!`
pub struct DataField<'a> {
    pub plugin: &'a str,
    pub key: &'a str,
    pub value: &'a serde_json::Value,
}

impl Display for DataField<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "  - {}: {}", self.key, self.value)
    }
}

impl StructuredLog for DataField<'_> {
    fn log(&self) {
        tracing::info!(plugin = self.plugin, key = self.key, "{}", self);
    }
}
