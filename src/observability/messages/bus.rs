// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the message bus and bus-driven triggers.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// # Log Level
/// `error!` - the caller sees `false`
pub struct PublishFailed<'a> {
    pub topic: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for PublishFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Could not publish to '{}': {}", self.topic, self.error)
    }
}

impl StructuredLog for PublishFailed<'_> {
    fn log(&self) {
        tracing::error!(topic = self.topic, error = %self.error, "{}", self);
    }
}

pub struct Subscribed<'a> {
    pub pattern: &'a str,
}

impl Display for Subscribed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Subscribed to '{}'", self.pattern)
    }
}

impl StructuredLog for Subscribed<'_> {
    fn log(&self) {
        tracing::info!(pattern = self.pattern, "{}", self);
    }
}

/// An inbound message on a trigger topic could not start a chain.
///
/// # Log Level
/// `warn!`
pub struct TriggerMessageRejected<'a> {
    pub topic: &'a str,
    pub reason: &'a str,
}

impl Display for TriggerMessageRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Ignoring message on '{}': {}", self.topic, self.reason)
    }
}

impl StructuredLog for TriggerMessageRejected<'_> {
    fn log(&self) {
        tracing::warn!(topic = self.topic, reason = self.reason, "{}", self);
    }
}

/// A bus message arrived on a topic no chain listens to; it is only logged.
///
/// # Log Level
/// `debug!`
pub struct UnboundTriggerTopic<'a> {
    pub topic: &'a str,
    pub trigger: &'a str,
}

impl Display for UnboundTriggerTopic<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No chain for trigger '{}'; message on '{}' logged only",
            self.trigger, self.topic
        )
    }
}

impl StructuredLog for UnboundTriggerTopic<'_> {
    fn log(&self) {
        tracing::debug!(topic = self.topic, trigger = self.trigger, "{}", self);
    }
}

/// # Log Level
/// `info!`
pub struct TriggeredChainFinished<'a> {
    pub chain_id: &'a str,
    pub result: &'a serde_json::Value,
}

impl Display for TriggeredChainFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Chain '{}' finished with result: {}", self.chain_id, self.result)
    }
}

impl StructuredLog for TriggeredChainFinished<'_> {
    fn log(&self) {
        tracing::info!(chain_id = self.chain_id, "{}", self);
    }
}
