// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for chain run lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Trigger matching (found / not found)
//! * Chain run lifecycle (start, completion)
//! * Per-step dispatch and fail-open pass-through
//! * Detached (background) runs

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A chain matched a trigger and is about to run.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use morris::observability::messages::engine::ChainRunStarted;
///
/// let msg = ChainRunStarted {
///     chain_id: "sensor_chain",
///     trigger: "webhook:sensor",
///     step_count: 3,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ChainRunStarted<'a> {
    pub chain_id: &'a str,
    pub trigger: &'a str,
    pub step_count: usize,
}

impl Display for ChainRunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Running chain '{}' for trigger '{}': {} steps",
            self.chain_id, self.trigger, self.step_count
        )
    }
}

impl StructuredLog for ChainRunStarted<'_> {
    fn log(&self) {
        tracing::info!(
            chain_id = self.chain_id,
            trigger = self.trigger,
            step_count = self.step_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "chain_run",
            span_name = name,
            chain_id = self.chain_id,
            trigger = self.trigger,
            step_count = self.step_count,
        )
    }
}

/// A chain finished all of its steps.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ChainRunCompleted<'a> {
    pub chain_id: &'a str,
    pub trigger: &'a str,
    pub failed_steps: usize,
    pub duration: Duration,
}

impl Display for ChainRunCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Chain '{}' finished for trigger '{}' in {:?} ({} steps passed through)",
            self.chain_id, self.trigger, self.duration, self.failed_steps
        )
    }
}

impl StructuredLog for ChainRunCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            chain_id = self.chain_id,
            trigger = self.trigger,
            failed_steps = self.failed_steps,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// No chain is bound to the trigger; the payload is returned unchanged.
///
/// # Log Level
/// `warn!` - Input was accepted but nothing ran
pub struct NoChainForTrigger<'a> {
    pub trigger: &'a str,
}

impl Display for NoChainForTrigger<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "No chain found for trigger '{}'", self.trigger)
    }
}

impl StructuredLog for NoChainForTrigger<'_> {
    fn log(&self) {
        tracing::warn!(trigger = self.trigger, "{}", self);
    }
}

/// A step is being dispatched.
///
/// # Log Level
/// `info!`
pub struct StepStarted<'a> {
    pub chain_id: &'a str,
    /// 1-based, as shown to operators.
    pub step_number: usize,
    pub plugin_ref: &'a str,
    pub remote: bool,
}

impl Display for StepStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let location = if self.remote { "remote" } else { "local" };
        write!(
            f,
            "Chain '{}' step {}: running {} plugin '{}'",
            self.chain_id, self.step_number, location, self.plugin_ref
        )
    }
}

impl StructuredLog for StepStarted<'_> {
    fn log(&self) {
        tracing::info!(
            chain_id = self.chain_id,
            step_number = self.step_number,
            plugin_ref = self.plugin_ref,
            remote = self.remote,
            "{}", self
        );
    }
}

/// A step failed and its input was carried forward unchanged.
///
/// # Log Level
/// `error!` - Failure requiring attention; the chain keeps running
///
/// # Example
/// ```
/// use morris::observability::messages::engine::StepPassedThrough;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "plugin exploded");
/// let msg = StepPassedThrough {
///     chain_id: "sensor_chain",
///     step_number: 2,
///     plugin_ref: "Uppercase",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct StepPassedThrough<'a> {
    pub chain_id: &'a str,
    pub step_number: usize,
    pub plugin_ref: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for StepPassedThrough<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Chain '{}' step {} (plugin '{}') failed, passing data through: {}",
            self.chain_id, self.step_number, self.plugin_ref, self.error
        )
    }
}

impl StructuredLog for StepPassedThrough<'_> {
    fn log(&self) {
        tracing::error!(
            chain_id = self.chain_id,
            step_number = self.step_number,
            plugin_ref = self.plugin_ref,
            error = %self.error,
            "{}", self
        );
    }
}

/// A run was handed to a background task.
///
/// # Log Level
/// `info!`
pub struct DetachedRunScheduled<'a> {
    pub trigger: &'a str,
}

impl Display for DetachedRunScheduled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Scheduled background chain run for trigger '{}'", self.trigger)
    }
}

impl StructuredLog for DetachedRunScheduled<'_> {
    fn log(&self) {
        tracing::info!(trigger = self.trigger, "{}", self);
    }
}

/// The runtime finished wiring its components.
///
/// # Log Level
/// `info!`
pub struct CoreStarted<'a> {
    pub chains: usize,
    pub plugins: usize,
    pub trigger_patterns: &'a [String],
}

impl Display for CoreStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Morris core started: {} chains, {} registered plugins, listening on {:?}",
            self.chains, self.plugins, self.trigger_patterns
        )
    }
}

impl StructuredLog for CoreStarted<'_> {
    fn log(&self) {
        tracing::info!(
            chains = self.chains,
            plugins = self.plugins,
            "{}", self
        );
    }
}

/// # Log Level
/// `info!`
pub struct CoreStopped;

impl Display for CoreStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Morris core stopped")
    }
}

impl StructuredLog for CoreStopped {
    fn log(&self) {
        tracing::info!("{}", self);
    }
}
