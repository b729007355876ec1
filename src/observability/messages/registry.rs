// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the plugin registry.
//!
//! This module contains message types for logging events related to:
//! * Registration, unregistration and status updates
//! * Announce ingestion from the bus
//! * The liveness monitor
//! * Registry persistence

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// A plugin record was created or replaced.
///
/// # Log Level
/// `info!`
///
/// # Example
/// ```
/// use morris::observability::messages::registry::PluginRegistered;
///
/// let msg = PluginRegistered {
///     name: "TempSensor",
///     kind: "remote",
///     source: "announce",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct PluginRegistered<'a> {
    pub name: &'a str,
    pub kind: &'a str,
    /// `announce` or `api`
    pub source: &'a str,
}

impl Display for PluginRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered {} plugin '{}' (via {})",
            self.kind, self.name, self.source
        )
    }
}

impl StructuredLog for PluginRegistered<'_> {
    fn log(&self) {
        tracing::info!(
            plugin = self.name,
            kind = self.kind,
            source = self.source,
            "{}", self
        );
    }
}

pub struct PluginUnregistered<'a> {
    pub name: &'a str,
}

impl Display for PluginUnregistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Removed plugin '{}'", self.name)
    }
}

impl StructuredLog for PluginUnregistered<'_> {
    fn log(&self) {
        tracing::info!(plugin = self.name, "{}", self);
    }
}

/// An operation named a plugin the registry does not know.
///
/// # Log Level
/// `warn!`
pub struct UnknownPlugin<'a> {
    pub name: &'a str,
    pub operation: &'a str,
}

impl Display for UnknownPlugin<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cannot {} plugin '{}': not registered",
            self.operation, self.name
        )
    }
}

impl StructuredLog for UnknownPlugin<'_> {
    fn log(&self) {
        tracing::warn!(plugin = self.name, operation = self.operation, "{}", self);
    }
}

pub struct PluginStatusUpdated<'a> {
    pub name: &'a str,
    pub status: &'a str,
}

impl Display for PluginStatusUpdated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Plugin '{}' status is now '{}'", self.name, self.status)
    }
}

impl StructuredLog for PluginStatusUpdated<'_> {
    fn log(&self) {
        tracing::info!(plugin = self.name, status = self.status, "{}", self);
    }
}

/// A status update was refused at the authorization boundary.
///
/// # Log Level
/// `warn!`
pub struct StatusUpdateRejected<'a> {
    pub name: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for StatusUpdateRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Rejected status update for '{}': {}", self.name, self.error)
    }
}

impl StructuredLog for StatusUpdateRejected<'_> {
    fn log(&self) {
        tracing::warn!(plugin = self.name, error = %self.error, "{}", self);
    }
}

/// A remote plugin missed its heartbeat window.
///
/// # Log Level
/// `info!`
pub struct PluginMarkedOffline<'a> {
    pub name: &'a str,
    pub since_seen: Duration,
}

impl Display for PluginMarkedOffline<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Plugin '{}' marked offline (last seen {:.1}s ago)",
            self.name,
            self.since_seen.as_secs_f64()
        )
    }
}

impl StructuredLog for PluginMarkedOffline<'_> {
    fn log(&self) {
        tracing::info!(
            plugin = self.name,
            since_seen_secs = self.since_seen.as_secs(),
            "{}", self
        );
    }
}

/// An announce message was dropped. No retry happens.
///
/// # Log Level
/// `warn!`
pub struct AnnounceRejected<'a> {
    pub reason: &'a str,
}

impl Display for AnnounceRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Dropped plugin announcement: {}", self.reason)
    }
}

impl StructuredLog for AnnounceRejected<'_> {
    fn log(&self) {
        tracing::warn!(reason = self.reason, "{}", self);
    }
}

/// Local plugin records were corrected on load.
///
/// # Log Level
/// `info!`
pub struct LocalStatusesNormalized {
    pub count: usize,
}

impl Display for LocalStatusesNormalized {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Normalized {} local plugin records to 'active'", self.count)
    }
}

impl StructuredLog for LocalStatusesNormalized {
    fn log(&self) {
        tracing::info!(count = self.count, "{}", self);
    }
}

/// # Log Level
/// `error!` - in-memory state stays authoritative until the next successful save
pub struct RegistryPersistFailed<'a> {
    pub operation: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for RegistryPersistFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Could not persist plugin registry after {}: {}",
            self.operation, self.error
        )
    }
}

impl StructuredLog for RegistryPersistFailed<'_> {
    fn log(&self) {
        tracing::error!(operation = self.operation, error = %self.error, "{}", self);
    }
}

pub struct RegistryLoaded {
    pub count: usize,
    pub skipped: usize,
}

impl Display for RegistryLoaded {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded {} plugin records ({} unreadable)",
            self.count, self.skipped
        )
    }
}

impl StructuredLog for RegistryLoaded {
    fn log(&self) {
        tracing::info!(count = self.count, skipped = self.skipped, "{}", self);
    }
}

/// A stored plugin entry could not be decoded. It is kept in the file as-is.
///
/// # Log Level
/// `error!`
///
/// # Example
/// ```
/// use morris::observability::messages::registry::PluginRecordSkipped;
///
/// let error = serde_json::from_str::<u8>("\"x\"").unwrap_err();
/// let msg = PluginRecordSkipped {
///     name: "TempSensor",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct PluginRecordSkipped<'a> {
    pub name: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for PluginRecordSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Skipped unreadable plugin record '{}': {}", self.name, self.error)
    }
}

impl StructuredLog for PluginRecordSkipped<'_> {
    fn log(&self) {
        tracing::error!(plugin = self.name, error = %self.error, "{}", self);
    }
}

/// # Log Level
/// `error!` - the registry starts empty
pub struct RegistryLoadFailed<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for RegistryLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Could not load plugin records, starting empty: {}", self.error)
    }
}

impl StructuredLog for RegistryLoadFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }
}

pub struct StatusMonitorStarted {
    pub interval: Duration,
    pub offline_timeout: Duration,
}

impl Display for StatusMonitorStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Plugin status monitor started: interval={:?}, offline_timeout={:?}",
            self.interval, self.offline_timeout
        )
    }
}

impl StructuredLog for StatusMonitorStarted {
    fn log(&self) {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            offline_timeout_ms = self.offline_timeout.as_millis() as u64,
            "{}", self
        );
    }
}

pub struct StatusMonitorStopped;

impl Display for StatusMonitorStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Plugin status monitor stopped")
    }
}

impl StructuredLog for StatusMonitorStopped {
    fn log(&self) {
        tracing::info!("{}", self);
    }
}

/// # Log Level
/// `error!` - the monitor keeps running and sweeps again on the next tick
pub struct StatusSweepFailed<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for StatusSweepFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Liveness sweep did not complete: {}", self.error)
    }
}

impl StructuredLog for StatusSweepFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }
}
