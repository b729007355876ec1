// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::PluginRegistry;
use crate::observability::messages::registry::{
    StatusMonitorStarted, StatusMonitorStopped, StatusSweepFailed,
};
use crate::observability::messages::StructuredLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub interval: Duration,
    pub offline_timeout: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            offline_timeout: Duration::from_secs(60),
        }
    }
}

/// Background sweep that marks silent remote plugins offline.
pub struct StatusMonitor;

impl StatusMonitor {
    /// Starts the sweep for `registry`.
    ///
    /// Returns `None` when a monitor already runs for this registry; only one
    /// may exist per instance.
    pub fn start(registry: Arc<PluginRegistry>, settings: MonitorSettings) -> Option<MonitorHandle> {
        if !registry.claim_monitor() {
            return None;
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();

        StatusMonitorStarted {
            interval: settings.interval,
            offline_timeout: settings.offline_timeout,
        }
        .log();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(settings.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        // A sweep that flips anything writes the plugins file.
                        let registry = registry.clone();
                        let sweep = move || registry.mark_stale_offline(Utc::now(), settings.offline_timeout);
                        if let Err(error) = tokio::task::spawn_blocking(sweep).await {
                            StatusSweepFailed { error: &error }.log();
                        }
                    }
                }
            }

            registry.release_monitor();
            StatusMonitorStopped.log();
        });

        Some(MonitorHandle {
            cancel,
            task: Some(task),
        })
    }
}

/// Owns a running monitor. Dropping the handle stops the sweep.
pub struct MonitorHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Stops the sweep and waits for the task to finish.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
