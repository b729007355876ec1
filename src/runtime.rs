// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Assembles the core from [`Settings`].

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::backends::local::LocalDispatcher;
use crate::backends::remote::RemoteDispatcher;
use crate::bus::{BusTriggerSource, InMemoryBus};
use crate::chains::{ChainStore, StoredChains};
use crate::config::{Settings, Transport};
use crate::engine::ChainRunner;
use crate::observability::messages::engine::{CoreStarted, CoreStopped};
use crate::observability::messages::StructuredLog;
use crate::registry::{AnnounceListener, MonitorHandle, PluginRegistry, StatusMonitor, StoredPlugins};
use crate::storage::JsonFileStorage;
use crate::traits::MessageBus;

/// The running core: stores, registry, bus wiring and the status monitor.
///
/// Web or CLI layers call into [`CoreRuntime::runner`], [`CoreRuntime::chains`] and
/// [`CoreRuntime::registry`].
pub struct CoreRuntime {
    pub settings: Settings,
    pub bus: Arc<dyn MessageBus>,
    pub chains: Arc<ChainStore>,
    pub registry: Arc<PluginRegistry>,
    pub runner: ChainRunner,
    triggers: BusTriggerSource,
    monitor: Option<MonitorHandle>,
}

impl CoreRuntime {
    /// Loads persisted state, subscribes every bus listener and starts the monitor.
    pub async fn start(settings: Settings) -> Result<Self> {
        let chains = Arc::new(ChainStore::new(Arc::new(
            JsonFileStorage::<StoredChains>::new(settings.storage.chains_path()),
        )));
        let registry = Arc::new(PluginRegistry::new(Arc::new(
            JsonFileStorage::<StoredPlugins>::new(settings.storage.plugins_path()),
        )));

        let bus: Arc<dyn MessageBus> = match settings.bus.transport {
            Transport::Memory => InMemoryBus::start(),
        };

        AnnounceListener::attach(&*bus, registry.clone())
            .await
            .context("subscribing to plugin announcements")?;

        let remote = RemoteDispatcher::new(Some(bus.clone()));
        remote
            .attach_reply_listener()
            .await
            .context("subscribing to remote plugin replies")?;

        let runner = ChainRunner::new(
            chains.clone(),
            Arc::new(LocalDispatcher::builtin()),
            Arc::new(remote),
            settings.remote.runner_options(),
        );

        let triggers = BusTriggerSource::new(runner.clone());
        triggers
            .attach(&*bus, &settings.bus.subscribe)
            .await
            .context("subscribing to trigger topics")?;

        let monitor = StatusMonitor::start(registry.clone(), settings.registry.monitor_settings());

        CoreStarted {
            chains: chains.list().len(),
            plugins: registry.len(),
            trigger_patterns: &settings.bus.subscribe,
        }
        .log();

        Ok(Self {
            settings,
            bus,
            chains,
            registry,
            runner,
            triggers,
            monitor,
        })
    }

    /// Stops the status monitor and bus triggers. In-flight detached runs are left to
    /// finish on their own.
    pub async fn shutdown(mut self) {
        if let Some(monitor) = self.monitor.take() {
            monitor.stop().await;
        }
        drop(self.triggers);
        CoreStopped.log();
    }
}
