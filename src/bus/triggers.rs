// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, Weak};

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::BusMessage;
use crate::chains::TriggerKey;
use crate::engine::ChainRunner;
use crate::errors::TransportError;
use crate::observability::messages::bus::{
    TriggerMessageRejected, TriggeredChainFinished, UnboundTriggerTopic,
};
use crate::observability::messages::StructuredLog;
use crate::traits::MessageBus;

/// Starts chains from bus traffic: a JSON message on `<topic>` runs the chain bound to
/// `mqtt:<topic>` in the background.
///
/// Messages under `plugin/` belong to the plugin protocol and are never treated as triggers.
///
/// The bus handlers only hold a weak reference: once the last `BusTriggerSource` clone
/// is dropped, attached patterns stop starting chains.
#[derive(Clone)]
pub struct BusTriggerSource {
    inner: Arc<TriggerContext>,
}

struct TriggerContext {
    runner: ChainRunner,
    runtime: Handle,
}

impl BusTriggerSource {
    /// Must be called inside a Tokio runtime; detached runs are spawned on it.
    pub fn new(runner: ChainRunner) -> Self {
        Self {
            inner: Arc::new(TriggerContext {
                runner,
                runtime: Handle::current(),
            }),
        }
    }

    /// Subscribes to every pattern, stopping at the first one the bus refuses.
    pub async fn attach(&self, bus: &dyn MessageBus, patterns: &[String]) -> Result<(), TransportError> {
        for pattern in patterns {
            let context: Weak<TriggerContext> = Arc::downgrade(&self.inner);
            bus.subscribe(
                pattern,
                Arc::new(move |message: &BusMessage| {
                    if let Some(inner) = context.upgrade() {
                        BusTriggerSource { inner }.handle(message);
                    }
                }),
            )
            .await?;
        }
        Ok(())
    }

    /// Returns the handle of the started run, if one was started.
    pub fn handle(&self, message: &BusMessage) -> Option<JoinHandle<()>> {
        if message.topic.starts_with("plugin/") {
            return None;
        }

        let payload: Value = match serde_json::from_slice(&message.payload) {
            Ok(payload) => payload,
            Err(error) => {
                TriggerMessageRejected {
                    topic: &message.topic,
                    reason: &format!("payload is not JSON: {}", error),
                }
                .log();
                return None;
            }
        };

        let trigger = TriggerKey::mqtt(&message.topic);
        let Some((chain_id, _)) = self.inner.runner.chains().find_by_trigger(&trigger) else {
            UnboundTriggerTopic {
                topic: &message.topic,
                trigger: &trigger,
            }
            .log();
            return None;
        };

        let _entered = self.inner.runtime.enter();
        Some(self.inner.runner.run_detached(trigger, payload, move |result| {
            TriggeredChainFinished {
                chain_id: &chain_id,
                result: &result,
            }
            .log();
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::LocalDispatcher;
    use crate::backends::remote::RemoteDispatcher;
    use crate::backends::stub::RecordingPlugin;
    use crate::bus::InMemoryBus;
    use crate::chains::{ChainDefinition, ChainStore, Step};
    use crate::engine::RunnerOptions;
    use serde_json::json;

    fn source_with(recorder: Arc<RecordingPlugin>) -> BusTriggerSource {
        let chains = Arc::new(ChainStore::in_memory());
        chains
            .add(
                "temp_chain",
                ChainDefinition::new("mqtt:core/temp", vec![Step::new("Rec")]),
            )
            .unwrap();
        let runner = ChainRunner::new(
            chains,
            Arc::new(LocalDispatcher::builtin().with_plugin("Rec", recorder)),
            Arc::new(RemoteDispatcher::new(None)),
            RunnerOptions::default(),
        );
        BusTriggerSource::new(runner)
    }

    #[tokio::test]
    async fn test_json_message_runs_bound_chain() {
        let recorder = Arc::new(RecordingPlugin::new());
        let source = source_with(recorder.clone());

        let run = source
            .handle(&BusMessage::new("core/temp", br#"{"celsius": 21}"#.to_vec()))
            .unwrap();
        run.await.unwrap();

        assert_eq!(recorder.calls().len(), 1);
        assert_eq!(recorder.calls()[0].0, json!({"celsius": 21}));
    }

    #[tokio::test]
    async fn test_ignored_messages_start_nothing() {
        let recorder = Arc::new(RecordingPlugin::new());
        let source = source_with(recorder.clone());

        assert!(source
            .handle(&BusMessage::new("core/temp", b"not json".to_vec()))
            .is_none());
        assert!(source
            .handle(&BusMessage::new("core/humidity", b"{}".to_vec()))
            .is_none());
        assert!(source
            .handle(&BusMessage::new("plugin/dev1/output", b"{}".to_vec()))
            .is_none());
        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_attached_source_reacts_to_bus_traffic() {
        let recorder = Arc::new(RecordingPlugin::new());
        let source = source_with(recorder.clone());
        let bus = InMemoryBus::start();
        source
            .attach(&*bus, &["core/#".to_string()])
            .await
            .unwrap();

        assert!(bus.publish("core/temp", br#"{"celsius": 30}"#.to_vec()).await);

        for _ in 0..20 {
            if !recorder.calls().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(recorder.calls()[0].0, json!({"celsius": 30}));
    }

    #[tokio::test]
    async fn test_dropped_source_stops_triggering_and_frees_the_bus() {
        let bus = InMemoryBus::start();
        let recorder = Arc::new(RecordingPlugin::new());
        let chains = Arc::new(ChainStore::in_memory());
        chains
            .add(
                "temp_chain",
                ChainDefinition::new("mqtt:core/temp", vec![Step::new("Rec")]),
            )
            .unwrap();
        let runner = ChainRunner::new(
            chains,
            Arc::new(LocalDispatcher::builtin().with_plugin("Rec", recorder.clone())),
            Arc::new(RemoteDispatcher::new(Some(bus.clone() as Arc<dyn MessageBus>))),
            RunnerOptions::default(),
        );
        let source = BusTriggerSource::new(runner);
        source
            .attach(&*bus, &["core/#".to_string()])
            .await
            .unwrap();

        drop(source);
        assert!(bus.publish("core/temp", br#"{"celsius": 30}"#.to_vec()).await);
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert!(recorder.calls().is_empty());

        let weak_bus = Arc::downgrade(&bus);
        drop(bus);
        assert!(weak_bus.upgrade().is_none());
    }
}
