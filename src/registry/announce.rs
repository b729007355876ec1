// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Handle;

use super::{PluginRecord, PluginRegistration, PluginRegistry};
use crate::bus::{BusMessage, ANNOUNCE_TOPIC};
use crate::errors::TransportError;
use crate::observability::messages::registry::AnnounceRejected;
use crate::observability::messages::StructuredLog;
use crate::traits::MessageBus;

/// Turns `plugin/announce` messages into registry upserts.
///
/// Malformed or incomplete announcements are logged and dropped; there is no retry.
/// Each announcement is ingested on Tokio's blocking pool, since an upsert saves the
/// plugins file.
/// Duplicates are harmless because each one is an upsert by name.
pub struct AnnounceListener;

impl AnnounceListener {
    pub async fn attach(
        bus: &dyn MessageBus,
        registry: Arc<PluginRegistry>,
    ) -> Result<(), TransportError> {
        let runtime = Handle::current();
        bus.subscribe(
            ANNOUNCE_TOPIC,
            Arc::new(move |message: &BusMessage| {
                // Upserts write the plugins file; keep that off the delivery task.
                let registry = registry.clone();
                let message = message.clone();
                runtime.spawn_blocking(move || Self::ingest(&registry, &message));
            }),
        )
        .await
    }

    pub fn ingest(registry: &PluginRegistry, message: &BusMessage) -> Option<PluginRecord> {
        let value: Value = match serde_json::from_slice(&message.payload) {
            Ok(value) => value,
            Err(error) => {
                AnnounceRejected {
                    reason: &format!("payload is not JSON: {}", error),
                }
                .log();
                return None;
            }
        };

        let result = PluginRegistration::from_value(value)
            .map_err(Into::into)
            .and_then(|registration| registry.upsert(registration, "announce"));

        match result {
            Ok(record) => Some(record),
            Err(error) => {
                AnnounceRejected {
                    reason: &error.to_string(),
                }
                .log();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::InMemoryBus;
    use crate::registry::{PluginKind, PluginStatus};
    use serde_json::json;
    use std::time::Duration;

    fn announce(value: Value) -> BusMessage {
        BusMessage::new(ANNOUNCE_TOPIC, serde_json::to_vec(&value).unwrap())
    }

    #[test]
    fn test_valid_announce_upserts_with_fresh_last_seen() {
        let registry = PluginRegistry::in_memory();
        let message = announce(json!({
            "name": "TempSensor",
            "type": "remote",
            "description": "temperature sensor",
            "status": "online"
        }));

        let first = AnnounceListener::ingest(&registry, &message).unwrap();
        let second = AnnounceListener::ingest(&registry, &message).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(second.kind, PluginKind::Remote);
        assert!(second.last_seen >= first.last_seen);
    }

    #[test]
    fn test_incomplete_or_garbled_announce_is_dropped() {
        let registry = PluginRegistry::in_memory();

        assert!(AnnounceListener::ingest(&registry, &announce(json!({"name": "TempSensor"}))).is_none());
        assert!(AnnounceListener::ingest(
            &registry,
            &BusMessage::new(ANNOUNCE_TOPIC, b"not json".to_vec())
        )
        .is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_attached_listener_receives_bus_announcements() {
        let bus = InMemoryBus::start();
        let registry = Arc::new(PluginRegistry::in_memory());
        AnnounceListener::attach(&*bus, registry.clone())
            .await
            .unwrap();

        let payload = json!({
            "name": "Relay",
            "type": "remote",
            "description": "relay board",
            "status": "online"
        });
        assert!(bus.publish(ANNOUNCE_TOPIC, serde_json::to_vec(&payload).unwrap()).await);

        for _ in 0..50 {
            if registry.get("Relay").is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(registry.get("Relay").unwrap().status, PluginStatus::Online);
    }

    /// Holds every save until the test releases it.
    struct GatedStorage {
        gate: std::sync::Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl crate::traits::Storage<crate::registry::StoredPlugins> for GatedStorage {
        fn load(&self) -> Result<Option<crate::registry::StoredPlugins>, crate::errors::PersistenceError> {
            Ok(None)
        }

        fn save(&self, _value: &crate::registry::StoredPlugins) -> Result<(), crate::errors::PersistenceError> {
            let _ = self.gate.lock().unwrap().recv();
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_slow_registry_save_does_not_stall_bus_delivery() {
        let (release, gate) = std::sync::mpsc::channel();
        let registry = Arc::new(PluginRegistry::new(Arc::new(GatedStorage {
            gate: std::sync::Mutex::new(gate),
        })));
        let bus = InMemoryBus::start();
        AnnounceListener::attach(&*bus, registry.clone())
            .await
            .unwrap();

        let (seen_tx, mut seen_rx) = tokio::sync::mpsc::unbounded_channel();
        bus.subscribe(
            "core/#",
            Arc::new(move |message: &BusMessage| {
                let _ = seen_tx.send(message.topic.clone());
            }),
        )
        .await
        .unwrap();

        let payload = json!({
            "name": "Relay",
            "type": "remote",
            "description": "relay board",
            "status": "online"
        });
        assert!(bus.publish(ANNOUNCE_TOPIC, serde_json::to_vec(&payload).unwrap()).await);
        assert!(bus.publish("core/ping", b"{}".to_vec()).await);

        let delivered = tokio::time::timeout(Duration::from_secs(2), seen_rx.recv()).await;
        assert_eq!(delivered.unwrap(), Some("core/ping".to_string()));

        release.send(()).unwrap();
        for _ in 0..100 {
            if registry.get("Relay").is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(registry.get("Relay").is_some());
    }
}
