// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::subscribers::SubscriberTable;
use super::{topic, BusMessage};
use crate::errors::TransportError;
use crate::observability::messages::bus::{PublishFailed, Subscribed};
use crate::observability::messages::StructuredLog;
use crate::traits::{MessageBus, TopicHandler};

/// Loopback bus: everything published is delivered to local subscribers.
///
/// A single task drains the queue, so handlers observe messages one at a time in
/// publish order, the same as a broker client's network loop.
pub struct InMemoryBus {
    sender: mpsc::UnboundedSender<BusMessage>,
    subscribers: Arc<SubscriberTable>,
    delivery: JoinHandle<()>,
}

impl InMemoryBus {
    /// Spawns the delivery task. Must be called inside a Tokio runtime.
    pub fn start() -> Arc<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<BusMessage>();
        let subscribers = Arc::new(SubscriberTable::new());

        let table = subscribers.clone();
        let delivery = tokio::spawn(async move {
            while let Some(message) = receiver.recv().await {
                table.deliver(&message);
            }
        });

        Arc::new(Self {
            sender,
            subscribers,
            delivery,
        })
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.subscribers.patterns()
    }

    fn try_publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        topic::validate_topic(topic)?;
        self.sender
            .send(BusMessage::new(topic, payload))
            .map_err(|_| TransportError::Closed)
    }
}

impl Drop for InMemoryBus {
    fn drop(&mut self) {
        self.delivery.abort();
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> bool {
        match self.try_publish(topic, payload) {
            Ok(()) => true,
            Err(error) => {
                PublishFailed {
                    topic,
                    error: &error,
                }
                .log();
                false
            }
        }
    }

    async fn subscribe(&self, pattern: &str, handler: TopicHandler) -> Result<(), TransportError> {
        topic::validate_pattern(pattern)?;
        self.subscribers.add(pattern, handler);
        Subscribed { pattern }.log();
        Ok(())
    }
}
