use std::sync::Arc;

use async_trait::async_trait;

use crate::bus::BusMessage;
use crate::errors::TransportError;

/// Callback for messages matching a subscribed topic pattern.
///
/// Runs on the bus delivery context, so it must return quickly and hand any heavy
/// work to a spawned task.
pub type TopicHandler = Arc<dyn Fn(&BusMessage) + Send + Sync>;

/// Publish/subscribe transport the core talks to remote plugins through.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Returns `false` when the message could not be handed to the transport.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> bool;

    /// Registers `handler` for every inbound message whose topic matches `pattern`.
    /// Patterns use MQTT wildcards (`+`, `#`).
    async fn subscribe(&self, pattern: &str, handler: TopicHandler) -> Result<(), TransportError>;
}
