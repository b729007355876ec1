// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::{Map, Value};

use super::address::{reply_key, RemoteAddress};
use super::correlation::PendingReplies;
use crate::bus::topic::device_segment;
use crate::bus::{BusMessage, REPLY_PATTERN};
use crate::errors::{DispatchError, TransportError};
use crate::observability::messages::plugin::{
    RemoteDispatchFailed, RemoteReplyReceived, RemoteReplyTimedOut, RemoteRequestPublished,
    ReplyRejected, UnclaimedReply,
};
use crate::observability::messages::StructuredLog;
use crate::traits::MessageBus;

/// Request published to `plugin/<device>/input`.
#[derive(Debug, Serialize)]
struct RunPluginRequest<'a> {
    action: &'static str,
    plugin_id: &'a str,
    data: &'a Value,
    config: &'a Map<String, Value>,
}

/// Invokes plugins on other devices over the bus.
///
/// Without a bus every remote step fails (logged) and passes its data through.
#[derive(Clone)]
pub struct RemoteDispatcher {
    bus: Option<Arc<dyn MessageBus>>,
    pending: Arc<PendingReplies>,
}

impl RemoteDispatcher {
    pub fn new(bus: Option<Arc<dyn MessageBus>>) -> Self {
        Self {
            bus,
            pending: PendingReplies::new(),
        }
    }

    /// Subscribes the reply handler on `plugin/+/output`. A dispatcher without a bus has
    /// nothing to listen to.
    pub async fn attach_reply_listener(&self) -> Result<(), TransportError> {
        let Some(bus) = &self.bus else {
            return Ok(());
        };

        let pending = Arc::clone(&self.pending);
        bus.subscribe(
            REPLY_PATTERN,
            Arc::new(move |message: &BusMessage| handle_reply(&pending, message)),
        )
        .await
    }

    pub fn pending(&self) -> &PendingReplies {
        &self.pending
    }

    /// Publishes a `run_plugin` request and, when `await_reply` is set, waits for the
    /// device's reply.
    ///
    /// The reply slot is registered before the request is published, so a reply can never
    /// arrive unobserved. Without `await_reply` the original `data` is returned as soon as
    /// the request is out.
    pub async fn try_dispatch(
        &self,
        address: &str,
        data: Value,
        config: &Map<String, Value>,
        await_reply: bool,
        timeout: Duration,
    ) -> Result<Value, DispatchError> {
        let target = RemoteAddress::parse(address)?;
        let bus = self.bus.as_ref().ok_or_else(|| DispatchError::BusUnavailable {
            address: address.to_string(),
        })?;

        let request = RunPluginRequest {
            action: "run_plugin",
            plugin_id: target.plugin,
            data: &data,
            config,
        };
        let payload = serde_json::to_vec(&request).map_err(|error| DispatchError::Encode {
            address: address.to_string(),
            reason: error.to_string(),
        })?;

        let slot = await_reply.then(|| self.pending.register(target.reply_key()));

        let topic = target.input_topic();
        if !bus.publish(&topic, payload).await {
            return Err(DispatchError::PublishFailed { topic });
        }
        RemoteRequestPublished {
            address,
            topic: &topic,
            await_reply,
        }
        .log();

        let Some(slot) = slot else {
            return Ok(data);
        };

        let started = Instant::now();
        let reply = slot.wait(timeout).await?;
        RemoteReplyReceived {
            key: &target.reply_key(),
            waited: started.elapsed(),
        }
        .log();

        Ok(match reply {
            Value::Object(mut fields) => fields.remove("data").unwrap_or(data),
            _ => data,
        })
    }

    /// Like [`Self::try_dispatch`], but any failure is logged and `data` comes back unchanged.
    pub async fn dispatch(
        &self,
        address: &str,
        data: Value,
        config: &Map<String, Value>,
        await_reply: bool,
        timeout: Duration,
    ) -> Value {
        match self
            .try_dispatch(address, data.clone(), config, await_reply, timeout)
            .await
        {
            Ok(result) => result,
            Err(error) => {
                log_failure(address, &error);
                data
            }
        }
    }
}

fn log_failure(address: &str, error: &DispatchError) {
    match error {
        DispatchError::Timeout { key, timeout } => RemoteReplyTimedOut {
            key,
            timeout: *timeout,
        }
        .log(),
        _ => RemoteDispatchFailed { address, error }.log(),
    }
}

fn handle_reply(pending: &PendingReplies, message: &BusMessage) {
    let Some(device) = device_segment(&message.topic, "output") else {
        ReplyRejected {
            topic: &message.topic,
            reason: "not a plugin output topic",
        }
        .log();
        return;
    };

    let payload: Value = match serde_json::from_slice(&message.payload) {
        Ok(payload) => payload,
        Err(error) => {
            ReplyRejected {
                topic: &message.topic,
                reason: &format!("payload is not JSON: {}", error),
            }
            .log();
            return;
        }
    };

    let key = reply_key(device);
    if !pending.deliver(&key, payload) {
        UnclaimedReply { key: &key }.log();
    }
}
