// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Publish/subscribe plumbing between the core and remote plugins.
//!
//! The core only talks to [`crate::traits::MessageBus`]. [`InMemoryBus`] is the in-process
//! adapter; broker clients implement the same trait outside this crate.
//!
//! Topics used by the core:
//!
//! | Topic | Direction | Purpose |
//! |---|---|---|
//! | `plugin/announce` | inbound | remote plugin upsert |
//! | `plugin/<device>/input` | outbound | invocation request |
//! | `plugin/<device>/output` | inbound | correlated reply |

pub mod memory;
pub mod subscribers;
pub mod topic;
pub mod triggers;

pub use memory::InMemoryBus;
pub use subscribers::SubscriberTable;
pub use triggers::BusTriggerSource;

pub const ANNOUNCE_TOPIC: &str = "plugin/announce";
pub const REPLY_PATTERN: &str = "plugin/+/output";

pub fn input_topic(device: &str) -> String {
    format!("plugin/{}/input", device)
}

/// One inbound or outbound bus message. Payloads are raw bytes; the core encodes JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(topic: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }
}
