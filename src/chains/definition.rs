// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Character that marks a step's plugin reference as a remote address.
pub const REMOTE_SEPARATOR: char = ':';

/// A trigger-bound, ordered pipeline of plugin steps.
///
/// # Example
/// ```json
/// {
///   "trigger": "webhook:sensor",
///   "description": "Normalise sensor readings",
///   "steps": [
///     { "plugin": "Uppercase", "config": { "keys": ["msg"] } },
///     { "plugin": "remote:device1:TempPlugin", "config": {}, "await_reply": true }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainDefinition {
    pub trigger: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl ChainDefinition {
    pub fn new(trigger: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            trigger: trigger.into(),
            description: String::new(),
            steps,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Local plugin name, or `remote:<device>:<plugin>`.
    #[serde(rename = "plugin")]
    pub plugin_ref: String,
    #[serde(default)]
    pub config: Map<String, Value>,
    /// Overrides the runner's default for remote steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub await_reply: Option<bool>,
}

impl Step {
    pub fn new(plugin_ref: impl Into<String>) -> Self {
        Self {
            plugin_ref: plugin_ref.into(),
            config: Map::new(),
            await_reply: None,
        }
    }

    pub fn with_config(mut self, config: Map<String, Value>) -> Self {
        self.config = config;
        self
    }

    pub fn awaiting_reply(mut self, await_reply: bool) -> Self {
        self.await_reply = Some(await_reply);
        self
    }

    /// Routing is decided by the separator alone.
    pub fn is_remote(&self) -> bool {
        self.plugin_ref.contains(REMOTE_SEPARATOR)
    }
}

/// Chains keyed by id, kept in insertion order.
///
/// Trigger lookup walks this order, so with duplicate triggers the earliest chain wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainTable(Vec<(String, ChainDefinition)>);

impl ChainTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ChainDefinition> {
        self.0
            .iter()
            .find(|(chain_id, _)| chain_id == id)
            .map(|(_, chain)| chain)
    }

    /// Replaces in place when `id` exists, so an update keeps the chain's position.
    pub fn insert(&mut self, id: String, chain: ChainDefinition) -> Option<ChainDefinition> {
        match self.0.iter_mut().find(|(chain_id, _)| *chain_id == id) {
            Some((_, existing)) => Some(std::mem::replace(existing, chain)),
            None => {
                self.0.push((id, chain));
                None
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<ChainDefinition> {
        let index = self.0.iter().position(|(chain_id, _)| chain_id == id)?;
        Some(self.0.remove(index).1)
    }

    pub fn find_by_trigger(&self, trigger: &str) -> Option<(&str, &ChainDefinition)> {
        self.0
            .iter()
            .find(|(_, chain)| chain.trigger == trigger)
            .map(|(id, chain)| (id.as_str(), chain))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChainDefinition)> {
        self.0.iter().map(|(id, chain)| (id.as_str(), chain))
    }

    /// The chains file representation: `id -> definition`, insertion ordered.
    pub fn to_stored(&self) -> Result<Map<String, Value>, serde_json::Error> {
        self.0
            .iter()
            .map(|(id, chain)| Ok((id.clone(), serde_json::to_value(chain)?)))
            .collect()
    }
}
