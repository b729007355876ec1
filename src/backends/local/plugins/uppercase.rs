// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::ProcessingError;
use crate::traits::Plugin;

/// Uppercases string values of an object.
///
/// # Params
/// - `keys`: optional list of keys to touch. When absent or empty every string value is
///   converted. Listed keys that are missing or hold non-strings are left alone.
pub struct UppercasePlugin;

impl UppercasePlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UppercasePlugin {
    fn default() -> Self {
        Self::new()
    }
}

fn selected_keys(params: &Map<String, Value>) -> Result<Option<Vec<&str>>, ProcessingError> {
    match params.get("keys") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(keys)) if keys.is_empty() => Ok(None),
        Some(Value::Array(keys)) => keys
            .iter()
            .map(|key| {
                key.as_str().ok_or_else(|| {
                    ProcessingError::new("Uppercase", format!("'keys' entries must be strings, got {}", key))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(other) => Err(ProcessingError::new(
            "Uppercase",
            format!("'keys' must be a list, got {}", other),
        )),
    }
}

fn uppercase_in_place(value: &mut Value) {
    if let Value::String(text) = value {
        *text = text.to_uppercase();
    }
}

#[async_trait]
impl Plugin for UppercasePlugin {
    async fn process(&self, data: Value, params: &Map<String, Value>) -> Result<Value, ProcessingError> {
        let Value::Object(mut fields) = data else {
            return Err(ProcessingError::new(
                self.name(),
                "input must be a JSON object",
            ));
        };

        match selected_keys(params)? {
            Some(keys) => {
                for key in keys {
                    if let Some(value) = fields.get_mut(key) {
                        uppercase_in_place(value);
                    }
                }
            }
            None => fields.values_mut().for_each(uppercase_in_place),
        }

        Ok(Value::Object(fields))
    }

    fn name(&self) -> &'static str {
        "Uppercase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_uppercases_only_selected_keys() {
        let plugin = UppercasePlugin::new();

        let result = plugin
            .process(
                json!({"msg": "hello", "other": "quiet", "n": 1}),
                &params(json!({"keys": ["msg", "n", "missing"]})),
            )
            .await
            .unwrap();

        assert_eq!(result, json!({"msg": "HELLO", "other": "quiet", "n": 1}));
    }

    #[tokio::test]
    async fn test_uppercases_every_string_without_keys() {
        let plugin = UppercasePlugin::new();

        let result = plugin
            .process(json!({"a": "x", "b": "straße", "c": [1], "d": null}), &Map::new())
            .await
            .unwrap();

        assert_eq!(result, json!({"a": "X", "b": "STRASSE", "c": [1], "d": null}));
    }

    #[tokio::test]
    async fn test_rejects_non_object_input() {
        let plugin = UppercasePlugin::new();

        let error = plugin.process(json!("hello"), &Map::new()).await.unwrap_err();

        assert_eq!(error.plugin, "Uppercase");
    }

    #[tokio::test]
    async fn test_rejects_malformed_keys_param() {
        let plugin = UppercasePlugin::new();

        let result = plugin
            .process(json!({"msg": "hi"}), &params(json!({"keys": "msg"})))
            .await;

        assert!(result.is_err());
    }
}
