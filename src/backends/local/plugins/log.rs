// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::ProcessingError;
use crate::observability::messages::plugin::{DataField, DataLogLevel, DataReceived};
use crate::observability::messages::StructuredLog;
use crate::traits::Plugin;

/// Logs the data it receives and returns it unchanged.
///
/// # Params
/// - `log_level`: `debug`, `info` (default), `warning` or `error`.
/// - `log_details`: when `true`, also logs each top-level field on its own line.
pub struct LogPlugin;

impl LogPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for LogPlugin {
    async fn process(&self, data: Value, params: &Map<String, Value>) -> Result<Value, ProcessingError> {
        let level = params
            .get("log_level")
            .and_then(Value::as_str)
            .map(DataLogLevel::parse)
            .unwrap_or(DataLogLevel::Info);

        DataReceived {
            plugin: self.name(),
            data: &data,
            level,
        }
        .log();

        let details = params
            .get("log_details")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if details {
            if let Value::Object(fields) = &data {
                for (key, value) in fields {
                    DataField {
                        plugin: self.name(),
                        key,
                        value,
                    }
                    .log();
                }
            }
        }

        Ok(data)
    }

    fn name(&self) -> &'static str {
        "Log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_returns_data_unchanged() {
        let plugin = LogPlugin::new();
        let mut params = Map::new();
        params.insert("log_level".to_string(), json!("warning"));
        params.insert("log_details".to_string(), json!(true));

        let data = json!({"msg": "hello", "nested": {"n": 1}});
        let result = plugin.process(data.clone(), &params).await.unwrap();

        assert_eq!(result, data);
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(DataLogLevel::parse("DEBUG"), DataLogLevel::Debug);
        assert_eq!(DataLogLevel::parse("warning"), DataLogLevel::Warning);
        assert_eq!(DataLogLevel::parse("error"), DataLogLevel::Error);
        assert_eq!(DataLogLevel::parse("verbose"), DataLogLevel::Info);
    }
}
