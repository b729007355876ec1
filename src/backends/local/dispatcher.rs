// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::{Map, Value};

use super::catalog::PluginCatalog;
use crate::errors::DispatchError;
use crate::observability::messages::plugin::LocalDispatchFailed;
use crate::observability::messages::StructuredLog;
use crate::traits::Plugin;

/// Runs in-process plugins by name.
///
/// Instances are created once, when the dispatcher is built, and shared by every call.
/// Step configuration is passed to `process` as params on each call, so one instance
/// serves every chain that names it.
#[derive(Clone)]
pub struct LocalDispatcher {
    plugins: BTreeMap<String, Arc<dyn Plugin>>,
}

impl LocalDispatcher {
    pub fn new(catalog: &PluginCatalog) -> Self {
        Self {
            plugins: catalog.instantiate(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(&PluginCatalog::builtin())
    }

    /// Registers an already-built instance, replacing any plugin of the same name.
    pub fn with_plugin(mut self, name: impl Into<String>, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.insert(name.into(), plugin);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    /// Resolves and runs the plugin, reporting failures to the caller.
    ///
    /// A panic inside the plugin is caught and reported as
    /// [`DispatchError::PluginPanicked`].
    pub async fn try_dispatch(
        &self,
        name: &str,
        data: Value,
        params: &Map<String, Value>,
    ) -> Result<Value, DispatchError> {
        let plugin = self
            .plugins
            .get(name)
            .ok_or_else(|| DispatchError::UnknownPlugin {
                name: name.to_string(),
            })?;

        let outcome = AssertUnwindSafe(async { plugin.process(data, params).await })
            .catch_unwind()
            .await
            .map_err(|_| DispatchError::PluginPanicked {
                name: name.to_string(),
            })?;
        Ok(outcome?)
    }

    /// Runs the plugin; on any failure logs it and returns `data` unchanged.
    pub async fn dispatch(&self, name: &str, data: Value, params: &Map<String, Value>) -> Value {
        match self.try_dispatch(name, data.clone(), params).await {
            Ok(result) => result,
            Err(error) => {
                LocalDispatchFailed {
                    plugin: name,
                    error: &error,
                }
                .log();
                data
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{FailingPlugin, PanickingPlugin};
    use serde_json::json;

    #[tokio::test]
    async fn test_dispatch_runs_named_plugin_with_params() {
        let dispatcher = LocalDispatcher::builtin();
        let mut params = Map::new();
        params.insert("keys".to_string(), json!(["msg"]));

        let result = dispatcher
            .dispatch("Uppercase", json!({"msg": "hello", "n": 1}), &params)
            .await;

        assert_eq!(result, json!({"msg": "HELLO", "n": 1}));
    }

    #[tokio::test]
    async fn test_unknown_plugin_is_a_no_op() {
        let dispatcher = LocalDispatcher::builtin();
        let data = json!({"msg": "hello"});

        assert_eq!(
            dispatcher.try_dispatch("Nope", data.clone(), &Map::new()).await,
            Err(DispatchError::UnknownPlugin {
                name: "Nope".to_string()
            })
        );
        assert_eq!(dispatcher.dispatch("Nope", data.clone(), &Map::new()).await, data);
    }

    #[tokio::test]
    async fn test_plugin_error_is_a_no_op() {
        let dispatcher = LocalDispatcher::builtin().with_plugin("Broken", Arc::new(FailingPlugin));
        let data = json!({"msg": "hello"});

        let result = dispatcher.dispatch("Broken", data.clone(), &Map::new()).await;

        assert_eq!(result, data);
        assert!(matches!(
            dispatcher.try_dispatch("Broken", data, &Map::new()).await,
            Err(DispatchError::Processing(_))
        ));
    }

    #[tokio::test]
    async fn test_plugin_panic_is_caught_and_passes_input_through() {
        let dispatcher = LocalDispatcher::builtin().with_plugin("Panicky", Arc::new(PanickingPlugin));
        let data = json!({"msg": "hello"});

        assert_eq!(
            dispatcher.try_dispatch("Panicky", data.clone(), &Map::new()).await,
            Err(DispatchError::PluginPanicked {
                name: "Panicky".to_string()
            })
        );
        assert_eq!(dispatcher.dispatch("Panicky", data.clone(), &Map::new()).await, data);

        // The dispatcher keeps working after a panic
        let result = dispatcher.dispatch("Uppercase", data, &Map::new()).await;
        assert_eq!(result, json!({"msg": "HELLO"}));
    }
}
