// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use crate::errors::ProcessingError;
use crate::traits::Plugin;

/// A plugin that always fails, for fail-open scenarios.
pub struct FailingPlugin;

#[async_trait::async_trait]
impl Plugin for FailingPlugin {
    async fn process(&self, _data: Value, _params: &Map<String, Value>) -> Result<Value, ProcessingError> {
        Err(ProcessingError::new(self.name(), "Simulated plugin failure"))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// A plugin that panics mid-call.
pub struct PanickingPlugin;

#[async_trait::async_trait]
impl Plugin for PanickingPlugin {
    async fn process(&self, _data: Value, _params: &Map<String, Value>) -> Result<Value, ProcessingError> {
        panic!("simulated plugin panic")
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// Appends its label to the `visited` array of an object, to observe step order.
pub struct MarkerPlugin {
    pub label: &'static str,
}

impl MarkerPlugin {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }
}

#[async_trait::async_trait]
impl Plugin for MarkerPlugin {
    async fn process(&self, data: Value, _params: &Map<String, Value>) -> Result<Value, ProcessingError> {
        let Value::Object(mut fields) = data else {
            return Err(ProcessingError::new(self.name(), "expected an object"));
        };
        let visited = fields
            .entry("visited")
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(labels) = visited {
            labels.push(Value::String(self.label.to_string()));
        }
        Ok(Value::Object(fields))
    }

    fn name(&self) -> &'static str {
        "marker"
    }
}

/// Records every call and passes the data through.
#[derive(Default)]
pub struct RecordingPlugin {
    calls: Arc<Mutex<Vec<(Value, Map<String, Value>)>>>,
}

impl RecordingPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(Value, Map<String, Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Plugin for RecordingPlugin {
    async fn process(&self, data: Value, params: &Map<String, Value>) -> Result<Value, ProcessingError> {
        self.calls.lock().unwrap().push((data.clone(), params.clone()));
        Ok(data)
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
