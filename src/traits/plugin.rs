use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::ProcessingError;

/// An in-process processing unit addressable by name from a chain step.
///
/// Implementations are registered with a [`crate::backends::local::PluginCatalog`]
/// at start-up and invoked with the step's data plus the step's `config` mapping as
/// `params`. Returning an error makes the step a pass-through.
#[async_trait]
pub trait Plugin: Send + Sync {
    async fn process(&self, data: Value, params: &Map<String, Value>) -> Result<Value, ProcessingError>;

    fn name(&self) -> &'static str;
}
