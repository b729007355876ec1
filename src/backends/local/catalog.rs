// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::sync::Arc;

use super::plugins::{LogPlugin, UppercasePlugin};
use crate::traits::Plugin;

/// Builds a plugin instance.
pub type PluginFactory = fn() -> Arc<dyn Plugin>;

/// Static mapping from plugin name to factory.
///
/// Names are resolved against this table only; nothing is looked up by reflection.
/// Aliases are separate entries pointing at the same factory.
#[derive(Clone, Default)]
pub struct PluginCatalog {
    factories: BTreeMap<String, PluginFactory>,
}

impl PluginCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The plugins shipped with the core:
    /// - `Uppercase` / `UppercasePlugin` -> [`UppercasePlugin`]
    /// - `Log` / `LogPlugin` -> [`LogPlugin`]
    pub fn builtin() -> Self {
        Self::new()
            .with("Uppercase", uppercase)
            .with("UppercasePlugin", uppercase)
            .with("Log", log)
            .with("LogPlugin", log)
    }

    pub fn with(mut self, name: impl Into<String>, factory: PluginFactory) -> Self {
        self.factories.insert(name.into(), factory);
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn is_available(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Creates one instance per name.
    pub fn instantiate(&self) -> BTreeMap<String, Arc<dyn Plugin>> {
        self.factories
            .iter()
            .map(|(name, factory)| (name.clone(), factory()))
            .collect()
    }
}

fn uppercase() -> Arc<dyn Plugin> {
    Arc::new(UppercasePlugin::new())
}

fn log() -> Arc<dyn Plugin> {
    Arc::new(LogPlugin::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names_and_aliases() {
        let catalog = PluginCatalog::builtin();

        assert_eq!(
            catalog.names(),
            vec!["Log", "LogPlugin", "Uppercase", "UppercasePlugin"]
        );
        assert!(catalog.is_available("UppercasePlugin"));
        assert!(!catalog.is_available("uppercase"));
    }

    #[test]
    fn test_instantiate_creates_every_entry() {
        let plugins = PluginCatalog::builtin().instantiate();

        assert_eq!(plugins.len(), 4);
        assert_eq!(plugins["UppercasePlugin"].name(), "Uppercase");
        assert_eq!(plugins["LogPlugin"].name(), "Log");
    }
}
