// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bus::topic::validate_pattern;
use crate::engine::RunnerOptions;
use crate::errors::{ConfigError, PersistenceError};
use crate::registry::MonitorSettings;

/// Runtime settings for the core.
///
/// Every section is optional; missing values take the defaults shown below.
///
/// # Example
/// ```yaml
/// bus:
///   transport: memory
///   subscribe: ["core/#"]
/// storage:
///   data_dir: data
///   chains_file: chains.json
///   plugins_file: plugins.json
/// registry:
///   offline_timeout_secs: 60
///   monitor_interval_secs: 10
/// remote:
///   await_reply: false
///   reply_timeout_ms: 5000
/// logging:
///   level: info
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bus: BusSettings,
    pub storage: StorageSettings,
    pub registry: RegistrySettings,
    pub remote: RemoteSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// In-process loopback bus.
    #[default]
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusSettings {
    pub transport: Transport,
    /// Topic patterns whose messages may start chains (`mqtt:<topic>` triggers).
    pub subscribe: Vec<String>,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            transport: Transport::Memory,
            subscribe: vec!["core/#".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
    pub chains_file: String,
    pub plugins_file: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            chains_file: "chains.json".to_string(),
            plugins_file: "plugins.json".to_string(),
        }
    }
}

impl StorageSettings {
    pub fn chains_path(&self) -> PathBuf {
        self.data_dir.join(&self.chains_file)
    }

    pub fn plugins_path(&self) -> PathBuf {
        self.data_dir.join(&self.plugins_file)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    pub offline_timeout_secs: u64,
    pub monitor_interval_secs: u64,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            offline_timeout_secs: 60,
            monitor_interval_secs: 10,
        }
    }
}

impl RegistrySettings {
    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            interval: Duration::from_secs(self.monitor_interval_secs),
            offline_timeout: Duration::from_secs(self.offline_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Default for remote steps that do not set `await_reply`.
    pub await_reply: bool,
    pub reply_timeout_ms: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            await_reply: false,
            reply_timeout_ms: 5000,
        }
    }
}

impl RemoteSettings {
    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            await_reply: self.await_reply,
            reply_timeout: Duration::from_millis(self.reply_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Parses settings text; `.toml` files are read as TOML, anything else as YAML.
    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let settings = if is_toml {
            toml::from_str(text).map_err(|source| PersistenceError::Toml {
                path: path.to_path_buf(),
                source,
            })?
        } else if text.trim().is_empty() {
            Settings::default()
        } else {
            serde_yaml::from_str(text).map_err(|source| PersistenceError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        };
        Ok(settings)
    }

    /// Applies `MORRIS_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("MORRIS_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup("MORRIS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(value) = lookup("MORRIS_OFFLINE_TIMEOUT_SECS") {
            self.registry.offline_timeout_secs = parse_number("MORRIS_OFFLINE_TIMEOUT_SECS", value)?;
        }
        if let Some(value) = lookup("MORRIS_MONITOR_INTERVAL_SECS") {
            self.registry.monitor_interval_secs = parse_number("MORRIS_MONITOR_INTERVAL_SECS", value)?;
        }
        if let Some(value) = lookup("MORRIS_REPLY_TIMEOUT_MS") {
            self.remote.reply_timeout_ms = parse_number("MORRIS_REPLY_TIMEOUT_MS", value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.monitor_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "registry.monitor_interval_secs",
                reason: "must be greater than zero",
            });
        }
        if self.registry.offline_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "registry.offline_timeout_secs",
                reason: "must be greater than zero",
            });
        }
        if self.remote.reply_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "remote.reply_timeout_ms",
                reason: "must be greater than zero",
            });
        }
        if self.storage.chains_file.is_empty() || self.storage.plugins_file.is_empty() {
            return Err(ConfigError::Invalid {
                field: "storage",
                reason: "file names must not be empty",
            });
        }
        if self
            .bus
            .subscribe
            .iter()
            .any(|pattern| validate_pattern(pattern).is_err())
        {
            return Err(ConfigError::Invalid {
                field: "bus.subscribe",
                reason: "contains a malformed topic pattern",
            });
        }
        Ok(())
    }
}

fn parse_number(key: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride {
            key,
            value,
            expected: "non-negative integer",
        })
}

/// Reads the settings file, applies environment overrides and validates the result.
///
/// A missing file yields the defaults (still subject to overrides).
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            }
            .into())
        }
    };

    let mut settings = Settings::parse(path, &text)?;
    settings.apply_overrides(|key| std::env::var(key).ok())?;
    settings.validate()?;
    Ok(settings)
}
