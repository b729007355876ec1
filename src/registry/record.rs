// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    Local,
    Remote,
}

impl PluginKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginKind::Local => "local",
            PluginKind::Remote => "remote",
        }
    }
}

impl FromStr for PluginKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "local" => Ok(PluginKind::Local),
            "remote" => Ok(PluginKind::Remote),
            other => Err(ValidationError::InvalidKind {
                value: other.to_string(),
            }),
        }
    }
}

/// Liveness state of a plugin. `Active` is reserved for local plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginStatus {
    Active,
    Online,
    Offline,
    Error,
    Working,
}

impl PluginStatus {
    const ALL: &'static str = "active, online, offline, error, working";
    const REPORTABLE: &'static str = "online, offline, error, working";

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginStatus::Active => "active",
            PluginStatus::Online => "online",
            PluginStatus::Offline => "offline",
            PluginStatus::Error => "error",
            PluginStatus::Working => "working",
        }
    }

    /// Parses a status a remote plugin may report about itself.
    pub fn parse_reported(value: &str) -> Result<Self, ValidationError> {
        match value.parse::<PluginStatus>() {
            Ok(PluginStatus::Active) | Err(_) => Err(ValidationError::InvalidStatus {
                value: value.to_string(),
                allowed: Self::REPORTABLE,
            }),
            Ok(status) => Ok(status),
        }
    }
}

impl FromStr for PluginStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(PluginStatus::Active),
            "online" => Ok(PluginStatus::Online),
            "offline" => Ok(PluginStatus::Offline),
            "error" => Ok(PluginStatus::Error),
            "working" => Ok(PluginStatus::Working),
            other => Err(ValidationError::InvalidStatus {
                value: other.to_string(),
                allowed: Self::ALL,
            }),
        }
    }
}

impl fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered plugin as stored in the plugins file.
///
/// Fields the core does not interpret (firmware versions, capabilities, ...) are kept
/// verbatim in `extra` and written back on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PluginKind,
    pub description: String,
    pub status: PluginStatus,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "lenient_timestamp")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PluginRecord {
    /// Decodes one entry of the plugins file. A missing `name` is taken from the key.
    pub fn from_stored(key: &str, mut value: Value) -> Result<Self, serde_json::Error> {
        if let Value::Object(fields) = &mut value {
            fields
                .entry("name")
                .or_insert_with(|| Value::String(key.to_string()));
        }
        serde_json::from_value(value)
    }

    pub fn is_local(&self) -> bool {
        self.kind == PluginKind::Local
    }

    /// Restores the local-plugin invariant. Returns true if anything changed.
    pub(crate) fn normalize_local(&mut self) -> bool {
        if !self.is_local() {
            return false;
        }
        let changed = self.status != PluginStatus::Active || self.last_seen.is_some();
        self.status = PluginStatus::Active;
        self.last_seen = None;
        changed
    }
}

/// An unvalidated registration, as received from an announce message or an API call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginRegistration {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub details: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PluginRegistration {
    pub fn new(name: &str, kind: &str, description: &str, status: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            kind: Some(kind.to_string()),
            description: Some(description.to_string()),
            status: Some(status.to_string()),
            ..Self::default()
        }
    }

    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        if !value.is_object() {
            return Err(ValidationError::NotAnObject);
        }
        let mut registration: PluginRegistration =
            serde_json::from_value(value).map_err(|_| ValidationError::InvalidField {
                field: "plugin",
                expected: "string fields name, type, description and status",
            })?;
        // Submitted timestamps are ignored; the registry stamps its own.
        registration.extra.remove("last_seen");
        Ok(registration)
    }

    /// Validates the draft and applies the kind-specific invariants.
    pub fn into_record(self, now: DateTime<Utc>) -> Result<PluginRecord, ValidationError> {
        let name = required(self.name, "name")?;
        let kind: PluginKind = required(self.kind, "type")?.parse()?;
        let description = required(self.description, "description")?;
        let status: PluginStatus = required(self.status, "status")?.parse()?;

        let mut record = PluginRecord {
            name,
            kind,
            description,
            status,
            last_seen: Some(now),
            api_key: self.api_key.filter(|key| !key.is_empty()),
            details: self.details,
            extra: self.extra,
        };
        record.normalize_local();
        Ok(record)
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ValidationError::MissingField { field }),
    }
}

/// Parses an RFC 3339 timestamp, or one without an offset, which is taken as UTC.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text)
        .map(|parsed| parsed.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").map(|naive| naive.and_utc())
        })
}

/// `last_seen` as written by older cores, which stored naive ISO timestamps.
mod lenient_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(timestamp) => {
                serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|text| super::parse_timestamp(&text).map_err(D::Error::custom))
            .transpose()
    }
}
