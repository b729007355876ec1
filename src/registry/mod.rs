// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Plugin registry: identity, liveness and authorization of local and remote plugins.
//!
//! One [`PluginRegistry`] is shared by handle (`Arc`) with every component that needs
//! it. All reads and writes go through a single lock, and every successful mutation
//! is persisted through the injected [`Storage`] before the lock is released.
//!
//! ```
//! use morris::registry::{PluginRegistration, PluginRegistry, PluginStatus};
//!
//! let registry = PluginRegistry::in_memory();
//! registry
//!     .register(PluginRegistration::new("Uppercase", "local", "uppercases strings", "online"))
//!     .unwrap();
//!
//! assert_eq!(registry.get("Uppercase").unwrap().status, PluginStatus::Active);
//! ```

pub mod announce;
pub mod auth;
pub mod monitor;
pub mod record;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::errors::{PersistenceError, RegistryError, ValidationError};
use crate::observability::messages::registry::{
    LocalStatusesNormalized, PluginMarkedOffline, PluginRecordSkipped, PluginRegistered,
    PluginStatusUpdated, PluginUnregistered, RegistryLoadFailed, RegistryLoaded,
    RegistryPersistFailed, StatusUpdateRejected, UnknownPlugin,
};
use crate::observability::messages::StructuredLog;
use crate::storage::MemoryStorage;
use crate::traits::Storage;

pub use announce::AnnounceListener;
pub use auth::{bearer_token, StatusUpdate};
pub use monitor::{MonitorHandle, MonitorSettings, StatusMonitor};
pub use record::{PluginKind, PluginRecord, PluginRegistration, PluginStatus};

/// Plugin records keyed by name.
pub type PluginTable = BTreeMap<String, PluginRecord>;

/// The plugins file: raw JSON objects keyed by plugin name.
pub type StoredPlugins = Map<String, Value>;

pub struct PluginRegistry {
    plugins: Mutex<PluginTable>,
    /// Stored entries that failed to decode, written back untouched on every save.
    unreadable: Mutex<StoredPlugins>,
    storage: Arc<dyn Storage<StoredPlugins>>,
    monitor_claimed: AtomicBool,
}

impl PluginRegistry {
    /// Loads persisted records and restores the local-plugin invariant on them.
    ///
    /// Each entry is decoded on its own. One that cannot be decoded is logged and kept
    /// aside so later saves do not drop it. A store that cannot be read at all leaves
    /// the registry empty.
    pub fn new(storage: Arc<dyn Storage<StoredPlugins>>) -> Self {
        let stored = match storage.load() {
            Ok(stored) => stored.unwrap_or_default(),
            Err(error) => {
                RegistryLoadFailed { error: &error }.log();
                StoredPlugins::new()
            }
        };

        let mut plugins = PluginTable::new();
        let mut unreadable = StoredPlugins::new();
        for (key, value) in stored {
            match PluginRecord::from_stored(&key, value.clone()) {
                Ok(record) => {
                    plugins.insert(record.name.clone(), record);
                }
                Err(error) => {
                    PluginRecordSkipped {
                        name: &key,
                        error: &error,
                    }
                    .log();
                    unreadable.insert(key, value);
                }
            }
        }

        let normalized = plugins
            .values_mut()
            .map(PluginRecord::normalize_local)
            .filter(|changed| *changed)
            .count();

        RegistryLoaded {
            count: plugins.len(),
            skipped: unreadable.len(),
        }
        .log();

        let registry = Self {
            plugins: Mutex::new(plugins),
            unreadable: Mutex::new(unreadable),
            storage,
            monitor_claimed: AtomicBool::new(false),
        };

        if normalized > 0 {
            LocalStatusesNormalized { count: normalized }.log();
            let plugins = registry.lock();
            registry.persist(&plugins, "load");
        }
        registry
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::<StoredPlugins>::new()))
    }

    /// Independent copy of every record; later mutations do not show through.
    pub fn get_all(&self) -> PluginTable {
        self.lock().clone()
    }

    pub fn get(&self, name: &str) -> Option<PluginRecord> {
        self.lock().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Validates and upserts a registration made through the API.
    pub fn register(&self, registration: PluginRegistration) -> Result<PluginRecord, RegistryError> {
        self.upsert(registration, "api")
    }

    /// Same as [`register`](Self::register) for a raw JSON body.
    pub fn register_value(&self, value: Value) -> Result<PluginRecord, RegistryError> {
        self.register(PluginRegistration::from_value(value)?)
    }

    pub(crate) fn upsert(
        &self,
        registration: PluginRegistration,
        source: &str,
    ) -> Result<PluginRecord, RegistryError> {
        let mut record = registration.into_record(Utc::now())?;

        let mut plugins = self.lock();
        // An announce carries no secret; keep the one issued earlier.
        if record.api_key.is_none() {
            record.api_key = plugins
                .get(&record.name)
                .and_then(|existing| existing.api_key.clone());
        }
        plugins.insert(record.name.clone(), record.clone());
        self.unreadable_entries().remove(&record.name);
        self.persist(&plugins, "register");
        drop(plugins);

        PluginRegistered {
            name: &record.name,
            kind: record.kind.as_str(),
            source,
        }
        .log();
        Ok(record)
    }

    pub fn unregister(&self, name: &str) -> Result<PluginRecord, RegistryError> {
        let mut plugins = self.lock();
        let Some(removed) = plugins.remove(name) else {
            return Err(unknown(name, "unregister"));
        };
        self.persist(&plugins, "unregister");
        drop(plugins);

        PluginUnregistered { name }.log();
        Ok(removed)
    }

    /// Sets status, `last_seen` and optionally `details` on an existing remote plugin.
    pub fn update_status(
        &self,
        name: &str,
        status: PluginStatus,
        timestamp: DateTime<Utc>,
        details: Option<Map<String, Value>>,
    ) -> Result<PluginRecord, RegistryError> {
        let mut plugins = self.lock();
        let Some(record) = plugins.get_mut(name) else {
            return Err(unknown(name, "update status of"));
        };
        if record.is_local() {
            return Err(ValidationError::LocalPluginStatus {
                name: name.to_string(),
            }
            .into());
        }

        record.status = status;
        record.last_seen = Some(timestamp);
        if details.is_some() {
            record.details = details;
        }
        let updated = record.clone();
        self.persist(&plugins, "status update");
        drop(plugins);

        PluginStatusUpdated {
            name,
            status: status.as_str(),
        }
        .log();
        Ok(updated)
    }

    /// Status update presented by a plugin with its API key.
    ///
    /// Checks run in order: the plugin exists, the token equals its stored key, the
    /// status is one a plugin may report. Nothing is mutated unless all pass.
    pub fn authorized_status_update(
        &self,
        name: &str,
        bearer: &str,
        update: StatusUpdate,
    ) -> Result<PluginRecord, RegistryError> {
        let result = self
            .check_credentials(name, bearer)
            .and_then(|()| Ok(PluginStatus::parse_reported(&update.status)?))
            .and_then(|status| self.update_status(name, status, update.timestamp, update.details));

        if let Err(error) = &result {
            StatusUpdateRejected { name, error }.log();
        }
        result
    }

    fn check_credentials(&self, name: &str, bearer: &str) -> Result<(), RegistryError> {
        let plugins = self.lock();
        let record = plugins.get(name).ok_or_else(|| not_found(name))?;
        match record.api_key.as_deref() {
            Some(expected) if auth::token_matches(expected, auth::bearer_token(bearer)) => Ok(()),
            _ => Err(RegistryError::Unauthorized {
                name: name.to_string(),
            }),
        }
    }

    /// Replaces the plugin's API key with a freshly generated one and returns it.
    pub fn issue_api_key(&self, name: &str) -> Result<String, RegistryError> {
        let mut plugins = self.lock();
        let record = plugins.get_mut(name).ok_or_else(|| not_found(name))?;
        let key = auth::generate_api_key();
        record.api_key = Some(key.clone());
        self.persist(&plugins, "key issue");
        Ok(key)
    }

    /// Flips online remote plugins not seen for longer than `offline_timeout` to
    /// offline and returns their names. Never restores `online`.
    pub fn mark_stale_offline(&self, now: DateTime<Utc>, offline_timeout: Duration) -> Vec<String> {
        let mut plugins = self.lock();
        let mut flipped = Vec::new();

        for record in plugins.values_mut() {
            if record.is_local() || record.status != PluginStatus::Online {
                continue;
            }
            let Some(last_seen) = record.last_seen else {
                continue;
            };
            let Ok(since_seen) = (now - last_seen).to_std() else {
                continue;
            };
            if since_seen > offline_timeout {
                record.status = PluginStatus::Offline;
                PluginMarkedOffline {
                    name: &record.name,
                    since_seen,
                }
                .log();
                flipped.push(record.name.clone());
            }
        }

        if !flipped.is_empty() {
            self.persist(&plugins, "liveness sweep");
        }
        flipped
    }

    /// Marks the single liveness monitor slot as taken. False if already taken.
    pub(crate) fn claim_monitor(&self) -> bool {
        self.monitor_claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn release_monitor(&self) {
        self.monitor_claimed.store(false, Ordering::Release);
    }

    fn lock(&self) -> MutexGuard<'_, PluginTable> {
        self.plugins.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Always taken after `plugins`, never before.
    fn unreadable_entries(&self) -> MutexGuard<'_, StoredPlugins> {
        self.unreadable.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Saves under the caller's lock so the stored file never lags a later write.
    fn persist(&self, plugins: &PluginTable, operation: &str) {
        let saved = self
            .encode(plugins)
            .and_then(|stored| self.storage.save(&stored));
        if let Err(error) = saved {
            RegistryPersistFailed {
                operation,
                error: &error,
            }
            .log();
        }
    }

    fn encode(&self, plugins: &PluginTable) -> Result<StoredPlugins, PersistenceError> {
        let mut stored = self.unreadable_entries().clone();
        for (name, record) in plugins {
            stored.insert(name.clone(), serde_json::to_value(record).map_err(PersistenceError::Encode)?);
        }
        Ok(stored)
    }
}

fn unknown(name: &str, operation: &str) -> RegistryError {
    UnknownPlugin { name, operation }.log();
    not_found(name)
}

fn not_found(name: &str) -> RegistryError {
    RegistryError::NotFound {
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use serde_json::json;

    fn registry_with_storage() -> (PluginRegistry, Arc<MemoryStorage<StoredPlugins>>) {
        let storage = Arc::new(MemoryStorage::<StoredPlugins>::new());
        (PluginRegistry::new(storage.clone()), storage)
    }

    fn remote(name: &str) -> PluginRegistration {
        PluginRegistration::new(name, "remote", "remote sensor", "online")
    }

    #[test]
    fn test_register_local_forces_active() {
        let registry = PluginRegistry::in_memory();
        registry
            .register_value(json!({
                "name": "P1",
                "type": "local",
                "description": "d",
                "status": "online"
            }))
            .unwrap();

        let record = registry.get("P1").unwrap();
        assert_eq!(record.status, PluginStatus::Active);
        assert!(record.last_seen.is_none());
    }

    #[test]
    fn test_register_incomplete_mutates_nothing() {
        let (registry, storage) = registry_with_storage();
        let result = registry.register_value(json!({"name": "P1", "type": "remote"}));

        assert!(matches!(result, Err(RegistryError::Validation(_))));
        assert!(registry.is_empty());
        assert_eq!(storage.save_count(), 0);
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let (registry, storage) = registry_with_storage();

        registry.register(remote("TempSensor")).unwrap();
        registry
            .update_status("TempSensor", PluginStatus::Working, Utc::now(), None)
            .unwrap();
        registry.unregister("TempSensor").unwrap();

        assert_eq!(storage.save_count(), 3);
        assert_eq!(storage.current(), Some(StoredPlugins::new()));
    }

    #[test]
    fn test_unregister_unknown_fails_and_registry_stays_empty() {
        let (registry, storage) = registry_with_storage();

        let result = registry.unregister("ghost");

        assert_eq!(
            result.unwrap_err(),
            RegistryError::NotFound {
                name: "ghost".to_string()
            }
        );
        assert!(registry.get_all().is_empty());
        assert_eq!(storage.save_count(), 0);
    }

    #[test]
    fn test_update_status_unknown_fails_without_mutation() {
        let registry = PluginRegistry::in_memory();
        registry.register(remote("Other")).unwrap();
        let before = registry.get_all();

        let result = registry.update_status("P1", PluginStatus::Working, Utc::now(), None);

        assert!(matches!(result, Err(RegistryError::NotFound { .. })));
        assert_eq!(registry.get_all(), before);
    }

    #[test]
    fn test_update_status_on_local_plugin_rejected() {
        let registry = PluginRegistry::in_memory();
        registry
            .register(PluginRegistration::new("Uppercase", "local", "d", "active"))
            .unwrap();

        let result = registry.update_status("Uppercase", PluginStatus::Offline, Utc::now(), None);

        assert!(matches!(
            result,
            Err(RegistryError::Validation(ValidationError::LocalPluginStatus { .. }))
        ));
        assert_eq!(registry.get("Uppercase").unwrap().status, PluginStatus::Active);
    }

    #[test]
    fn test_snapshot_is_not_aliased() {
        let registry = PluginRegistry::in_memory();
        registry.register(remote("TempSensor")).unwrap();

        let snapshot = registry.get_all();
        registry
            .update_status("TempSensor", PluginStatus::Error, Utc::now(), None)
            .unwrap();
        registry.unregister("TempSensor").unwrap();

        assert_eq!(snapshot["TempSensor"].status, PluginStatus::Online);
    }

    #[test]
    fn test_authorized_status_update_check_order() {
        let registry = PluginRegistry::in_memory();
        registry.register(remote("TempSensor")).unwrap();

        let missing = registry.authorized_status_update("ghost", "x", StatusUpdate::new("online", Utc::now()));
        assert!(matches!(missing, Err(RegistryError::NotFound { .. })));

        // No key issued yet
        let keyless =
            registry.authorized_status_update("TempSensor", "", StatusUpdate::new("online", Utc::now()));
        assert!(matches!(keyless, Err(RegistryError::Unauthorized { .. })));

        let key = registry.issue_api_key("TempSensor").unwrap();

        let wrong = registry.authorized_status_update(
            "TempSensor",
            "Bearer nope",
            StatusUpdate::new("working", Utc::now()),
        );
        assert!(matches!(wrong, Err(RegistryError::Unauthorized { .. })));

        let bad_status = registry.authorized_status_update(
            "TempSensor",
            &key,
            StatusUpdate::new("active", Utc::now()),
        );
        assert!(matches!(bad_status, Err(RegistryError::Validation(_))));
        assert_eq!(registry.get("TempSensor").unwrap().status, PluginStatus::Online);

        let mut details = Map::new();
        details.insert("temperature".to_string(), json!(21.5));
        let timestamp = Utc::now();
        let updated = registry
            .authorized_status_update(
                "TempSensor",
                &format!("Bearer {}", key),
                StatusUpdate::new("working", timestamp).with_details(details.clone()),
            )
            .unwrap();

        assert_eq!(updated.status, PluginStatus::Working);
        assert_eq!(updated.last_seen, Some(timestamp));
        assert_eq!(updated.details, Some(details));
    }

    #[test]
    fn test_reannounce_keeps_issued_key() {
        let registry = PluginRegistry::in_memory();
        registry.register(remote("TempSensor")).unwrap();
        let key = registry.issue_api_key("TempSensor").unwrap();

        registry.register(remote("TempSensor")).unwrap();

        assert_eq!(registry.get("TempSensor").unwrap().api_key, Some(key));
    }

    #[test]
    fn test_issue_api_key_for_unknown_plugin() {
        let registry = PluginRegistry::in_memory();
        assert!(matches!(
            registry.issue_api_key("ghost"),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_stale_remote_plugins_go_offline() {
        let registry = PluginRegistry::in_memory();
        registry.register(remote("Stale")).unwrap();
        registry.register(remote("Fresh")).unwrap();
        registry
            .register(PluginRegistration::new("Uppercase", "local", "d", "active"))
            .unwrap();

        let now = Utc::now();
        registry
            .update_status("Stale", PluginStatus::Online, now - ChronoDuration::seconds(120), None)
            .unwrap();

        let flipped = registry.mark_stale_offline(now, Duration::from_secs(60));

        assert_eq!(flipped, vec!["Stale".to_string()]);
        assert_eq!(registry.get("Stale").unwrap().status, PluginStatus::Offline);
        assert_eq!(registry.get("Fresh").unwrap().status, PluginStatus::Online);
        assert_eq!(registry.get("Uppercase").unwrap().status, PluginStatus::Active);

        // Offline plugins are not revived by later sweeps
        assert!(registry
            .mark_stale_offline(now + ChronoDuration::seconds(600), Duration::from_secs(60))
            .contains(&"Fresh".to_string()));
        assert_eq!(registry.get("Stale").unwrap().status, PluginStatus::Offline);
    }

    #[test]
    fn test_load_normalizes_local_records() {
        let mut stored = StoredPlugins::new();
        stored.insert(
            "Uppercase".to_string(),
            json!({
                "name": "Uppercase",
                "type": "local",
                "description": "d",
                "status": "offline",
                "last_seen": "2024-05-01T12:30:15Z"
            }),
        );

        let storage = Arc::new(MemoryStorage::with_value(stored));
        let registry = PluginRegistry::new(storage.clone());

        let record = registry.get("Uppercase").unwrap();
        assert_eq!(record.status, PluginStatus::Active);
        assert!(record.last_seen.is_none());
        assert_eq!(storage.save_count(), 1);
    }

    #[test]
    fn test_monitor_slot_is_exclusive() {
        let registry = PluginRegistry::in_memory();
        assert!(registry.claim_monitor());
        assert!(!registry.claim_monitor());
        registry.release_monitor();
        assert!(registry.claim_monitor());
    }

    #[test]
    fn test_unreadable_record_is_skipped_and_kept_on_save() {
        let broken = json!({"name": "Broken", "type": "satellite", "status": "online"});
        let mut stored = StoredPlugins::new();
        stored.insert("Broken".to_string(), broken.clone());
        stored.insert(
            "Fresh".to_string(),
            json!({"name": "Fresh", "type": "remote", "description": "d", "status": "online"}),
        );

        let storage = Arc::new(MemoryStorage::with_value(stored));
        let registry = PluginRegistry::new(storage.clone());

        assert_eq!(registry.len(), 1);
        assert!(registry.get("Broken").is_none());

        registry.register(remote("New")).unwrap();

        let saved = storage.current().unwrap();
        assert_eq!(saved["Broken"], broken);
        assert!(saved.contains_key("Fresh"));
        assert!(saved.contains_key("New"));

        // A valid registration under the same name replaces the unreadable entry
        registry.register(remote("Broken")).unwrap();
        let saved = storage.current().unwrap();
        assert_eq!(saved["Broken"]["type"], json!("remote"));
    }

    #[test]
    fn test_loads_file_written_by_older_core() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugins.json");
        std::fs::write(
            &path,
            r#"{
  "TempSensor": {
    "name": "TempSensor",
    "type": "remote",
    "description": "Kitchen temperature",
    "status": "online",
    "last_seen": "2024-05-01T12:30:15.123456",
    "firmware": "1.4.2"
  },
  "Uppercase": {
    "name": "Uppercase",
    "type": "local",
    "description": "Uppercases strings",
    "status": "active"
  }
}"#,
        )
        .unwrap();

        let storage = Arc::new(crate::storage::JsonFileStorage::<StoredPlugins>::new(&path));
        let registry = PluginRegistry::new(storage.clone());

        let sensor = registry.get("TempSensor").unwrap();
        assert_eq!(sensor.status, PluginStatus::Online);
        assert_eq!(
            sensor.last_seen,
            Some(record::parse_timestamp("2024-05-01T12:30:15.123456Z").unwrap())
        );
        assert_eq!(sensor.extra["firmware"], json!("1.4.2"));
        assert_eq!(registry.get("Uppercase").unwrap().status, PluginStatus::Active);

        registry.register(remote("New")).unwrap();

        let reloaded = PluginRegistry::new(storage);
        let names: Vec<String> = reloaded.get_all().into_keys().collect();
        assert_eq!(names, vec!["New", "TempSensor", "Uppercase"]);
        assert_eq!(reloaded.get("TempSensor").unwrap().last_seen, sensor.last_seen);
    }
}
