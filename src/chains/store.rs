// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use super::definition::{ChainDefinition, ChainTable};
use super::validation::validate_definition;
use crate::errors::{ChainStoreError, PersistenceError, ValidationError};
use crate::observability::messages::chains::{
    ChainRejected, ChainRemoved, ChainStored, ChainsLoadFailed, ChainsLoaded, ChainsPersistFailed,
    DuplicateTrigger,
};
use crate::observability::messages::StructuredLog;
use crate::storage::MemoryStorage;
use crate::traits::Storage;

/// The chains file as stored: `id -> definition`, insertion ordered.
pub type StoredChains = Map<String, Value>;

/// Validated chain definitions, persisted on every mutation.
///
/// Persistence overwrites the whole store; a crash mid-save can lose the file's
/// previous contents. Save failures are logged and the in-memory table stays
/// authoritative.
pub struct ChainStore {
    chains: Mutex<ChainTable>,
    storage: Arc<dyn Storage<StoredChains>>,
}

impl ChainStore {
    /// Creates the store and loads whatever the storage holds.
    pub fn new(storage: Arc<dyn Storage<StoredChains>>) -> Self {
        let store = Self {
            chains: Mutex::new(ChainTable::new()),
            storage,
        };
        if let Err(error) = store.load() {
            ChainsLoadFailed { error: &error }.log();
        }
        store
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::<StoredChains>::new()))
    }

    /// Re-reads the storage, replacing the in-memory table.
    ///
    /// Invalid entries are logged and skipped; the valid ones are kept in file order.
    pub fn load(&self) -> Result<ChainTable, PersistenceError> {
        let stored = self.storage.load()?.unwrap_or_default();

        let mut table = ChainTable::new();
        let mut rejected = 0;
        for (chain_id, value) in stored {
            match validate_definition(&value) {
                Ok(chain) => {
                    warn_on_shared_trigger(&table, &chain_id, &chain);
                    table.insert(chain_id, chain);
                }
                Err(error) => {
                    ChainRejected {
                        chain_id: &chain_id,
                        error: &error,
                    }
                    .log();
                    rejected += 1;
                }
            }
        }

        ChainsLoaded {
            loaded: table.len(),
            rejected,
        }
        .log();

        *self.lock() = table.clone();
        Ok(table)
    }

    pub fn validate(definition: &Value) -> bool {
        validate_definition(definition).is_ok()
    }

    /// Upserts a typed definition and persists.
    pub fn add(&self, chain_id: &str, chain: ChainDefinition) -> Result<(), ChainStoreError> {
        let value = serde_json::to_value(&chain).map_err(|_| ChainStoreError::Validation {
            chain_id: chain_id.to_string(),
            source: ValidationError::NotAnObject,
        })?;
        self.add_raw(chain_id, &value).map(|_| ())
    }

    /// Validates an untyped definition (as posted by a client), then upserts and persists.
    pub fn add_raw(&self, chain_id: &str, definition: &Value) -> Result<ChainDefinition, ChainStoreError> {
        let validated = if chain_id.trim().is_empty() {
            Err(ValidationError::MissingField { field: "id" })
        } else {
            validate_definition(definition)
        };

        let chain = validated.map_err(|source| {
            ChainRejected {
                chain_id,
                error: &source,
            }
            .log();
            ChainStoreError::Validation {
                chain_id: chain_id.to_string(),
                source,
            }
        })?;

        let mut chains = self.lock();
        warn_on_shared_trigger(&chains, chain_id, &chain);
        chains.insert(chain_id.to_string(), chain.clone());
        self.persist(&chains);
        drop(chains);

        ChainStored {
            chain_id,
            trigger: &chain.trigger,
        }
        .log();
        Ok(chain)
    }

    pub fn remove(&self, chain_id: &str) -> Result<ChainDefinition, ChainStoreError> {
        let mut chains = self.lock();
        let removed = chains
            .remove(chain_id)
            .ok_or_else(|| ChainStoreError::NotFound {
                chain_id: chain_id.to_string(),
            })?;
        self.persist(&chains);
        drop(chains);

        ChainRemoved { chain_id }.log();
        Ok(removed)
    }

    pub fn get(&self, chain_id: &str) -> Option<ChainDefinition> {
        self.lock().get(chain_id).cloned()
    }

    pub fn list(&self) -> ChainTable {
        self.lock().clone()
    }

    /// First chain in insertion order whose trigger equals `trigger`.
    pub fn find_by_trigger(&self, trigger: &str) -> Option<(String, ChainDefinition)> {
        self.lock()
            .find_by_trigger(trigger)
            .map(|(id, chain)| (id.to_string(), chain.clone()))
    }

    fn lock(&self) -> MutexGuard<'_, ChainTable> {
        self.chains.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, chains: &ChainTable) {
        let result = chains
            .to_stored()
            .map_err(PersistenceError::Encode)
            .and_then(|stored| self.storage.save(&stored));
        if let Err(error) = result {
            ChainsPersistFailed { error: &error }.log();
        }
    }
}

fn warn_on_shared_trigger(table: &ChainTable, chain_id: &str, chain: &ChainDefinition) {
    if let Some((existing, _)) = table.find_by_trigger(&chain.trigger) {
        if existing != chain_id {
            DuplicateTrigger {
                trigger: &chain.trigger,
                winning_chain: existing,
                shadowed_chain: chain_id,
            }
            .log();
        }
    }
}
