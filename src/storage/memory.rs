// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::errors::PersistenceError;
use crate::traits::Storage;

/// In-process storage. Used for ephemeral runs and in tests to observe saves.
pub struct MemoryStorage<T> {
    value: Mutex<Option<T>>,
    saves: AtomicUsize,
}

impl<T: Clone> MemoryStorage<T> {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
            saves: AtomicUsize::new(0),
        }
    }

    /// Pre-populated store, as if `value` had been saved by a previous process.
    pub fn with_value(value: T) -> Self {
        Self {
            value: Mutex::new(Some(value)),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> Option<T> {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<T: Clone> Default for MemoryStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send> Storage<T> for MemoryStorage<T> {
    fn load(&self) -> Result<Option<T>, PersistenceError> {
        Ok(self.current())
    }

    fn save(&self, value: &T) -> Result<(), PersistenceError> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(value.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
