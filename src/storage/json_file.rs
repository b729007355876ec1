// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::PersistenceError;
use crate::traits::Storage;

/// Pretty-printed JSON file holding one value of `T`.
pub struct JsonFileStorage<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStorage<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> Storage<T> for JsonFileStorage<T>
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self) -> Result<Option<T>, PersistenceError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistenceError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| PersistenceError::Json {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, value: &T) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let text = serde_json::to_string_pretty(value).map_err(|source| PersistenceError::Json {
            path: self.path.clone(),
            source,
        })?;

        fs::write(&self.path, text).map_err(|source| PersistenceError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = tempdir().unwrap();
        let storage: JsonFileStorage<BTreeMap<String, u32>> =
            JsonFileStorage::new(dir.path().join("absent.json"));

        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_save_creates_parent_directories_and_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("plugins.json");
        let storage = JsonFileStorage::new(&path);

        let first = BTreeMap::from([("a".to_string(), 1u32)]);
        storage.save(&first).unwrap();
        let second = BTreeMap::from([("b".to_string(), 2u32)]);
        storage.save(&second).unwrap();

        assert!(path.exists());
        assert_eq!(storage.load().unwrap(), Some(second));
    }

    #[test]
    fn test_corrupt_file_reports_json_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chains.json");
        fs::write(&path, "{ not json").unwrap();
        let storage: JsonFileStorage<BTreeMap<String, u32>> = JsonFileStorage::new(&path);

        match storage.load() {
            Err(PersistenceError::Json { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected JSON error, got {:?}", other),
        }
    }
}
