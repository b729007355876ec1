use crate::errors::PersistenceError;

/// Load/save collaborator for a whole mapping (chains or plugin records).
///
/// Atomicity and backups are the implementation's concern; callers only rely on
/// "the last successful save is what the next load returns".
pub trait Storage<T>: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<T>, PersistenceError>;

    fn save(&self, value: &T) -> Result<(), PersistenceError>;
}
