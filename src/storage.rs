use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

/// Errors raised by a [`Storage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage slot could not be read or written")]
    Io(#[from] std::io::Error),
    #[error("storage slot rewrite could not be completed")]
    Swap(#[from] tempfile::PersistError),
    #[error("slot value could not be encoded")]
    Encode(#[from] serde_json::Error),
}

/// String-keyed, string-valued durable storage.
///
/// One slot holds one collection's serialized state. The store owns the
/// serialization format; implementations treat values as opaque. No two
/// features may share a slot name.
pub trait Storage: Send + Sync {
    /// Read a slot. Absent slots are `Ok(None)`.
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite a slot with the given value.
    fn put(&self, slot: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a slot. Removing an absent slot succeeds.
    fn delete(&self, slot: &str) -> Result<(), StorageError>;
}

impl<S> Storage for std::sync::Arc<S>
where
    S: Storage + ?Sized,
{
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError> {
        (**self).get(slot)
    }

    fn put(&self, slot: &str, value: &str) -> Result<(), StorageError> {
        (**self).put(slot, value)
    }

    fn delete(&self, slot: &str) -> Result<(), StorageError> {
        (**self).delete(slot)
    }
}

/// In-memory [`Storage`] used for tests and ephemeral sessions.
///
/// # Examples
///
/// ```
/// use lomo::{MemoryStorage, Storage};
///
/// let storage = MemoryStorage::new();
/// storage.put("chatHistory", "[]").unwrap();
/// assert_eq!(storage.get("chatHistory").unwrap().as_deref(), Some("[]"));
/// ```
#[derive(Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.lock().unwrap().get(slot).cloned())
    }

    fn put(&self, slot: &str, value: &str) -> Result<(), StorageError> {
        self.slots
            .lock()
            .unwrap()
            .insert(slot.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, slot: &str) -> Result<(), StorageError> {
        self.slots.lock().unwrap().remove(slot);
        Ok(())
    }
}

/// File-backed [`Storage`] keeping one JSON file per slot under a root
/// directory.
///
/// Writes land in a temporary file in the same directory and are renamed
/// into place, so a crash mid-write leaves the previous value intact.
pub struct DirStorage {
    root: PathBuf,
}

impl DirStorage {
    /// Open (creating if needed) a storage directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.root.join(format!("{slot}.json"))
    }

    /// Root directory holding the slot files.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Storage for DirStorage {
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.slot_path(slot)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, slot: &str, value: &str) -> Result<(), StorageError> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(self.slot_path(slot))?;
        Ok(())
    }

    fn delete(&self, slot: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.slot_path(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_round_trip() {
        let storage = MemoryStorage::new();
        assert!(storage.get("savedEssays").unwrap().is_none());
        storage.put("savedEssays", "[1]").unwrap();
        assert_eq!(storage.get("savedEssays").unwrap().as_deref(), Some("[1]"));
        storage.delete("savedEssays").unwrap();
        assert!(storage.get("savedEssays").unwrap().is_none());
    }

    #[test]
    fn delete_is_idempotent() {
        let storage = MemoryStorage::new();
        storage.delete("missing").unwrap();
        storage.delete("missing").unwrap();
    }

    #[test]
    fn dir_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DirStorage::open(dir.path()).unwrap();
        assert!(storage.get("calendarEvents").unwrap().is_none());
        storage.put("calendarEvents", "[]").unwrap();
        assert_eq!(
            storage.get("calendarEvents").unwrap().as_deref(),
            Some("[]")
        );
        storage.delete("calendarEvents").unwrap();
        storage.delete("calendarEvents").unwrap();
        assert!(storage.get("calendarEvents").unwrap().is_none());
    }

    #[test]
    fn dir_overwrite_replaces_value() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DirStorage::open(dir.path()).unwrap();
        storage.put("user", "old").unwrap();
        storage.put("user", "new").unwrap();
        assert_eq!(storage.get("user").unwrap().as_deref(), Some("new"));
    }
}
