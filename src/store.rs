use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::storage::{Storage, StorageError};

/// A record that can live in a [`CollectionStore`].
///
/// Every saved-items feature stores records of one declared shape per
/// collection; the only structural requirement is a stable string id,
/// generated at creation time via [`crate::next_record_id`].
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Id unique within the record's collection.
    fn id(&self) -> &str;
}

/// Errors raised by [`CollectionStore`] mutations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Caller supplied an id that is already present. Programmer misuse;
    /// ids come from [`crate::next_record_id`] and should never collide.
    #[error("record `{0}` already exists in this collection")]
    DuplicateId(String),
    /// `update` targeted an id that is not in the collection.
    #[error("no record `{0}` in this collection")]
    NotFound(String),
    /// The slot write failed. The in-memory sequence still holds the
    /// attempted change; it may not survive a reload.
    #[error("collection write did not reach durable storage")]
    Persistence(#[source] StorageError),
}

/// An ordered, uniquely-keyed collection of records mirrored to one durable
/// storage slot.
///
/// Each mutation re-serializes the full collection to its slot before the
/// in-memory view is considered authoritative, so a fresh [`load`] always
/// equals the last successful write. Collections are bounded by a single
/// user's manual data entry, which keeps the O(n) rewrite cheap.
///
/// [`load`]: CollectionStore::load
///
/// # Examples
///
/// ```
/// use lomo::{ChatMessage, CollectionStore, MemoryStorage};
/// use std::sync::Arc;
///
/// let storage = Arc::new(MemoryStorage::new());
/// let mut store: CollectionStore<ChatMessage> =
///     CollectionStore::open("chatHistory", storage);
/// store.add(ChatMessage::from_user("hello")).unwrap();
/// assert_eq!(store.records().len(), 1);
/// ```
pub struct CollectionStore<R> {
    slot: String,
    storage: Arc<dyn Storage>,
    records: Vec<R>,
}

impl<R: Record> CollectionStore<R> {
    /// Open a collection backed by `slot`, materializing whatever the slot
    /// currently holds.
    pub fn open(slot: impl Into<String>, storage: Arc<dyn Storage>) -> Self {
        let mut store = Self {
            slot: slot.into(),
            storage,
            records: Vec::new(),
        };
        store.load();
        store
    }

    /// Re-read the slot. An absent or unparseable slot yields an empty
    /// collection; partially parsed data is never mixed with defaults.
    pub fn load(&mut self) -> &[R] {
        self.records = match self.storage.get(&self.slot) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(records) => records,
                Err(e) => {
                    warn!(slot = %self.slot, error = %e, "unreadable slot data, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "slot read failed, starting empty");
                Vec::new()
            }
        };
        &self.records
    }

    /// Current in-memory sequence, in insertion order.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Find a record by id.
    pub fn find(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Slot name backing this collection.
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Append a record and persist the full sequence.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateId`] if the id is already present (the stored
    /// sequence is left untouched); [`StoreError::Persistence`] if the slot
    /// write fails after the in-memory append.
    pub fn add(&mut self, record: R) -> Result<&[R], StoreError> {
        if self.records.iter().any(|r| r.id() == record.id()) {
            return Err(StoreError::DuplicateId(record.id().to_string()));
        }
        debug!(slot = %self.slot, id = %record.id(), "add record");
        self.records.push(record);
        self.persist()?;
        Ok(&self.records)
    }

    /// Replace the record with `id` in place, preserving order, and persist.
    ///
    /// Callers construct the full replacement record; the store never
    /// patches individual fields.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no record has `id`;
    /// [`StoreError::Persistence`] on a failed slot write.
    pub fn update(&mut self, id: &str, replacement: R) -> Result<&[R], StoreError> {
        let pos = self
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        debug!(slot = %self.slot, %id, "update record");
        self.records[pos] = replacement;
        self.persist()?;
        Ok(&self.records)
    }

    /// Remove the record with `id`, if present, and persist.
    ///
    /// Removing an absent id is a no-op: duplicate delete requests (a rapid
    /// double-click) must not raise.
    pub fn remove(&mut self, id: &str) -> Result<&[R], StoreError> {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        if self.records.len() == before {
            return Ok(&self.records);
        }
        debug!(slot = %self.slot, %id, "remove record");
        self.persist()?;
        Ok(&self.records)
    }

    /// Reset the collection and its slot to empty.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        debug!(slot = %self.slot, "clear collection");
        self.records.clear();
        self.persist()
    }

    fn persist(&self) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(&self.records)
            .map_err(|e| StoreError::Persistence(e.into()))?;
        self.storage
            .put(&self.slot, &encoded)
            .map_err(StoreError::Persistence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        body: String,
    }

    impl Record for Note {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn note(id: &str, body: &str) -> Note {
        Note {
            id: id.into(),
            body: body.into(),
        }
    }

    #[test]
    fn add_then_reload_round_trips() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store: CollectionStore<Note> = CollectionStore::open("notes", storage.clone());
        store.add(note("a", "first")).unwrap();
        store.add(note("b", "second")).unwrap();

        let mut fresh: CollectionStore<Note> = CollectionStore::open("notes", storage);
        assert_eq!(fresh.load(), store.records());
    }

    #[test]
    fn duplicate_add_fails_and_leaves_slot_unchanged() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store: CollectionStore<Note> = CollectionStore::open("notes", storage.clone());
        store.add(note("a", "first")).unwrap();
        let before = storage.get("notes").unwrap();

        let err = store.add(note("a", "again")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(id) if id == "a"));
        assert_eq!(storage.get("notes").unwrap(), before);
        assert_eq!(store.records().len(), 1);
    }

    #[test]
    fn update_replaces_in_place() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store: CollectionStore<Note> = CollectionStore::open("notes", storage);
        store.add(note("a", "first")).unwrap();
        store.add(note("b", "second")).unwrap();

        store.update("a", note("a", "revised")).unwrap();
        assert_eq!(store.records()[0].body, "revised");
        assert_eq!(store.records()[1].body, "second");
    }

    #[test]
    fn update_of_missing_id_errors() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store: CollectionStore<Note> = CollectionStore::open("notes", storage);
        let err = store.update("ghost", note("ghost", "x")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "ghost"));
    }

    #[test]
    fn remove_twice_is_idempotent() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store: CollectionStore<Note> = CollectionStore::open("notes", storage);
        store.add(note("a", "first")).unwrap();
        store.add(note("b", "second")).unwrap();

        let after_first: Vec<Note> = store.remove("a").unwrap().to_vec();
        let after_second: Vec<Note> = store.remove("a").unwrap().to_vec();
        assert_eq!(after_first, after_second);
        assert_eq!(after_first.len(), 1);
    }

    #[test]
    fn corrupt_slot_loads_as_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.put("notes", "{not json").unwrap();
        let store: CollectionStore<Note> = CollectionStore::open("notes", storage);
        assert!(store.records().is_empty());
    }

    #[test]
    fn clear_empties_slot() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store: CollectionStore<Note> = CollectionStore::open("notes", storage.clone());
        store.add(note("a", "first")).unwrap();
        store.clear().unwrap();
        assert!(store.records().is_empty());
        assert_eq!(storage.get("notes").unwrap().as_deref(), Some("[]"));
    }
}
