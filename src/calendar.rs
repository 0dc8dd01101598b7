use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::id::{created_stamp, next_record_id};
use crate::storage::Storage;
use crate::store::{CollectionStore, Record, StoreError};

/// Durable slot holding deadline events.
pub const CALENDAR_SLOT: &str = "calendarEvents";

/// What kind of deadline an event tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Essay,
    Application,
    Recommendation,
    Test,
    Other,
}

/// Progress of one deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
}

/// One application deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlineEvent {
    pub id: String,
    pub title: String,
    /// ISO date (`YYYY-MM-DD`); lexicographic order is date order.
    pub date: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub status: EventStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(rename = "dateCreated", default)]
    pub created_at: String,
}

impl Record for DeadlineEvent {
    fn id(&self) -> &str {
        &self.id
    }
}

/// The deadline calendar: stored in insertion order, displayed by date.
pub struct Calendar {
    events: CollectionStore<DeadlineEvent>,
}

impl Calendar {
    pub fn open(storage: Arc<dyn Storage>) -> Self {
        Self {
            events: CollectionStore::open(CALENDAR_SLOT, storage),
        }
    }

    /// Events in stored (insertion) order.
    pub fn events(&self) -> &[DeadlineEvent] {
        self.events.records()
    }

    /// Events sorted by date ascending. A view-time projection, never a
    /// mutation of stored order.
    pub fn upcoming(&self) -> Vec<&DeadlineEvent> {
        let mut view: Vec<&DeadlineEvent> = self.events.records().iter().collect();
        view.sort_by(|a, b| a.date.cmp(&b.date));
        view
    }

    /// Create a new event.
    pub fn add_event(
        &mut self,
        title: impl Into<String>,
        date: impl Into<String>,
        kind: EventKind,
        status: EventStatus,
        notes: impl Into<String>,
    ) -> Result<&DeadlineEvent, StoreError> {
        let event = DeadlineEvent {
            id: next_record_id(),
            title: title.into(),
            date: date.into(),
            kind,
            status,
            notes: notes.into(),
            created_at: created_stamp(),
        };
        let records = self.events.add(event)?;
        Ok(records.last().expect("record was just appended"))
    }

    /// Replace an edited event wholesale, keyed by its id.
    pub fn update_event(&mut self, event: DeadlineEvent) -> Result<(), StoreError> {
        let id = event.id.clone();
        self.events.update(&id, event)?;
        Ok(())
    }

    /// Move an event to a new status.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when no event has `id`. Unlike deletion,
    /// a status change on a missing event is a real error.
    pub fn set_status(&mut self, id: &str, status: EventStatus) -> Result<(), StoreError> {
        let mut event = self
            .events
            .find(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        event.status = status;
        self.events.update(id, event)?;
        Ok(())
    }

    /// Delete an event; deleting an unknown id is a no-op.
    pub fn remove_event(&mut self, id: &str) -> Result<(), StoreError> {
        self.events.remove(id)?;
        Ok(())
    }
}
