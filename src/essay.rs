use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::formatter::{FormatMode, format_response};
use crate::generation::{GenerationClient, GenerationRequest};
use crate::id::{created_stamp, next_record_id};
use crate::prompts;
use crate::storage::{Storage, StorageError};
use crate::store::{CollectionStore, Record, StoreError};

/// Durable slot holding saved essays.
pub const ESSAYS_SLOT: &str = "savedEssays";
/// Durable slot holding the in-progress draft, as plain text.
pub const DRAFT_SLOT: &str = "currentEssay";
/// Durable slot holding the most recent feedback, as plain text.
pub const FEEDBACK_SLOT: &str = "lastFeedback";

/// A snapshot of the draft saved with title, emoji and notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedEssay {
    pub id: String,
    pub title: String,
    pub content: String,
    pub emoji: String,
    pub notes: String,
    #[serde(rename = "dateCreated", default)]
    pub created_at: String,
}

impl Record for SavedEssay {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Essay workspace: one persistent draft, its latest feedback, and the
/// saved-essay collection.
pub struct EssayAssistant {
    essays: CollectionStore<SavedEssay>,
    storage: Arc<dyn Storage>,
    generator: Arc<dyn GenerationClient>,
    model: String,
    draft: String,
    feedback: String,
}

impl EssayAssistant {
    /// Open the workspace, restoring the draft and last feedback.
    pub fn open(storage: Arc<dyn Storage>, generator: Arc<dyn GenerationClient>) -> Self {
        let essays = CollectionStore::open(ESSAYS_SLOT, storage.clone());
        let draft = read_plain(&storage, DRAFT_SLOT);
        let feedback = read_plain(&storage, FEEDBACK_SLOT);
        Self {
            essays,
            storage,
            generator,
            model: prompts::DEFAULT_MODEL.to_string(),
            draft,
            feedback,
        }
    }

    /// Override the model identifier sent with each request.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The in-progress draft.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replace the draft and persist it.
    ///
    /// On a failed write the new draft stays visible for the session but
    /// may not survive a reload.
    pub fn set_draft(&mut self, text: impl Into<String>) -> Result<(), StorageError> {
        self.draft = text.into();
        self.storage.put(DRAFT_SLOT, &self.draft)
    }

    /// The most recent feedback, already formatted.
    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    /// Ask the generation collaborator for feedback on the current draft.
    ///
    /// An empty draft short-circuits to the fixed coaching line; a failed
    /// request yields the fixed fallback message. The result is persisted
    /// and also returned.
    pub async fn request_feedback(&mut self) -> &str {
        if self.draft.trim().is_empty() {
            self.set_feedback(prompts::EMPTY_DRAFT);
            return &self.feedback;
        }
        let request = GenerationRequest::new(
            prompts::essay_feedback_message(&self.draft),
            prompts::ESSAY_PREAMBLE,
            self.model.clone(),
        );
        let generator = Arc::clone(&self.generator);
        match generator.generate(&request).await {
            Ok(raw) => self.set_feedback(format_response(&raw, FormatMode::Plain)),
            Err(e) => {
                warn!(error = %e, "essay feedback generation failed");
                self.set_feedback(prompts::FEEDBACK_FALLBACK);
            }
        }
        &self.feedback
    }

    /// Snapshot the current draft into the saved-essay collection.
    pub fn save(
        &mut self,
        title: impl Into<String>,
        emoji: impl Into<String>,
        notes: impl Into<String>,
    ) -> Result<&SavedEssay, StoreError> {
        let essay = SavedEssay {
            id: next_record_id(),
            title: title.into(),
            content: self.draft.clone(),
            emoji: emoji.into(),
            notes: notes.into(),
            created_at: created_stamp(),
        };
        let records = self.essays.add(essay)?;
        Ok(records.last().expect("record was just appended"))
    }

    /// Saved essays in insertion order.
    pub fn saved(&self) -> &[SavedEssay] {
        self.essays.records()
    }

    /// Delete a saved essay; deleting an unknown id is a no-op.
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.essays.remove(id)?;
        Ok(())
    }

    fn set_feedback(&mut self, text: impl Into<String>) {
        self.feedback = text.into();
        if let Err(e) = self.storage.put(FEEDBACK_SLOT, &self.feedback) {
            warn!(error = %e, "feedback may not survive a reload");
        }
    }
}

fn read_plain(storage: &Arc<dyn Storage>, slot: &str) -> String {
    match storage.get(slot) {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            warn!(%slot, error = %e, "slot read failed, starting empty");
            String::new()
        }
    }
}
