use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::formatter::{FormatMode, format_response};
use crate::generation::{GenerationClient, GenerationRequest};
use crate::id::{created_stamp, next_record_id};
use crate::prompts;
use crate::storage::Storage;
use crate::store::{CollectionStore, Record, StoreError};

/// Durable slot holding saved letter requests.
pub const LETTERS_SLOT: &str = "recommendationRequests";

/// One saved recommendation-letter request with its generated content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterRequest {
    pub id: String,
    #[serde(rename = "teacherName")]
    pub teacher_name: String,
    pub subject: String,
    pub style: String,
    pub content: String,
    #[serde(rename = "dateCreated", default)]
    pub created_at: String,
}

impl Record for LetterRequest {
    fn id(&self) -> &str {
        &self.id
    }
}

/// An unsaved generated letter and the form fields that produced it.
#[derive(Debug, Clone)]
struct PendingLetter {
    teacher_name: String,
    subject: String,
    style: String,
    content: String,
}

/// Letter workspace: generate a draft, then snapshot it into the saved
/// collection.
pub struct LetterDesk {
    requests: CollectionStore<LetterRequest>,
    generator: Arc<dyn GenerationClient>,
    model: String,
    pending: Option<PendingLetter>,
}

impl LetterDesk {
    pub fn open(storage: Arc<dyn Storage>, generator: Arc<dyn GenerationClient>) -> Self {
        Self {
            requests: CollectionStore::open(LETTERS_SLOT, storage),
            generator,
            model: prompts::DEFAULT_MODEL.to_string(),
            pending: None,
        }
    }

    /// Override the model identifier sent with each request.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The generated-but-unsaved letter, if any.
    pub fn letter(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.content.as_str())
    }

    /// Saved letter requests in insertion order.
    pub fn saved(&self) -> &[LetterRequest] {
        self.requests.records()
    }

    /// Generate a letter draft for the given teacher, subject and style.
    ///
    /// Both `teacher_name` and `subject` are required; with either missing
    /// the fixed coaching line comes back and nothing is generated. A
    /// failed request yields the fixed fallback message and discards any
    /// previous draft.
    pub async fn generate(&mut self, teacher_name: &str, subject: &str, style: &str) -> &str {
        if teacher_name.trim().is_empty() || subject.trim().is_empty() {
            return prompts::LETTER_MISSING_FIELDS;
        }
        let request = GenerationRequest::new(
            prompts::letter_message(teacher_name, subject, style),
            prompts::LETTER_PREAMBLE,
            self.model.clone(),
        );
        let generator = Arc::clone(&self.generator);
        match generator.generate(&request).await {
            Ok(raw) => {
                let content = format_response(&raw, FormatMode::Plain);
                let pending = self.pending.insert(PendingLetter {
                    teacher_name: teacher_name.to_string(),
                    subject: subject.to_string(),
                    style: style.to_string(),
                    content,
                });
                &pending.content
            }
            Err(e) => {
                warn!(error = %e, "letter generation failed");
                self.pending = None;
                prompts::LETTER_FALLBACK
            }
        }
    }

    /// Snapshot the current draft into the saved collection and reset the
    /// form. Without a draft this is a no-op returning `Ok(None)`.
    pub fn save(&mut self) -> Result<Option<&LetterRequest>, StoreError> {
        let Some(pending) = self.pending.take() else {
            return Ok(None);
        };
        let request = LetterRequest {
            id: next_record_id(),
            teacher_name: pending.teacher_name,
            subject: pending.subject,
            style: pending.style,
            content: pending.content,
            created_at: created_stamp(),
        };
        let records = self.requests.add(request)?;
        Ok(records.last())
    }

    /// Delete a saved request; deleting an unknown id is a no-op.
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.requests.remove(id)?;
        Ok(())
    }
}
