use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::generation::{GenerationClient, GenerationRequest};
use crate::id::{created_stamp, next_record_id};
use crate::prompts;
use crate::storage::Storage;
use crate::store::{CollectionStore, Record, StoreError};

/// Durable slot holding saved activities.
pub const ACTIVITIES_SLOT: &str = "savedActivities";

/// One extracurricular suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub description: String,
    pub added: bool,
    #[serde(rename = "dateCreated", default)]
    pub created_at: String,
}

impl Activity {
    fn suggestion(name: &str, description: &str) -> Self {
        Self {
            id: next_record_id(),
            name: name.to_string(),
            description: description.to_string(),
            added: false,
            created_at: created_stamp(),
        }
    }
}

impl Record for Activity {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Shape of one entry in the generated JSON array.
#[derive(Debug, Deserialize)]
struct GeneratedActivity {
    name: String,
    description: String,
}

const STARTERS: [(&str, &str); 4] = [
    (
        "Volunteer Coach for Youth Sports",
        "Share your athletic skills by coaching younger athletes in your sport.",
    ),
    (
        "Sports Analytics Club",
        "Start or join a club that analyzes sports data and statistics.",
    ),
    (
        "Athletic Leadership Program",
        "Participate in a program that develops leadership skills in student-athletes.",
    ),
    (
        "Sports Journalism",
        "Write for your school newspaper or start a sports blog.",
    ),
];

/// Extracurricular board: an ephemeral suggestion list plus the saved
/// collection.
///
/// Suggestions live only for the session; saved activities persist. A
/// suggestion whose name already appears in the saved collection shows as
/// added.
pub struct ActivityBoard {
    saved: CollectionStore<Activity>,
    suggestions: Vec<Activity>,
    generator: Arc<dyn GenerationClient>,
    model: String,
}

impl ActivityBoard {
    /// Open the board with the built-in starter suggestions.
    pub fn open(storage: Arc<dyn Storage>, generator: Arc<dyn GenerationClient>) -> Self {
        let saved = CollectionStore::open(ACTIVITIES_SLOT, storage);
        let mut suggestions: Vec<Activity> = STARTERS
            .iter()
            .map(|&(name, description)| Activity::suggestion(name, description))
            .collect();
        for suggestion in &mut suggestions {
            suggestion.added = saved.records().iter().any(|a: &Activity| a.name == suggestion.name);
        }
        Self {
            saved,
            suggestions,
            generator,
            model: prompts::DEFAULT_MODEL.to_string(),
        }
    }

    /// Override the model identifier sent with each request.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Suggestions not yet saved.
    pub fn suggestions(&self) -> Vec<&Activity> {
        self.suggestions.iter().filter(|a| !a.added).collect()
    }

    /// Saved activities in insertion order.
    pub fn saved(&self) -> &[Activity] {
        self.saved.records()
    }

    /// Ask the generation collaborator for a fresh batch of suggestions.
    ///
    /// The reply is expected to carry a JSON array of `{name, description}`
    /// somewhere in its text; surrounding prose is tolerated. A failed
    /// request leaves the current suggestions in place; an unparseable
    /// reply clears them.
    pub async fn generate_more(&mut self) -> &[Activity] {
        let request = GenerationRequest::new(
            prompts::ACTIVITIES_MESSAGE,
            prompts::ACTIVITIES_PREAMBLE,
            self.model.clone(),
        );
        let generator = Arc::clone(&self.generator);
        match generator.generate(&request).await {
            Ok(raw) => {
                self.suggestions = parse_generated(&raw)
                    .into_iter()
                    .map(|g| Activity::suggestion(&g.name, &g.description))
                    .collect();
            }
            Err(e) => warn!(error = %e, "activity generation failed"),
        }
        &self.suggestions
    }

    /// Move a suggestion into the saved collection, or a saved activity
    /// back out. Unknown ids are a no-op.
    pub fn toggle(&mut self, id: &str) -> Result<(), StoreError> {
        if let Some(saved) = self.saved.find(id).cloned() {
            self.saved.remove(id)?;
            if let Some(s) = self.suggestions.iter_mut().find(|s| s.name == saved.name) {
                s.added = false;
            }
            return Ok(());
        }
        if let Some(pos) = self.suggestions.iter().position(|s| s.id == id) {
            self.suggestions[pos].added = true;
            self.saved.add(self.suggestions[pos].clone())?;
        }
        Ok(())
    }
}

/// Extract the bracketed JSON array from a raw reply. Anything that fails
/// to parse yields an empty batch.
fn parse_generated(raw: &str) -> Vec<GeneratedActivity> {
    let Some(start) = raw.find('[') else {
        warn!("activity reply carried no JSON array");
        return Vec::new();
    };
    let Some(end) = raw.rfind(']') else {
        warn!("activity reply carried no JSON array");
        return Vec::new();
    };
    match serde_json::from_str(&raw[start..=end]) {
        Ok(batch) => batch,
        Err(e) => {
            warn!(error = %e, "activity reply did not parse");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationError;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;

    struct StaticGen(&'static str);

    #[async_trait]
    impl GenerationClient for StaticGen {
        async fn generate(&self, _req: &GenerationRequest) -> Result<String, GenerationError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingGen;

    #[async_trait]
    impl GenerationClient for FailingGen {
        async fn generate(&self, _req: &GenerationRequest) -> Result<String, GenerationError> {
            Err(GenerationError::MalformedResponse)
        }
    }

    #[test]
    fn opens_with_starter_suggestions() {
        let board = ActivityBoard::open(Arc::new(MemoryStorage::new()), Arc::new(FailingGen));
        assert_eq!(board.suggestions().len(), 4);
        assert!(board.saved().is_empty());
    }

    #[test]
    fn toggle_moves_between_lists() {
        let mut board = ActivityBoard::open(Arc::new(MemoryStorage::new()), Arc::new(FailingGen));
        let id = board.suggestions()[0].id.clone();
        board.toggle(&id).unwrap();
        assert_eq!(board.suggestions().len(), 3);
        assert_eq!(board.saved().len(), 1);
        assert!(board.saved()[0].added);

        let saved_id = board.saved()[0].id.clone();
        board.toggle(&saved_id).unwrap();
        assert_eq!(board.suggestions().len(), 4);
        assert!(board.saved().is_empty());
    }

    #[test]
    fn saved_names_mark_fresh_suggestions_as_added() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let mut board = ActivityBoard::open(storage.clone(), Arc::new(FailingGen));
            let id = board.suggestions()[0].id.clone();
            board.toggle(&id).unwrap();
        }
        let board = ActivityBoard::open(storage, Arc::new(FailingGen));
        assert_eq!(board.suggestions().len(), 3);
        assert_eq!(board.saved().len(), 1);
    }

    #[tokio::test]
    async fn generated_batch_replaces_suggestions() {
        let reply = r#"Here you go: [
            {"name": "Community Garden", "description": "Grow food for the local shelter."},
            {"name": "Debate Team", "description": "Compete in regional tournaments."}
        ] Good luck!"#;
        let mut board =
            ActivityBoard::open(Arc::new(MemoryStorage::new()), Arc::new(StaticGen(reply)));
        let batch = board.generate_more().await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].name, "Community Garden");
        assert!(!batch[0].added);
    }

    #[tokio::test]
    async fn unparseable_reply_clears_suggestions() {
        let mut board = ActivityBoard::open(
            Arc::new(MemoryStorage::new()),
            Arc::new(StaticGen("no json here")),
        );
        assert!(board.generate_more().await.is_empty());
    }

    #[tokio::test]
    async fn failed_request_keeps_current_suggestions() {
        let mut board = ActivityBoard::open(Arc::new(MemoryStorage::new()), Arc::new(FailingGen));
        assert_eq!(board.generate_more().await.len(), 4);
    }
}
