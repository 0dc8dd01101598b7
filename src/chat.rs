use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::formatter::{FormatMode, format_response};
use crate::generation::{GenerationClient, GenerationError, GenerationRequest};
use crate::id::{created_stamp, next_record_id};
use crate::prompts;
use crate::storage::Storage;
use crate::store::{CollectionStore, Record, StoreError};

/// Durable slot holding the counselor transcript.
pub const CHAT_SLOT: &str = "chatHistory";

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai")]
    Assistant,
}

/// One message of the counselor transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    #[serde(rename = "dateCreated", default)]
    pub created_at: String,
    /// Display-only typing indicator; never persisted.
    #[serde(skip)]
    pub is_composing: bool,
}

impl ChatMessage {
    pub fn from_user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    pub fn from_assistant(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Assistant)
    }

    fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: next_record_id(),
            text: text.into(),
            sender,
            created_at: created_stamp(),
            is_composing: false,
        }
    }
}

impl Record for ChatMessage {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Identity of one issued generation request.
///
/// Responses are applied only when their token is still the latest issued
/// one, so a reply that arrives after the user moved on cannot overwrite a
/// newer exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// A begun exchange: the token identifying it plus the request to send to
/// the generation collaborator.
#[derive(Debug)]
pub struct PendingChat {
    pub token: RequestToken,
    pub request: GenerationRequest,
}

/// Counselor chat session: a persistent transcript plus the in-flight
/// request state that keeps submissions single-file.
///
/// The session itself performs no waiting; callers drive the generation
/// round trip between [`begin`] and [`resolve`], or use [`send`] to do both.
///
/// [`begin`]: ChatSession::begin
/// [`resolve`]: ChatSession::resolve
/// [`send`]: ChatSession::send
pub struct ChatSession {
    store: CollectionStore<ChatMessage>,
    generator: Arc<dyn GenerationClient>,
    model: String,
    busy: bool,
    latest: u64,
}

impl ChatSession {
    /// Open the transcript, seeding the fixed greeting when it is empty.
    pub fn open(storage: Arc<dyn Storage>, generator: Arc<dyn GenerationClient>) -> Self {
        let mut session = Self {
            store: CollectionStore::open(CHAT_SLOT, storage),
            generator,
            model: prompts::DEFAULT_MODEL.to_string(),
            busy: false,
            latest: 0,
        };
        if session.store.records().is_empty() {
            session.append(ChatMessage::from_assistant(prompts::GREETING));
        }
        session
    }

    /// Override the model identifier sent with each request.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Transcript in insertion order.
    pub fn messages(&self) -> &[ChatMessage] {
        self.store.records()
    }

    /// True while a request is in flight; the triggering control should be
    /// disabled.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Start one exchange: append the user message and issue a request
    /// token.
    ///
    /// Returns `None` when a request is already in flight or the input is
    /// blank; duplicate submissions are refused here, at the boundary.
    pub fn begin(&mut self, input: &str) -> Option<PendingChat> {
        if self.busy || input.trim().is_empty() {
            return None;
        }
        self.append(ChatMessage::from_user(input));
        self.busy = true;
        self.latest += 1;
        Some(PendingChat {
            token: RequestToken(self.latest),
            request: GenerationRequest::new(
                prompts::counselor_message(input),
                prompts::COUNSELOR_PREAMBLE,
                self.model.clone(),
            ),
        })
    }

    /// Stop waiting for the in-flight request.
    ///
    /// The request itself is not cancelled; its eventual response simply no
    /// longer matches the latest token and is discarded on [`resolve`].
    ///
    /// [`resolve`]: ChatSession::resolve
    pub fn abandon(&mut self) {
        if self.busy {
            self.busy = false;
            self.latest += 1;
        }
    }

    /// Apply the outcome of one generation round trip.
    ///
    /// A response whose token is not the latest issued one is dropped
    /// (last-issued-wins), and an applied token is spent, so a duplicate
    /// delivery cannot append twice. A failed request appends the fixed
    /// fallback message instead of an error.
    pub fn resolve(
        &mut self,
        token: RequestToken,
        outcome: Result<String, GenerationError>,
    ) -> Option<&ChatMessage> {
        if token.0 != self.latest {
            debug!(token = token.0, latest = self.latest, "dropping stale generation response");
            return None;
        }
        self.busy = false;
        self.latest += 1;
        let text = match outcome {
            Ok(raw) => format_response(&raw, FormatMode::Chat),
            Err(e) => {
                warn!(error = %e, "counselor generation failed");
                prompts::CHAT_FALLBACK.to_string()
            }
        };
        self.append(ChatMessage::from_assistant(text));
        self.store.records().last()
    }

    /// One full exchange: [`begin`], generate, [`resolve`].
    ///
    /// [`begin`]: ChatSession::begin
    /// [`resolve`]: ChatSession::resolve
    pub async fn send(&mut self, input: &str) -> Option<&ChatMessage> {
        let pending = self.begin(input)?;
        let generator = Arc::clone(&self.generator);
        let outcome = generator.generate(&pending.request).await;
        self.resolve(pending.token, outcome)
    }

    /// Reset the transcript to the fixed greeting.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.clear()?;
        self.append(ChatMessage::from_assistant(prompts::GREETING));
        Ok(())
    }

    fn append(&mut self, message: ChatMessage) {
        match self.store.add(message) {
            Ok(_) => {}
            Err(e @ StoreError::Persistence(_)) => {
                warn!(error = %e, "chat message may not survive a reload");
            }
            Err(e) => error!(error = %e, "chat transcript rejected a message"),
        }
    }
}
