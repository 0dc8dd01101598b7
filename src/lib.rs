//! Core building blocks for Lomo, an assistant for college applicants.
//!
//! Two components carry the weight: [`CollectionStore`], the persistent
//! collection behind every saved-items feature, and the response formatter
//! ([`format_response`]) turning raw generated text into a constrained,
//! render-safe markup subset. Around them sit the feature services (essay
//! workspace, counselor chat, activity board, deadline calendar, letter
//! desk), the storage and generation ports they are wired with, and the
//! static university directory.

pub mod activities;
pub mod auth;
pub mod calendar;
pub mod chat;
pub mod cohere;
pub mod directory;
pub mod essay;
pub mod formatter;
pub mod generation;
mod id;
pub mod letters;
pub mod logger;
pub mod markup;
pub mod prompts;
pub mod storage;
pub mod store;

pub use activities::{ACTIVITIES_SLOT, Activity, ActivityBoard};
pub use auth::{SignIn, USER_SLOT, UserProfile};
pub use calendar::{CALENDAR_SLOT, Calendar, DeadlineEvent, EventKind, EventStatus};
pub use chat::{CHAT_SLOT, ChatMessage, ChatSession, PendingChat, RequestToken, Sender};
pub use cohere::CohereClient;
pub use directory::{Location, PAGE_SIZE, University, page, search};
pub use essay::{DRAFT_SLOT, ESSAYS_SLOT, EssayAssistant, FEEDBACK_SLOT, SavedEssay};
pub use formatter::{FormatError, FormatMode, format_response, format_value};
pub use generation::{GenerationClient, GenerationError, GenerationRequest};
pub use id::{created_stamp, next_record_id};
pub use letters::{LETTERS_SLOT, LetterDesk, LetterRequest};
pub use markup::{ALLOWED_TAGS, escape_text, sanitize};
pub use storage::{DirStorage, MemoryStorage, Storage, StorageError};
pub use store::{CollectionStore, Record, StoreError};
