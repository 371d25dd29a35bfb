//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use toffee_core::ports::{
    BlobStorage, ChatService, MediaImportService, QuestionGenerator, StudyStore, SummaryService,
};
use toffee_core::review::ReviewSession;
use uuid::Uuid;

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub store: Arc<dyn StudyStore>,
    pub generator: Arc<dyn QuestionGenerator>,
    pub chat: Arc<dyn ChatService>,
    pub media: Arc<dyn MediaImportService>,
    /// Absent when no OpenRouter key is configured; uploads then fall
    /// back to a text-derived title.
    pub summarizer: Option<Arc<dyn SummaryService>>,
    /// Absent when blob storage is not configured; Anki import is
    /// unavailable without it.
    pub blobs: Option<Arc<dyn BlobStorage>>,
    pub config: Arc<Config>,
    /// In-process registry of active flashcard review sessions. One
    /// logical user session drives a review at a time, so a single lock
    /// over the map is plenty.
    pub reviews: Mutex<HashMap<Uuid, ReviewSession>>,
}
