//! crates/toffee_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like the hosted
//! document store or the generation backend.

use async_trait::async_trait;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use uuid::Uuid;

use crate::domain::{
    AnkiCard, CardNote, CardResponse, CardStat, ChatMessage, Document, FeynmanFeedback, Flashcard,
    GenerationParams, MarketplaceEntry, NewDocument, NewMarketplaceEntry, Question, QuizKind,
    QuizResult, ReviewLog, UserProfile,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// The duplicate-action variants are deliberately distinct from `NotFound`
/// and from generic failure: callers present a specific warning for an
/// already-shared or already-imported document rather than a generic alert.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Already shared")]
    AlreadyShared,
    #[error("Already imported")]
    AlreadyImported,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// A stream of decoded chat chunks from the backend.
pub type ChunkStream = Pin<Box<dyn Stream<Item = PortResult<String>> + Send>>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The document-store client: per-user documents and their nested
/// flashcard/chat records, the shared marketplace collection, and the
/// per-user profile singleton.
#[async_trait]
pub trait StudyStore: Send + Sync {
    // --- Documents ---
    async fn save_document(&self, owner_id: Uuid, doc: NewDocument) -> PortResult<Document>;

    async fn list_documents(&self, owner_id: Uuid) -> PortResult<Vec<Document>>;

    async fn get_document(&self, owner_id: Uuid, document_id: Uuid) -> PortResult<Document>;

    async fn delete_document(&self, owner_id: Uuid, document_id: Uuid) -> PortResult<()>;

    async fn set_questions(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        kind: QuizKind,
        questions: &[Question],
    ) -> PortResult<()>;

    async fn set_flashcards(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        cards: &[Flashcard],
    ) -> PortResult<()>;

    /// Appends to the document's per-kind result log. Result entries are
    /// append-only; there is no operation that removes one.
    async fn append_quiz_results(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        kind: QuizKind,
        results: &[QuizResult],
    ) -> PortResult<()>;

    // --- Flashcard review state ---
    /// The sparse per-card stat map, keyed by the card's original index
    /// rendered as a string. Cards never reviewed have no entry.
    async fn flashcard_stats(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
    ) -> PortResult<HashMap<String, CardStat>>;

    /// Atomically bumps `views` plus the matching easy/hard counter and
    /// returns the updated stat.
    async fn record_card_response(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        card_index: &str,
        response: CardResponse,
    ) -> PortResult<CardStat>;

    async fn card_notes(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        card_index: &str,
    ) -> PortResult<Vec<CardNote>>;

    async fn add_card_note(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        card_index: &str,
        text: &str,
    ) -> PortResult<CardNote>;

    async fn delete_card_note(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        card_index: &str,
        note_id: Uuid,
    ) -> PortResult<()>;

    /// Removes a card's stat record and all of its notes: notes first,
    /// then the stat, so a partial failure never leaves orphaned notes
    /// under a missing stat.
    async fn reset_card(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        card_index: &str,
    ) -> PortResult<()>;

    async fn log_review(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        log: &ReviewLog,
    ) -> PortResult<()>;

    async fn reviews_for_document(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
    ) -> PortResult<Vec<ReviewLog>>;

    // --- Chat ---
    async fn append_message(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        message: &ChatMessage,
    ) -> PortResult<()>;

    async fn messages_for_document(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
    ) -> PortResult<Vec<ChatMessage>>;

    // --- Marketplace ---
    /// All entries, optionally filtered to those carrying `tag`.
    async fn marketplace_entries(&self, tag: Option<&str>) -> PortResult<Vec<MarketplaceEntry>>;

    async fn get_marketplace_entry(&self, entry_id: Uuid) -> PortResult<MarketplaceEntry>;

    /// An existing share by this username with this content digest, if any.
    async fn find_share(&self, shared_by: &str, text_hash: &str) -> PortResult<Option<Uuid>>;

    async fn publish_entry(&self, entry: NewMarketplaceEntry) -> PortResult<MarketplaceEntry>;

    /// Whether the user already holds a copy of this entry, either by
    /// entry id or by content digest.
    async fn has_imported(
        &self,
        owner_id: Uuid,
        entry_id: Uuid,
        text_hash: &str,
    ) -> PortResult<bool>;

    async fn import_entry(&self, owner_id: Uuid, entry: &MarketplaceEntry)
        -> PortResult<Document>;

    // --- Profile ---
    /// The profile singleton; an empty default when none exists yet.
    async fn get_profile(&self, owner_id: Uuid) -> PortResult<UserProfile>;

    async fn update_username(&self, owner_id: Uuid, username: &str) -> PortResult<()>;

    /// Atomic add-in-place on the per-kind counters. Never implemented as
    /// read-modify-write: concurrent tabs must not lose increments.
    async fn bump_quiz_counters(
        &self,
        owner_id: Uuid,
        kind: QuizKind,
        correct: u32,
        total: u32,
    ) -> PortResult<()>;
}

/// The AI generation backend: questions, flashcards, keyterms, and
/// Feynman grading. Malformed backend JSON decodes to an empty result
/// rather than an error.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate_questions(
        &self,
        kind: QuizKind,
        text: &str,
        params: &GenerationParams,
    ) -> PortResult<Vec<Question>>;

    async fn generate_flashcards(&self, text: &str) -> PortResult<Vec<Flashcard>>;

    async fn extract_keyterms(&self, text: &str) -> PortResult<Vec<String>>;

    async fn grade_explanation(
        &self,
        term: &str,
        text: &str,
        response: &str,
    ) -> PortResult<FeynmanFeedback>;
}

/// Streaming chat completion over an uploaded document.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Opens a streaming answer to `question` grounded in `document_text`.
    /// Items are already-decoded text chunks ready to concatenate.
    async fn chat_stream(&self, document_text: &str, question: &str) -> PortResult<ChunkStream>;
}

/// Imports that go through the backend: video transcripts and Anki
/// package conversion.
#[async_trait]
pub trait MediaImportService: Send + Sync {
    async fn fetch_transcript(&self, video_url: &str) -> PortResult<String>;

    async fn convert_anki(&self, package_url: &str) -> PortResult<Vec<AnkiCard>>;
}

/// One-line deck-title summarization for uploads that arrive untitled.
#[async_trait]
pub trait SummaryService: Send + Sync {
    async fn summarize_title(&self, text: &str) -> PortResult<String>;
}

/// Upload-if-absent blob storage, keyed by filename. Only used for Anki
/// package files.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Returns the public URL for `filename`, uploading `bytes` only when
    /// no blob with that name exists yet.
    async fn upload_if_absent(&self, filename: &str, bytes: Vec<u8>) -> PortResult<String>;
}
