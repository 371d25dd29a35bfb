//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `StudyStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Counter mutations (profile quiz counters, per-card stats) are expressed
//! as upsert-increments so they stay correct under concurrent tabs and
//! devices; nothing here does read-modify-write on a counter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use toffee_core::domain::{
    CardNote, CardResponse, CardStat, ChatMessage, Document, Flashcard, MarketplaceEntry,
    NewDocument, NewMarketplaceEntry, Question, QuizKind, QuizResult, ReviewLog, Sender,
    UserProfile,
};
use toffee_core::ports::{PortError, PortResult, StudyStore};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `StudyStore` port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> PortResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| PortError::Unexpected(e.to_string()))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct DocumentRecord {
    id: Uuid,
    owner_id: Uuid,
    summary: String,
    text: String,
    text_hash: String,
    created_at: DateTime<Utc>,
    questions: serde_json::Value,
    results: serde_json::Value,
    flashcards: serde_json::Value,
    tags: Vec<String>,
    imported_from: Option<Uuid>,
}

impl DocumentRecord {
    fn to_domain(self) -> Document {
        Document {
            id: self.id,
            owner_id: self.owner_id,
            summary: self.summary,
            text: self.text,
            text_hash: self.text_hash,
            created_at: self.created_at,
            // Question and result payloads drift across backend versions;
            // anything unreadable normalizes to empty rather than erroring.
            questions: serde_json::from_value(self.questions).unwrap_or_default(),
            results: serde_json::from_value(self.results).unwrap_or_default(),
            flashcards: serde_json::from_value(self.flashcards).unwrap_or_default(),
            tags: self.tags,
            imported_from: self.imported_from,
        }
    }
}

const DOCUMENT_COLUMNS: &str = "id, owner_id, summary, text, text_hash, created_at, \
                                questions, results, flashcards, tags, imported_from";

#[derive(FromRow)]
struct StatRecord {
    card_index: String,
    views: i32,
    easy: i32,
    hard: i32,
}

impl StatRecord {
    fn to_domain(&self) -> CardStat {
        CardStat {
            views: self.views.max(0) as u32,
            easy: self.easy.max(0) as u32,
            hard: self.hard.max(0) as u32,
        }
    }
}

#[derive(FromRow)]
struct NoteRecord {
    id: Uuid,
    text: String,
    created_at: DateTime<Utc>,
}

impl NoteRecord {
    fn to_domain(self) -> CardNote {
        CardNote {
            id: self.id,
            text: self.text,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ReviewLogRecord {
    id: Uuid,
    completed_at: DateTime<Utc>,
    total_cards: Option<i32>,
    easy_count: i32,
    hard_count: i32,
    card_ids: Vec<String>,
}

impl ReviewLogRecord {
    fn to_domain(self) -> ReviewLog {
        ReviewLog {
            id: self.id,
            completed_at: self.completed_at,
            total_cards: self.total_cards.map(|n| n.max(0) as u32),
            easy_count: self.easy_count.max(0) as u32,
            hard_count: self.hard_count.max(0) as u32,
            card_ids: self.card_ids,
        }
    }
}

#[derive(FromRow)]
struct MessageRecord {
    id: Uuid,
    sender: String,
    text: String,
    sent_at: DateTime<Utc>,
}

impl MessageRecord {
    fn to_domain(self) -> ChatMessage {
        ChatMessage {
            id: self.id,
            sender: match self.sender.as_str() {
                "user" => Sender::User,
                _ => Sender::Caramel,
            },
            text: self.text,
            sent_at: self.sent_at,
        }
    }
}

#[derive(FromRow)]
struct MarketplaceRecord {
    id: Uuid,
    summary: String,
    text: String,
    text_hash: String,
    questions: serde_json::Value,
    flashcards: serde_json::Value,
    shared_by: String,
    tags: Vec<String>,
    shared_at: DateTime<Utc>,
}

impl MarketplaceRecord {
    fn to_domain(self) -> MarketplaceEntry {
        MarketplaceEntry {
            id: self.id,
            summary: self.summary,
            text: self.text,
            text_hash: self.text_hash,
            questions: serde_json::from_value(self.questions).unwrap_or_default(),
            flashcards: serde_json::from_value(self.flashcards).unwrap_or_default(),
            shared_by: self.shared_by,
            tags: self.tags,
            shared_at: self.shared_at,
        }
    }
}

const MARKETPLACE_COLUMNS: &str =
    "id, summary, text, text_hash, questions, flashcards, shared_by, tags, shared_at";

#[derive(FromRow)]
struct ProfileRecord {
    username: String,
    mcq_quizzes_taken: i32,
    mcq_correct: i32,
    mcq_total: i32,
    tf_quizzes_taken: i32,
    tf_correct: i32,
    tf_total: i32,
    fitb_quizzes_taken: i32,
    fitb_correct: i32,
    fitb_total: i32,
}

impl ProfileRecord {
    fn to_domain(self) -> UserProfile {
        UserProfile {
            username: self.username,
            mcq_quizzes_taken: self.mcq_quizzes_taken.max(0) as u32,
            mcq_correct: self.mcq_correct.max(0) as u32,
            mcq_total: self.mcq_total.max(0) as u32,
            tf_quizzes_taken: self.tf_quizzes_taken.max(0) as u32,
            tf_correct: self.tf_correct.max(0) as u32,
            tf_total: self.tf_total.max(0) as u32,
            fitb_quizzes_taken: self.fitb_quizzes_taken.max(0) as u32,
            fitb_correct: self.fitb_correct.max(0) as u32,
            fitb_total: self.fitb_total.max(0) as u32,
        }
    }
}

//=========================================================================================
// `StudyStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl StudyStore for PgStore {
    async fn save_document(&self, owner_id: Uuid, doc: NewDocument) -> PortResult<Document> {
        let sql = format!(
            "INSERT INTO documents (id, owner_id, summary, text, text_hash, tags) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {DOCUMENT_COLUMNS}"
        );
        let record = sqlx::query_as::<_, DocumentRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(&doc.summary)
            .bind(&doc.text)
            .bind(&doc.text_hash)
            .bind(&doc.tags)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_documents(&self, owner_id: Uuid) -> PortResult<Vec<Document>> {
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        let records = sqlx::query_as::<_, DocumentRecord>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_document(&self, owner_id: Uuid, document_id: Uuid) -> PortResult<Document> {
        let sql =
            format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE owner_id = $1 AND id = $2");
        let record = sqlx::query_as::<_, DocumentRecord>(&sql)
            .bind(owner_id)
            .bind(document_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("Document {} not found", document_id))
                }
                _ => unexpected(e),
            })?;
        Ok(record.to_domain())
    }

    async fn delete_document(&self, owner_id: Uuid, document_id: Uuid) -> PortResult<()> {
        // Nested records first so a deleted document never leaves
        // orphaned children behind.
        for table in [
            "flashcard_notes",
            "flashcard_stats",
            "review_logs",
            "messages",
        ] {
            let sql = format!("DELETE FROM {table} WHERE owner_id = $1 AND document_id = $2");
            sqlx::query(&sql)
                .bind(owner_id)
                .bind(document_id)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
        }
        sqlx::query("DELETE FROM documents WHERE owner_id = $1 AND id = $2")
            .bind(owner_id)
            .bind(document_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn set_questions(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        kind: QuizKind,
        questions: &[Question],
    ) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE documents \
             SET questions = jsonb_set(coalesce(questions, '{}'::jsonb), $3::text[], $4) \
             WHERE owner_id = $1 AND id = $2",
        )
        .bind(owner_id)
        .bind(document_id)
        .bind(vec![kind.as_str().to_string()])
        .bind(to_json(&questions)?)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Document {} not found",
                document_id
            )));
        }
        Ok(())
    }

    async fn set_flashcards(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        cards: &[Flashcard],
    ) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE documents SET flashcards = $3 WHERE owner_id = $1 AND id = $2",
        )
        .bind(owner_id)
        .bind(document_id)
        .bind(to_json(&cards)?)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Document {} not found",
                document_id
            )));
        }
        Ok(())
    }

    async fn append_quiz_results(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        kind: QuizKind,
        results: &[QuizResult],
    ) -> PortResult<()> {
        // Appends in a single statement so two concurrent submissions
        // both land instead of one overwriting the other.
        let result = sqlx::query(
            "UPDATE documents \
             SET results = jsonb_set(coalesce(results, '{}'::jsonb), $3::text[], \
                                     coalesce(results -> $4::text, '[]'::jsonb) || $5) \
             WHERE owner_id = $1 AND id = $2",
        )
        .bind(owner_id)
        .bind(document_id)
        .bind(vec![kind.as_str().to_string()])
        .bind(kind.as_str())
        .bind(to_json(&results)?)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Document {} not found",
                document_id
            )));
        }
        Ok(())
    }

    async fn flashcard_stats(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
    ) -> PortResult<HashMap<String, CardStat>> {
        let records = sqlx::query_as::<_, StatRecord>(
            "SELECT card_index, views, easy, hard FROM flashcard_stats \
             WHERE owner_id = $1 AND document_id = $2",
        )
        .bind(owner_id)
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records
            .into_iter()
            .map(|r| (r.card_index.clone(), r.to_domain()))
            .collect())
    }

    async fn record_card_response(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        card_index: &str,
        response: CardResponse,
    ) -> PortResult<CardStat> {
        let (easy_inc, hard_inc): (i32, i32) = match response {
            CardResponse::Easy => (1, 0),
            CardResponse::Hard => (0, 1),
        };
        let record = sqlx::query_as::<_, StatRecord>(
            "INSERT INTO flashcard_stats (owner_id, document_id, card_index, views, easy, hard) \
             VALUES ($1, $2, $3, 1, $4, $5) \
             ON CONFLICT (owner_id, document_id, card_index) \
             DO UPDATE SET views = flashcard_stats.views + 1, \
                           easy  = flashcard_stats.easy + excluded.easy, \
                           hard  = flashcard_stats.hard + excluded.hard \
             RETURNING card_index, views, easy, hard",
        )
        .bind(owner_id)
        .bind(document_id)
        .bind(card_index)
        .bind(easy_inc)
        .bind(hard_inc)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn card_notes(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        card_index: &str,
    ) -> PortResult<Vec<CardNote>> {
        let records = sqlx::query_as::<_, NoteRecord>(
            "SELECT id, text, created_at FROM flashcard_notes \
             WHERE owner_id = $1 AND document_id = $2 AND card_index = $3 \
             ORDER BY created_at ASC",
        )
        .bind(owner_id)
        .bind(document_id)
        .bind(card_index)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn add_card_note(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        card_index: &str,
        text: &str,
    ) -> PortResult<CardNote> {
        let record = sqlx::query_as::<_, NoteRecord>(
            "INSERT INTO flashcard_notes (id, owner_id, document_id, card_index, text) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id, text, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(document_id)
        .bind(card_index)
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn delete_card_note(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        card_index: &str,
        note_id: Uuid,
    ) -> PortResult<()> {
        sqlx::query(
            "DELETE FROM flashcard_notes \
             WHERE owner_id = $1 AND document_id = $2 AND card_index = $3 AND id = $4",
        )
        .bind(owner_id)
        .bind(document_id)
        .bind(card_index)
        .bind(note_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn reset_card(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        card_index: &str,
    ) -> PortResult<()> {
        // Notes first, then the stat, so a failure part-way never leaves
        // notes dangling under a stat that no longer exists.
        sqlx::query(
            "DELETE FROM flashcard_notes \
             WHERE owner_id = $1 AND document_id = $2 AND card_index = $3",
        )
        .bind(owner_id)
        .bind(document_id)
        .bind(card_index)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        sqlx::query(
            "DELETE FROM flashcard_stats \
             WHERE owner_id = $1 AND document_id = $2 AND card_index = $3",
        )
        .bind(owner_id)
        .bind(document_id)
        .bind(card_index)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn log_review(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        log: &ReviewLog,
    ) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO review_logs \
             (id, owner_id, document_id, completed_at, total_cards, easy_count, hard_count, card_ids) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(log.id)
        .bind(owner_id)
        .bind(document_id)
        .bind(log.completed_at)
        .bind(log.total_cards.map(|n| n as i32))
        .bind(log.easy_count as i32)
        .bind(log.hard_count as i32)
        .bind(&log.card_ids)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn reviews_for_document(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
    ) -> PortResult<Vec<ReviewLog>> {
        let records = sqlx::query_as::<_, ReviewLogRecord>(
            "SELECT id, completed_at, total_cards, easy_count, hard_count, card_ids \
             FROM review_logs WHERE owner_id = $1 AND document_id = $2 \
             ORDER BY completed_at ASC",
        )
        .bind(owner_id)
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn append_message(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        message: &ChatMessage,
    ) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO messages (id, owner_id, document_id, sender, text, sent_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(message.id)
        .bind(owner_id)
        .bind(document_id)
        .bind(message.sender.as_str())
        .bind(&message.text)
        .bind(message.sent_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn messages_for_document(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
    ) -> PortResult<Vec<ChatMessage>> {
        let records = sqlx::query_as::<_, MessageRecord>(
            "SELECT id, sender, text, sent_at FROM messages \
             WHERE owner_id = $1 AND document_id = $2 ORDER BY sent_at ASC",
        )
        .bind(owner_id)
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn marketplace_entries(&self, tag: Option<&str>) -> PortResult<Vec<MarketplaceEntry>> {
        let records = match tag {
            Some(tag) => {
                let sql = format!(
                    "SELECT {MARKETPLACE_COLUMNS} FROM marketplace \
                     WHERE $1 = ANY(tags) ORDER BY shared_at DESC"
                );
                sqlx::query_as::<_, MarketplaceRecord>(&sql)
                    .bind(tag)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql =
                    format!("SELECT {MARKETPLACE_COLUMNS} FROM marketplace ORDER BY shared_at DESC");
                sqlx::query_as::<_, MarketplaceRecord>(&sql)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_marketplace_entry(&self, entry_id: Uuid) -> PortResult<MarketplaceEntry> {
        let sql = format!("SELECT {MARKETPLACE_COLUMNS} FROM marketplace WHERE id = $1");
        let record = sqlx::query_as::<_, MarketplaceRecord>(&sql)
            .bind(entry_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("Shared document {} not found", entry_id))
                }
                _ => unexpected(e),
            })?;
        Ok(record.to_domain())
    }

    async fn find_share(&self, shared_by: &str, text_hash: &str) -> PortResult<Option<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM marketplace WHERE shared_by = $1 AND text_hash = $2 LIMIT 1",
        )
        .bind(shared_by)
        .bind(text_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)
    }

    async fn publish_entry(&self, entry: NewMarketplaceEntry) -> PortResult<MarketplaceEntry> {
        let sql = format!(
            "INSERT INTO marketplace \
             (id, summary, text, text_hash, questions, flashcards, shared_by, tags) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {MARKETPLACE_COLUMNS}"
        );
        let record = sqlx::query_as::<_, MarketplaceRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(&entry.summary)
            .bind(&entry.text)
            .bind(&entry.text_hash)
            .bind(to_json(&entry.questions)?)
            .bind(to_json(&entry.flashcards)?)
            .bind(&entry.shared_by)
            .bind(&entry.tags)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn has_imported(
        &self,
        owner_id: Uuid,
        entry_id: Uuid,
        text_hash: &str,
    ) -> PortResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS( \
               SELECT 1 FROM documents \
               WHERE owner_id = $1 AND (imported_from = $2 OR text_hash = $3))",
        )
        .bind(owner_id)
        .bind(entry_id)
        .bind(text_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)
    }

    async fn import_entry(
        &self,
        owner_id: Uuid,
        entry: &MarketplaceEntry,
    ) -> PortResult<Document> {
        let sql = format!(
            "INSERT INTO documents \
             (id, owner_id, summary, text, text_hash, questions, flashcards, tags, imported_from) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {DOCUMENT_COLUMNS}"
        );
        let record = sqlx::query_as::<_, DocumentRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(&entry.summary)
            .bind(&entry.text)
            .bind(&entry.text_hash)
            .bind(to_json(&entry.questions)?)
            .bind(to_json(&entry.flashcards)?)
            .bind(&entry.tags)
            .bind(entry.id)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_profile(&self, owner_id: Uuid) -> PortResult<UserProfile> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "SELECT username, \
                    mcq_quizzes_taken, mcq_correct, mcq_total, \
                    tf_quizzes_taken, tf_correct, tf_total, \
                    fitb_quizzes_taken, fitb_correct, fitb_total \
             FROM profiles WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        // A user who never saved a profile gets the empty default.
        Ok(record.map(|r| r.to_domain()).unwrap_or_default())
    }

    async fn update_username(&self, owner_id: Uuid, username: &str) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO profiles (owner_id, username) VALUES ($1, $2) \
             ON CONFLICT (owner_id) DO UPDATE SET username = excluded.username",
        )
        .bind(owner_id)
        .bind(username)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn bump_quiz_counters(
        &self,
        owner_id: Uuid,
        kind: QuizKind,
        correct: u32,
        total: u32,
    ) -> PortResult<()> {
        let sql = match kind {
            QuizKind::Mcq => {
                "INSERT INTO profiles (owner_id, mcq_quizzes_taken, mcq_correct, mcq_total) \
                 VALUES ($1, 1, $2, $3) \
                 ON CONFLICT (owner_id) \
                 DO UPDATE SET mcq_quizzes_taken = profiles.mcq_quizzes_taken + 1, \
                               mcq_correct = profiles.mcq_correct + excluded.mcq_correct, \
                               mcq_total = profiles.mcq_total + excluded.mcq_total"
            }
            QuizKind::Tf => {
                "INSERT INTO profiles (owner_id, tf_quizzes_taken, tf_correct, tf_total) \
                 VALUES ($1, 1, $2, $3) \
                 ON CONFLICT (owner_id) \
                 DO UPDATE SET tf_quizzes_taken = profiles.tf_quizzes_taken + 1, \
                               tf_correct = profiles.tf_correct + excluded.tf_correct, \
                               tf_total = profiles.tf_total + excluded.tf_total"
            }
            QuizKind::Fitb => {
                "INSERT INTO profiles (owner_id, fitb_quizzes_taken, fitb_correct, fitb_total) \
                 VALUES ($1, 1, $2, $3) \
                 ON CONFLICT (owner_id) \
                 DO UPDATE SET fitb_quizzes_taken = profiles.fitb_quizzes_taken + 1, \
                               fitb_correct = profiles.fitb_correct + excluded.fitb_correct, \
                               fitb_total = profiles.fitb_total + excluded.fitb_total"
            }
        };
        sqlx::query(sql)
            .bind(owner_id)
            .bind(correct as i32)
            .bind(total as i32)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
