//! An in-memory `StudyStore` used by the integration tests. Mirrors the
//! hosted store's observable behavior: sparse stat maps, atomic-feeling
//! upserts, and per-user document collections.

// Each integration test binary compiles its own copy and uses a subset.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use toffee_core::domain::{
    CardNote, CardResponse, CardStat, ChatMessage, Document, Flashcard, MarketplaceEntry,
    NewDocument, NewMarketplaceEntry, Question, QuizKind, QuizResult, ReviewLog, UserProfile,
};
use toffee_core::ports::{PortError, PortResult, StudyStore};

#[derive(Default)]
struct Inner {
    documents: HashMap<(Uuid, Uuid), Document>,
    stats: HashMap<(Uuid, Uuid, String), CardStat>,
    notes: HashMap<(Uuid, Uuid, String), Vec<CardNote>>,
    reviews: HashMap<(Uuid, Uuid), Vec<ReviewLog>>,
    messages: HashMap<(Uuid, Uuid), Vec<ChatMessage>>,
    marketplace: Vec<MarketplaceEntry>,
    profiles: HashMap<Uuid, UserProfile>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_stat_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `record_card_response` fail, simulating an
    /// unavailable store.
    pub fn fail_stat_writes(&self, fail: bool) {
        self.fail_stat_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_username(&self, owner_id: Uuid, username: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.profiles.entry(owner_id).or_default().username = username.to_string();
    }

    pub fn stat(&self, owner_id: Uuid, document_id: Uuid, card_index: &str) -> Option<CardStat> {
        let inner = self.inner.lock().unwrap();
        inner
            .stats
            .get(&(owner_id, document_id, card_index.to_string()))
            .copied()
    }

    pub fn review_logs(&self, owner_id: Uuid, document_id: Uuid) -> Vec<ReviewLog> {
        let inner = self.inner.lock().unwrap();
        inner
            .reviews
            .get(&(owner_id, document_id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn document_count(&self, owner_id: Uuid) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.documents.keys().filter(|(o, _)| *o == owner_id).count()
    }

    pub fn marketplace_len(&self) -> usize {
        self.inner.lock().unwrap().marketplace.len()
    }
}

#[async_trait]
impl StudyStore for MemoryStore {
    async fn save_document(&self, owner_id: Uuid, doc: NewDocument) -> PortResult<Document> {
        let document = Document {
            id: Uuid::new_v4(),
            owner_id,
            summary: doc.summary,
            text: doc.text,
            text_hash: doc.text_hash,
            created_at: Utc::now(),
            questions: Default::default(),
            results: Default::default(),
            flashcards: Vec::new(),
            tags: doc.tags,
            imported_from: None,
        };
        let mut inner = self.inner.lock().unwrap();
        inner
            .documents
            .insert((owner_id, document.id), document.clone());
        Ok(document)
    }

    async fn list_documents(&self, owner_id: Uuid) -> PortResult<Vec<Document>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .documents
            .iter()
            .filter(|((o, _), _)| *o == owner_id)
            .map(|(_, d)| d.clone())
            .collect())
    }

    async fn get_document(&self, owner_id: Uuid, document_id: Uuid) -> PortResult<Document> {
        let inner = self.inner.lock().unwrap();
        inner
            .documents
            .get(&(owner_id, document_id))
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Document {} not found", document_id)))
    }

    async fn delete_document(&self, owner_id: Uuid, document_id: Uuid) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.documents.remove(&(owner_id, document_id));
        Ok(())
    }

    async fn set_questions(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        kind: QuizKind,
        questions: &[Question],
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let doc = inner
            .documents
            .get_mut(&(owner_id, document_id))
            .ok_or_else(|| PortError::NotFound(format!("Document {} not found", document_id)))?;
        *doc.questions.of_mut(kind) = questions.to_vec();
        Ok(())
    }

    async fn set_flashcards(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        cards: &[Flashcard],
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let doc = inner
            .documents
            .get_mut(&(owner_id, document_id))
            .ok_or_else(|| PortError::NotFound(format!("Document {} not found", document_id)))?;
        doc.flashcards = cards.to_vec();
        Ok(())
    }

    async fn append_quiz_results(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        kind: QuizKind,
        results: &[QuizResult],
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let doc = inner
            .documents
            .get_mut(&(owner_id, document_id))
            .ok_or_else(|| PortError::NotFound(format!("Document {} not found", document_id)))?;
        doc.results.of_mut(kind).extend_from_slice(results);
        Ok(())
    }

    async fn flashcard_stats(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
    ) -> PortResult<HashMap<String, CardStat>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .stats
            .iter()
            .filter(|((o, d, _), _)| *o == owner_id && *d == document_id)
            .map(|((_, _, key), stat)| (key.clone(), *stat))
            .collect())
    }

    async fn record_card_response(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        card_index: &str,
        response: CardResponse,
    ) -> PortResult<CardStat> {
        if self.fail_stat_writes.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("store unavailable".to_string()));
        }
        let mut inner = self.inner.lock().unwrap();
        let stat = inner
            .stats
            .entry((owner_id, document_id, card_index.to_string()))
            .or_default();
        stat.views += 1;
        match response {
            CardResponse::Easy => stat.easy += 1,
            CardResponse::Hard => stat.hard += 1,
        }
        Ok(*stat)
    }

    async fn card_notes(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        card_index: &str,
    ) -> PortResult<Vec<CardNote>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .notes
            .get(&(owner_id, document_id, card_index.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn add_card_note(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        card_index: &str,
        text: &str,
    ) -> PortResult<CardNote> {
        let note = CardNote {
            id: Uuid::new_v4(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        let mut inner = self.inner.lock().unwrap();
        inner
            .notes
            .entry((owner_id, document_id, card_index.to_string()))
            .or_default()
            .push(note.clone());
        Ok(note)
    }

    async fn delete_card_note(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        card_index: &str,
        note_id: Uuid,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(notes) = inner
            .notes
            .get_mut(&(owner_id, document_id, card_index.to_string()))
        {
            notes.retain(|n| n.id != note_id);
        }
        Ok(())
    }

    async fn reset_card(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        card_index: &str,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .notes
            .remove(&(owner_id, document_id, card_index.to_string()));
        inner
            .stats
            .remove(&(owner_id, document_id, card_index.to_string()));
        Ok(())
    }

    async fn log_review(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        log: &ReviewLog,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .reviews
            .entry((owner_id, document_id))
            .or_default()
            .push(log.clone());
        Ok(())
    }

    async fn reviews_for_document(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
    ) -> PortResult<Vec<ReviewLog>> {
        Ok(self.review_logs(owner_id, document_id))
    }

    async fn append_message(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        message: &ChatMessage,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .messages
            .entry((owner_id, document_id))
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn messages_for_document(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
    ) -> PortResult<Vec<ChatMessage>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .messages
            .get(&(owner_id, document_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn marketplace_entries(&self, tag: Option<&str>) -> PortResult<Vec<MarketplaceEntry>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .marketplace
            .iter()
            .filter(|e| tag.map_or(true, |t| e.tags.iter().any(|have| have == t)))
            .cloned()
            .collect())
    }

    async fn get_marketplace_entry(&self, entry_id: Uuid) -> PortResult<MarketplaceEntry> {
        let inner = self.inner.lock().unwrap();
        inner
            .marketplace
            .iter()
            .find(|e| e.id == entry_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Shared document {} not found", entry_id)))
    }

    async fn find_share(&self, shared_by: &str, text_hash: &str) -> PortResult<Option<Uuid>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .marketplace
            .iter()
            .find(|e| e.shared_by == shared_by && e.text_hash == text_hash)
            .map(|e| e.id))
    }

    async fn publish_entry(&self, entry: NewMarketplaceEntry) -> PortResult<MarketplaceEntry> {
        let published = MarketplaceEntry {
            id: Uuid::new_v4(),
            summary: entry.summary,
            text: entry.text,
            text_hash: entry.text_hash,
            questions: entry.questions,
            flashcards: entry.flashcards,
            shared_by: entry.shared_by,
            tags: entry.tags,
            shared_at: Utc::now(),
        };
        let mut inner = self.inner.lock().unwrap();
        inner.marketplace.push(published.clone());
        Ok(published)
    }

    async fn has_imported(
        &self,
        owner_id: Uuid,
        entry_id: Uuid,
        text_hash: &str,
    ) -> PortResult<bool> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.documents.iter().any(|((o, _), d)| {
            *o == owner_id && (d.imported_from == Some(entry_id) || d.text_hash == text_hash)
        }))
    }

    async fn import_entry(
        &self,
        owner_id: Uuid,
        entry: &MarketplaceEntry,
    ) -> PortResult<Document> {
        let document = Document {
            id: Uuid::new_v4(),
            owner_id,
            summary: entry.summary.clone(),
            text: entry.text.clone(),
            text_hash: entry.text_hash.clone(),
            created_at: Utc::now(),
            questions: entry.questions.clone(),
            results: Default::default(),
            flashcards: entry.flashcards.clone(),
            tags: entry.tags.clone(),
            imported_from: Some(entry.id),
        };
        let mut inner = self.inner.lock().unwrap();
        inner
            .documents
            .insert((owner_id, document.id), document.clone());
        Ok(document)
    }

    async fn get_profile(&self, owner_id: Uuid) -> PortResult<UserProfile> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.profiles.get(&owner_id).cloned().unwrap_or_default())
    }

    async fn update_username(&self, owner_id: Uuid, username: &str) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.profiles.entry(owner_id).or_default().username = username.to_string();
        Ok(())
    }

    async fn bump_quiz_counters(
        &self,
        owner_id: Uuid,
        kind: QuizKind,
        correct: u32,
        total: u32,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let profile = inner.profiles.entry(owner_id).or_default();
        match kind {
            QuizKind::Mcq => {
                profile.mcq_quizzes_taken += 1;
                profile.mcq_correct += correct;
                profile.mcq_total += total;
            }
            QuizKind::Tf => {
                profile.tf_quizzes_taken += 1;
                profile.tf_correct += correct;
                profile.tf_total += total;
            }
            QuizKind::Fitb => {
                profile.fitb_quizzes_taken += 1;
                profile.fitb_correct += correct;
                profile.fitb_total += total;
            }
        }
        Ok(())
    }
}
