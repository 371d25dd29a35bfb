//! crates/toffee_core/src/review.rs
//!
//! The flashcard review session: one pass through a prioritized deck,
//! driven by Easy/Hard responses. The session owns the cursor and a
//! session-local stat map; cumulative per-card stats live in the store
//! and are only ever moved through its atomic increments.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::domain::{CardResponse, CardStat, Flashcard, ReviewLog};
use crate::ports::{PortError, PortResult, StudyStore};
use crate::prioritize::{prioritize, RankedCard};

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    /// Showing the card at this position in the prioritized deck.
    Reviewing(usize),
    /// The deck is exhausted and the pass has been logged.
    Complete,
}

/// One in-progress pass through a document's flashcards.
pub struct ReviewSession {
    store: Arc<dyn StudyStore>,
    owner_id: Uuid,
    document_id: Uuid,
    deck: Vec<RankedCard<Flashcard>>,
    state: ReviewState,
    /// Stats accumulated in this pass only, keyed by the card's original
    /// index. Cleared on restart; never written to the store as-is.
    session_stats: HashMap<String, CardStat>,
}

impl ReviewSession {
    /// Loads the persisted per-card stats and opens a session over the
    /// prioritized deck.
    pub async fn begin(
        store: Arc<dyn StudyStore>,
        owner_id: Uuid,
        document_id: Uuid,
        cards: Vec<Flashcard>,
    ) -> PortResult<Self> {
        let raw = store.flashcard_stats(owner_id, document_id).await?;
        let stats: HashMap<usize, CardStat> = raw
            .into_iter()
            .filter_map(|(key, stat)| key.parse::<usize>().ok().map(|i| (i, stat)))
            .collect();
        let deck = prioritize(cards, &stats);
        let state = if deck.is_empty() {
            ReviewState::Complete
        } else {
            ReviewState::Reviewing(0)
        };
        Ok(Self {
            store,
            owner_id,
            document_id,
            deck,
            state,
            session_stats: HashMap::new(),
        })
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    pub fn deck(&self) -> &[RankedCard<Flashcard>] {
        &self.deck
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    /// The card currently being shown, if the pass isn't complete.
    pub fn current(&self) -> Option<&RankedCard<Flashcard>> {
        match self.state {
            ReviewState::Reviewing(idx) => self.deck.get(idx),
            ReviewState::Complete => None,
        }
    }

    /// Number of cards whose session-local stat shows at least one easy
    /// and at least one hard response, respectively. A card answered both
    /// ways within the pass counts in both: the counts track presence,
    /// not exclusivity.
    pub fn session_counts(&self) -> (u32, u32) {
        let easy = self.session_stats.values().filter(|s| s.easy > 0).count() as u32;
        let hard = self.session_stats.values().filter(|s| s.hard > 0).count() as u32;
        (easy, hard)
    }

    /// Applies one Easy/Hard response to the current card.
    ///
    /// The stat write lands first; if it fails the session is untouched
    /// and the caller can retry the same card. A failed note write is
    /// reported but does not void the response, since the stat already
    /// persisted. Exhausting the deck logs one `ReviewLog` and moves to
    /// `Complete`.
    pub async fn respond(
        &mut self,
        response: CardResponse,
        note: Option<&str>,
    ) -> PortResult<ReviewState> {
        let idx = match self.state {
            ReviewState::Reviewing(idx) => idx,
            ReviewState::Complete => {
                return Err(PortError::Unexpected(
                    "review session is already complete".to_string(),
                ))
            }
        };
        let key = self.deck[idx].original_index.to_string();

        self.store
            .record_card_response(self.owner_id, self.document_id, &key, response)
            .await?;

        if let Some(text) = note.map(str::trim).filter(|t| !t.is_empty()) {
            if let Err(err) = self
                .store
                .add_card_note(self.owner_id, self.document_id, &key, text)
                .await
            {
                warn!(card = %key, error = %err, "failed to save card note");
            }
        }

        let entry = self.session_stats.entry(key).or_default();
        entry.views += 1;
        match response {
            CardResponse::Easy => entry.easy += 1,
            CardResponse::Hard => entry.hard += 1,
        }

        if idx + 1 == self.deck.len() {
            self.state = ReviewState::Complete;
            let log = self.summarize_pass();
            self.store
                .log_review(self.owner_id, self.document_id, &log)
                .await?;
        } else {
            self.state = ReviewState::Reviewing(idx + 1);
        }
        Ok(self.state)
    }

    /// Starts the deck over. Session-local counters reset; the persisted
    /// stats and review history are untouched.
    pub fn restart(&mut self) {
        self.session_stats.clear();
        self.state = if self.deck.is_empty() {
            ReviewState::Complete
        } else {
            ReviewState::Reviewing(0)
        };
    }

    fn summarize_pass(&self) -> ReviewLog {
        let (easy_count, hard_count) = self.session_counts();
        let mut card_ids: Vec<String> = self.session_stats.keys().cloned().collect();
        card_ids.sort_by_key(|k| k.parse::<usize>().unwrap_or(usize::MAX));
        ReviewLog {
            id: Uuid::new_v4(),
            completed_at: chrono::Utc::now(),
            total_cards: Some(self.session_stats.len() as u32),
            easy_count,
            hard_count,
            card_ids,
        }
    }
}
