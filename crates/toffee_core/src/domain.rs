//! crates/toffee_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database, but they do carry serde
//! derives because question and card payloads cross the store and backend
//! boundaries as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::hash::content_hash;

/// The three quiz flavors the generation backend can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizKind {
    Mcq,
    Tf,
    Fitb,
}

impl QuizKind {
    pub const ALL: [QuizKind; 3] = [QuizKind::Mcq, QuizKind::Tf, QuizKind::Fitb];

    pub fn as_str(self) -> &'static str {
        match self {
            QuizKind::Mcq => "mcq",
            QuizKind::Tf => "tf",
            QuizKind::Fitb => "fitb",
        }
    }
}

impl std::str::FromStr for QuizKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mcq" => Ok(QuizKind::Mcq),
            "tf" => Ok(QuizKind::Tf),
            "fitb" => Ok(QuizKind::Fitb),
            other => Err(format!("'{}' is not a quiz kind", other)),
        }
    }
}

/// A single generated quiz question.
///
/// The backend's output drifts between shapes (MCQ questions carry
/// `choices`, true/false ones don't, answers may be strings or booleans),
/// so everything beyond the prompt itself is optional or untyped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Question {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    pub answer: Value,
}

/// The per-kind banks of generated questions stored on a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionBank {
    pub mcq: Vec<Question>,
    pub tf: Vec<Question>,
    pub fitb: Vec<Question>,
}

impl QuestionBank {
    pub fn of(&self, kind: QuizKind) -> &[Question] {
        match kind {
            QuizKind::Mcq => &self.mcq,
            QuizKind::Tf => &self.tf,
            QuizKind::Fitb => &self.fitb,
        }
    }

    pub fn of_mut(&mut self, kind: QuizKind) -> &mut Vec<Question> {
        match kind {
            QuizKind::Mcq => &mut self.mcq,
            QuizKind::Tf => &mut self.tf,
            QuizKind::Fitb => &mut self.fitb,
        }
    }
}

/// One graded answer from a submitted quiz. Result entries are append-only;
/// nothing in the application ever rewrites or removes one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuizResult {
    #[serde(rename = "questionIndex")]
    pub question_index: usize,
    pub correct: bool,
}

/// The per-kind append-only result logs stored on a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultLog {
    pub mcq: Vec<QuizResult>,
    pub tf: Vec<QuizResult>,
    pub fitb: Vec<QuizResult>,
}

impl ResultLog {
    pub fn of(&self, kind: QuizKind) -> &[QuizResult] {
        match kind {
            QuizKind::Mcq => &self.mcq,
            QuizKind::Tf => &self.tf,
            QuizKind::Fitb => &self.fitb,
        }
    }

    pub fn of_mut(&mut self, kind: QuizKind) -> &mut Vec<QuizResult> {
        match kind {
            QuizKind::Mcq => &mut self.mcq,
            QuizKind::Tf => &mut self.tf,
            QuizKind::Fitb => &mut self.fitb,
        }
    }
}

/// A study document owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub summary: String,
    pub text: String,
    /// Content digest used for marketplace dedup. Always produced by
    /// [`content_hash`]; older rows may carry an empty string.
    pub text_hash: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub questions: QuestionBank,
    #[serde(default)]
    pub results: ResultLog,
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub imported_from: Option<Uuid>,
}

/// The fields a caller supplies when creating a document. The hash is
/// computed here so every producer derives it the same way.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub summary: String,
    pub text: String,
    pub text_hash: String,
    pub tags: Vec<String>,
}

impl NewDocument {
    pub fn new(text: impl Into<String>, summary: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            summary: summary.into(),
            text_hash: content_hash(&text),
            text,
            tags: Vec::new(),
        }
    }
}

/// The back face of a flashcard. The backend emits either a definition or
/// a fill-in-the-blank style prompt, occasionally with a citation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardBack {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(rename = "fill in the blank", skip_serializing_if = "Option::is_none")]
    pub fill_in_the_blank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
}

impl CardBack {
    /// The text shown when the card is flipped; the definition wins when
    /// both forms are present.
    pub fn display_text(&self) -> &str {
        self.definition
            .as_deref()
            .or(self.fill_in_the_blank.as_deref())
            .unwrap_or("")
    }
}

/// A generated flashcard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Flashcard {
    pub front: String,
    pub back: CardBack,
}

/// Cumulative review counters for one card of one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardStat {
    pub views: u32,
    pub easy: u32,
    pub hard: u32,
}

/// A user's judgement of a card during review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardResponse {
    Easy,
    Hard,
}

/// A free-text annotation attached to a card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardNote {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Immutable record of one completed pass through a flashcard deck.
///
/// `total_cards` is optional because early records only stored `card_ids`;
/// readers fall back to `card_ids.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewLog {
    pub id: Uuid,
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub total_cards: Option<u32>,
    pub easy_count: u32,
    pub hard_count: u32,
    #[serde(default)]
    pub card_ids: Vec<String>,
}

impl ReviewLog {
    /// The number of cards studied in this pass, tolerating records that
    /// predate the `total_cards` field.
    pub fn cards_studied(&self) -> u32 {
        self.total_cards.unwrap_or(self.card_ids.len() as u32)
    }
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Caramel,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Caramel => "caramel",
        }
    }
}

/// One message in a document's chat thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn from_user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn from_caramel(text: impl Into<String>) -> Self {
        Self::new(Sender::Caramel, text)
    }

    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }
}

/// Per-user profile singleton. The quiz counters are only ever moved by
/// the store's atomic increments, never read-modify-write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub username: String,
    pub mcq_quizzes_taken: u32,
    pub mcq_correct: u32,
    pub mcq_total: u32,
    pub tf_quizzes_taken: u32,
    pub tf_correct: u32,
    pub tf_total: u32,
    pub fitb_quizzes_taken: u32,
    pub fitb_correct: u32,
    pub fitb_total: u32,
}

/// A document published to the cross-user marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceEntry {
    pub id: Uuid,
    pub summary: String,
    pub text: String,
    pub text_hash: String,
    #[serde(default)]
    pub questions: QuestionBank,
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
    pub shared_by: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub shared_at: DateTime<Utc>,
}

/// The fields supplied when publishing a document to the marketplace.
#[derive(Debug, Clone)]
pub struct NewMarketplaceEntry {
    pub summary: String,
    pub text: String,
    pub text_hash: String,
    pub questions: QuestionBank,
    pub flashcards: Vec<Flashcard>,
    pub shared_by: String,
    pub tags: Vec<String>,
}

/// A front/back pair extracted from an uploaded Anki package.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnkiCard {
    pub front: String,
    pub back: String,
}

/// Grading output for one Feynman-technique explanation. The backend's
/// rubric fields vary, so they stay untyped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeynmanFeedback {
    pub feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clarity: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completeness: Option<Value>,
}

/// User-tunable knobs forwarded to the question generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub difficulty: String,
    pub focus_areas: Vec<String>,
    pub sample_questions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_questions: Option<u32>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            difficulty: "Easy".to_string(),
            focus_areas: Vec::new(),
            sample_questions: Vec::new(),
            number_of_questions: None,
        }
    }
}

/// Strips control characters and collapses whitespace so pasted document
/// text survives the trip through a JSON request body.
pub fn clean_for_json(input: &str) -> String {
    let mut cleaned = String::with_capacity(input.len());
    let mut last_was_space = false;
    for c in input.chars() {
        let c = match c {
            '\u{0}' => continue,
            c if c.is_control() => ' ',
            c => c,
        };
        if c.is_whitespace() {
            if !last_was_space {
                cleaned.push(' ');
            }
            last_was_space = true;
        } else {
            cleaned.push(c);
            last_was_space = false;
        }
    }
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_for_json_strips_controls_and_collapses_whitespace() {
        let input = "a\u{0}b\tc\n\nd   e";
        assert_eq!(clean_for_json(input), "ab c d e");
    }

    #[test]
    fn card_back_prefers_definition() {
        let back = CardBack {
            definition: Some("a digest".to_string()),
            fill_in_the_blank: Some("a ___".to_string()),
            citation: None,
        };
        assert_eq!(back.display_text(), "a digest");
    }

    #[test]
    fn card_back_deserializes_blank_form_key() {
        let back: CardBack =
            serde_json::from_str(r#"{"fill in the blank": "the ___ ratio"}"#).unwrap();
        assert_eq!(back.display_text(), "the ___ ratio");
    }

    #[test]
    fn review_log_falls_back_to_card_ids() {
        let log = ReviewLog {
            id: Uuid::new_v4(),
            completed_at: Utc::now(),
            total_cards: None,
            easy_count: 1,
            hard_count: 0,
            card_ids: vec!["0".to_string(), "3".to_string()],
        };
        assert_eq!(log.cards_studied(), 2);
    }

    #[test]
    fn malformed_results_deserialize_as_empty() {
        let log: ResultLog = serde_json::from_str("{}").unwrap();
        assert!(log.mcq.is_empty() && log.tf.is_empty() && log.fitb.is_empty());
    }
}
