pub mod domain;
pub mod hash;
pub mod marketplace;
pub mod ports;
pub mod prioritize;
pub mod review;
pub mod stats;

pub use domain::{
    AnkiCard, CardNote, CardResponse, CardStat, ChatMessage, Document, FeynmanFeedback, Flashcard,
    GenerationParams, MarketplaceEntry, NewDocument, NewMarketplaceEntry, Question, QuestionBank,
    QuizKind, QuizResult, ResultLog, ReviewLog, Sender, UserProfile,
};
pub use hash::content_hash;
pub use ports::{
    BlobStorage, ChatService, ChunkStream, MediaImportService, PortError, PortResult,
    QuestionGenerator, StudyStore, SummaryService,
};
pub use prioritize::{prioritize, RankedCard};
pub use review::{ReviewSession, ReviewState};
pub use stats::{day_labels, lifetime_stats, weekly_stats, LifetimeStats, WeeklyStats};
