//! Drives the flashcard review flow end to end against the in-memory
//! store: stat progression, session logging, restart, and failure
//! behavior.

mod support;

use std::sync::Arc;

use support::MemoryStore;
use toffee_core::domain::{CardBack, CardResponse, CardStat, Flashcard};
use toffee_core::review::{ReviewSession, ReviewState};
use toffee_core::StudyStore;
use uuid::Uuid;

fn card(front: &str) -> Flashcard {
    Flashcard {
        front: front.to_string(),
        back: CardBack {
            definition: Some(format!("definition of {}", front)),
            fill_in_the_blank: None,
            citation: None,
        },
    }
}

async fn open_session(
    store: &Arc<MemoryStore>,
    cards: Vec<Flashcard>,
) -> (ReviewSession, Uuid, Uuid) {
    let owner = Uuid::new_v4();
    let doc = Uuid::new_v4();
    let session = ReviewSession::begin(store.clone() as Arc<dyn StudyStore>, owner, doc, cards)
        .await
        .unwrap();
    (session, owner, doc)
}

#[tokio::test]
async fn hard_then_easy_builds_the_expected_stat() {
    let store = Arc::new(MemoryStore::new());
    let (mut session, owner, doc) = open_session(&store, vec![card("osmosis")]).await;

    session.respond(CardResponse::Hard, None).await.unwrap();
    assert_eq!(
        store.stat(owner, doc, "0").unwrap(),
        CardStat { views: 1, easy: 0, hard: 1 }
    );

    // A second pass over the same single-card deck.
    session.restart();
    session.respond(CardResponse::Easy, None).await.unwrap();
    assert_eq!(
        store.stat(owner, doc, "0").unwrap(),
        CardStat { views: 2, easy: 1, hard: 1 }
    );
}

#[tokio::test]
async fn stats_are_keyed_by_original_index_not_display_position() {
    let store = Arc::new(MemoryStore::new());
    let owner = Uuid::new_v4();
    let doc = Uuid::new_v4();

    // Make card 0 well-known so prioritization moves it to the back.
    for _ in 0..5 {
        store
            .record_card_response(owner, doc, "0", CardResponse::Easy)
            .await
            .unwrap();
    }

    let cards = vec![card("mastered"), card("fresh")];
    let mut session = ReviewSession::begin(store.clone(), owner, doc, cards)
        .await
        .unwrap();
    assert_eq!(session.current().unwrap().original_index, 1);

    // Responding to the first displayed card must bump card 1's stat.
    session.respond(CardResponse::Hard, None).await.unwrap();
    assert_eq!(
        store.stat(owner, doc, "1").unwrap(),
        CardStat { views: 1, easy: 0, hard: 1 }
    );
    assert_eq!(store.stat(owner, doc, "0").unwrap().views, 5);
}

#[tokio::test]
async fn completing_the_deck_logs_one_session_with_presence_counts() {
    let store = Arc::new(MemoryStore::new());
    let (mut session, owner, doc) =
        open_session(&store, vec![card("a"), card("b"), card("c")]).await;

    session.respond(CardResponse::Easy, None).await.unwrap();
    session.respond(CardResponse::Hard, Some("tricky")).await.unwrap();
    let state = session.respond(CardResponse::Easy, None).await.unwrap();
    assert_eq!(state, ReviewState::Complete);

    let logs = store.review_logs(owner, doc);
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].total_cards, Some(3));
    assert_eq!(logs[0].easy_count, 2);
    assert_eq!(logs[0].hard_count, 1);
    assert_eq!(logs[0].card_ids.len(), 3);

    // The note recorded alongside the hard response landed on card 1.
    let key = logs[0].card_ids[1].clone();
    let notes = store.card_notes(owner, doc, &key).await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].text, "tricky");
}

#[tokio::test]
async fn restart_clears_session_counters_but_not_history() {
    let store = Arc::new(MemoryStore::new());
    let (mut session, owner, doc) = open_session(&store, vec![card("a"), card("b")]).await;

    session.respond(CardResponse::Hard, None).await.unwrap();
    session.respond(CardResponse::Easy, None).await.unwrap();
    assert_eq!(session.state(), ReviewState::Complete);
    assert_eq!(store.review_logs(owner, doc).len(), 1);

    session.restart();
    assert_eq!(session.state(), ReviewState::Reviewing(0));
    assert_eq!(session.session_counts(), (0, 0));
    // Persisted stats survive the restart.
    assert_eq!(store.stat(owner, doc, "0").unwrap().views, 1);

    // A full second pass logs a second session.
    session.respond(CardResponse::Easy, None).await.unwrap();
    session.respond(CardResponse::Easy, None).await.unwrap();
    assert_eq!(store.review_logs(owner, doc).len(), 2);
}

#[tokio::test]
async fn a_failed_stat_write_leaves_the_cursor_unmoved() {
    let store = Arc::new(MemoryStore::new());
    let (mut session, owner, doc) = open_session(&store, vec![card("a"), card("b")]).await;

    store.fail_stat_writes(true);
    let err = session.respond(CardResponse::Hard, None).await;
    assert!(err.is_err());
    assert_eq!(session.state(), ReviewState::Reviewing(0));
    assert_eq!(session.session_counts(), (0, 0));
    assert!(store.stat(owner, doc, "0").is_none());

    // The retry succeeds once the store recovers.
    store.fail_stat_writes(false);
    session.respond(CardResponse::Hard, None).await.unwrap();
    assert_eq!(session.state(), ReviewState::Reviewing(1));
    assert_eq!(store.stat(owner, doc, "0").unwrap().hard, 1);
}

#[tokio::test]
async fn reset_card_removes_stat_and_notes_together() {
    let store = Arc::new(MemoryStore::new());
    let owner = Uuid::new_v4();
    let doc = Uuid::new_v4();

    store
        .record_card_response(owner, doc, "2", CardResponse::Hard)
        .await
        .unwrap();
    store.add_card_note(owner, doc, "2", "remember this").await.unwrap();

    store.reset_card(owner, doc, "2").await.unwrap();
    assert!(store.stat(owner, doc, "2").is_none());
    assert!(store.card_notes(owner, doc, "2").await.unwrap().is_empty());
}
