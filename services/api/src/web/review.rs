//! services/api/src/web/review.rs
//!
//! Handlers for the flashcard review flow: opening a session over a
//! prioritized deck, Easy/Hard responses, restarts, card notes, and
//! per-card progress resets. Sessions live in the in-process registry on
//! `AppState`; the cumulative stats they mutate live in the store.

use crate::web::state::AppState;
use crate::web::{port_error, require_user};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use toffee_core::domain::{CardResponse, Flashcard};
use toffee_core::review::{ReviewSession, ReviewState};
use tracing::warn;
use uuid::Uuid;

//=========================================================================================
// Payload and Response Structs
//=========================================================================================

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct StartReviewRequest {
    /// Cards to review; generated from the document when omitted.
    pub cards: Option<Vec<Flashcard>>,
}

#[derive(Serialize)]
pub struct CardView {
    pub position: usize,
    pub total: usize,
    pub original_index: usize,
    pub card: Flashcard,
}

#[derive(Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<CardView>,
    pub easy_count: u32,
    pub hard_count: u32,
}

#[derive(Deserialize)]
pub struct RespondRequest {
    pub response: CardResponse,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct NoteRequest {
    pub text: String,
}

fn state_label(state: ReviewState) -> &'static str {
    match state {
        ReviewState::Reviewing(_) => "reviewing",
        ReviewState::Complete => "complete",
    }
}

fn session_view(session_id: Uuid, session: &ReviewSession) -> SessionView {
    let current = session.current().map(|ranked| CardView {
        position: match session.state() {
            ReviewState::Reviewing(idx) => idx,
            ReviewState::Complete => 0,
        },
        total: session.deck().len(),
        original_index: ranked.original_index,
        card: ranked.card.clone(),
    });
    let (easy_count, hard_count) = session.session_counts();
    SessionView {
        session_id,
        state: state_label(session.state()),
        current,
        easy_count,
        hard_count,
    }
}

//=========================================================================================
// Session Handlers
//=========================================================================================

pub async fn start_review_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<StartReviewRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let doc = app_state
        .store
        .get_document(owner_id, document_id)
        .await
        .map_err(|e| port_error("load document", e))?;

    let cards = match payload.cards {
        Some(cards) if !cards.is_empty() => cards,
        _ if !doc.flashcards.is_empty() => doc.flashcards.clone(),
        _ => {
            let generated = app_state
                .generator
                .generate_flashcards(&doc.text)
                .await
                .map_err(|e| port_error("generate flashcards", e))?;
            if !generated.is_empty() {
                // Keep the deck on the document so later sessions (and
                // marketplace shares) reuse it instead of regenerating.
                if let Err(err) = app_state
                    .store
                    .set_flashcards(owner_id, document_id, &generated)
                    .await
                {
                    warn!("failed to persist generated flashcards: {}", err);
                }
            }
            generated
        }
    };

    if cards.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "No flashcards available for this document".to_string(),
        ));
    }

    let session = ReviewSession::begin(app_state.store.clone(), owner_id, document_id, cards)
        .await
        .map_err(|e| port_error("start review session", e))?;

    let session_id = Uuid::new_v4();
    let view = session_view(session_id, &session);
    app_state.reviews.lock().await.insert(session_id, session);
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn current_card_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let sessions = app_state.reviews.lock().await;
    let session = sessions
        .get(&session_id)
        .filter(|s| s.owner_id() == owner_id)
        .ok_or_else(|| session_not_found(session_id))?;
    Ok(Json(session_view(session_id, session)))
}

pub async fn respond_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<RespondRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let mut sessions = app_state.reviews.lock().await;
    let session = sessions
        .get_mut(&session_id)
        .filter(|s| s.owner_id() == owner_id)
        .ok_or_else(|| session_not_found(session_id))?;

    session
        .respond(payload.response, payload.note.as_deref())
        .await
        .map_err(|e| port_error("record card response", e))?;
    Ok(Json(session_view(session_id, session)))
}

pub async fn restart_review_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let mut sessions = app_state.reviews.lock().await;
    let session = sessions
        .get_mut(&session_id)
        .filter(|s| s.owner_id() == owner_id)
        .ok_or_else(|| session_not_found(session_id))?;
    session.restart();
    Ok(Json(session_view(session_id, session)))
}

fn session_not_found(session_id: Uuid) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        format!("Review session {} not found", session_id),
    )
}

//=========================================================================================
// Card Note and Reset Handlers
//=========================================================================================

pub async fn list_card_notes_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((document_id, card_index)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let notes = app_state
        .store
        .card_notes(owner_id, document_id, &card_index)
        .await
        .map_err(|e| port_error("load card notes", e))?;
    Ok(Json(notes))
}

pub async fn add_card_note_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((document_id, card_index)): Path<(Uuid, String)>,
    Json(payload): Json<NoteRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let text = payload.text.trim();
    if text.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "A note needs some text".to_string(),
        ));
    }
    let note = app_state
        .store
        .add_card_note(owner_id, document_id, &card_index, text)
        .await
        .map_err(|e| port_error("save card note", e))?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn delete_card_note_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((document_id, card_index, note_id)): Path<(Uuid, String, Uuid)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    app_state
        .store
        .delete_card_note(owner_id, document_id, &card_index, note_id)
        .await
        .map_err(|e| port_error("delete card note", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Wipes one card's accumulated stat and notes. The store deletes notes
/// first, then the stat; a failure surfaces here for the user to retry.
pub async fn reset_card_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((document_id, card_index)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    app_state
        .store
        .reset_card(owner_id, document_id, &card_index)
        .await
        .map_err(|e| port_error("reset card progress", e))?;
    Ok(StatusCode::NO_CONTENT)
}
