//! services/api/src/web/market.rs
//!
//! Handlers for the cross-user marketplace and the two backend-assisted
//! imports (video transcripts and Anki packages).

use crate::web::state::AppState;
use crate::web::{port_error, require_user, resolve_summary};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use std::sync::Arc;
use toffee_core::domain::NewDocument;
use toffee_core::marketplace::{import_document, share_document};
use uuid::Uuid;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct MarketplaceFilter {
    pub tag: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ShareRequest {
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct TranscriptRequest {
    pub url: String,
}

//=========================================================================================
// Marketplace Handlers
//=========================================================================================

pub async fn list_marketplace_handler(
    State(app_state): State<Arc<AppState>>,
    Query(filter): Query<MarketplaceFilter>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let entries = app_state
        .store
        .marketplace_entries(filter.tag.as_deref())
        .await
        .map_err(|e| port_error("load marketplace", e))?;
    Ok(Json(entries))
}

pub async fn share_document_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<ShareRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let entry = share_document(
        app_state.store.as_ref(),
        owner_id,
        document_id,
        payload.tags,
    )
    .await
    .map_err(|e| port_error("share document", e))?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn import_marketplace_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(entry_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let doc = import_document(app_state.store.as_ref(), owner_id, entry_id)
        .await
        .map_err(|e| port_error("import document", e))?;
    Ok((StatusCode::CREATED, Json(doc)))
}

//=========================================================================================
// Backend-Assisted Import Handlers
//=========================================================================================

/// Imports a YouTube video by extracting its transcript and saving it as
/// a regular document.
pub async fn import_transcript_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<TranscriptRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    if payload.url.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "A video URL is required".to_string(),
        ));
    }

    let transcript = app_state
        .media
        .fetch_transcript(payload.url.trim())
        .await
        .map_err(|e| port_error("extract transcript", e))?;
    if transcript.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "No transcript available for this video".to_string(),
        ));
    }

    let summary = resolve_summary(&app_state, &transcript, None).await;
    let doc = app_state
        .store
        .save_document(owner_id, NewDocument::new(transcript, summary))
        .await
        .map_err(|e| port_error("save document", e))?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// Imports an uploaded `.apkg` file: the package goes to blob storage,
/// the backend converts it to cards, and the cards become a `Q:`/`A:`
/// text document.
pub async fn import_anki_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let blobs = app_state.blobs.clone().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Blob storage is not configured".to_string(),
        )
    })?;

    let (file_name, file_bytes) =
        if let Some(field) = multipart.next_field().await.map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to read multipart data: {}", e),
            )
        })? {
            let name = field.file_name().unwrap_or("deck.apkg").to_string();
            let data = field.bytes().await.map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to read file bytes: {}", e),
                )
            })?;
            (name, data.to_vec())
        } else {
            return Err((
                StatusCode::BAD_REQUEST,
                "Multipart form must include a file".to_string(),
            ));
        };

    if !file_name.ends_with(".apkg") {
        return Err((
            StatusCode::BAD_REQUEST,
            "Please select a valid .apkg file".to_string(),
        ));
    }

    let blob_url = blobs
        .upload_if_absent(&format!("anki/{}", file_name), file_bytes)
        .await
        .map_err(|e| port_error("upload Anki package", e))?;

    let cards = app_state
        .media
        .convert_anki(&blob_url)
        .await
        .map_err(|e| port_error("convert Anki package", e))?;
    if cards.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "No cards found in Anki file".to_string(),
        ));
    }

    let text = cards
        .iter()
        .map(|card| format!("Q: {}\nA: {}", card.front, card.back))
        .collect::<Vec<_>>()
        .join("\n\n");
    let summary = format!("Imported {} flashcards from Anki.", cards.len());

    let doc = app_state
        .store
        .save_document(owner_id, NewDocument::new(text, summary))
        .await
        .map_err(|e| port_error("save document", e))?;
    Ok((StatusCode::CREATED, Json(doc)))
}
