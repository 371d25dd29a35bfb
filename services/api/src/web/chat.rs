//! services/api/src/web/chat.rs
//!
//! The document chat: questions go to the backend's streaming endpoint,
//! chunks are relayed to the client as they decode, and the accumulated
//! answer is persisted once the stream ends.

use crate::web::state::AppState;
use crate::web::{port_error, require_user};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use bytes::Bytes;
use futures::StreamExt;
use serde::Deserialize;
use std::sync::Arc;
use toffee_core::domain::ChatMessage;
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

pub async fn list_messages_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let messages = app_state
        .store
        .messages_for_document(owner_id, document_id)
        .await
        .map_err(|e| port_error("load chat history", e))?;
    Ok(Json(messages))
}

/// Asks a question about a document and streams the answer back as plain
/// text chunks.
///
/// The user's message is persisted before the backend is contacted; the
/// assistant's message is persisted with whatever accumulated once the
/// stream finishes, even if it was cut short.
pub async fn chat_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let question = payload.question.trim().to_string();
    if question.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "A question is required".to_string(),
        ));
    }

    let doc = app_state
        .store
        .get_document(owner_id, document_id)
        .await
        .map_err(|e| port_error("load document", e))?;

    let user_message = ChatMessage::from_user(question.clone());
    app_state
        .store
        .append_message(owner_id, document_id, &user_message)
        .await
        .map_err(|e| port_error("save chat message", e))?;

    let mut upstream = app_state
        .chat
        .chat_stream(&doc.text, &question)
        .await
        .map_err(|e| port_error("reach the chat backend", e))?;

    let store = app_state.store.clone();
    let body_stream = async_stream::stream! {
        let mut answer = String::new();
        while let Some(chunk) = upstream.next().await {
            match chunk {
                Ok(text) => {
                    answer.push_str(&text);
                    yield Ok::<_, std::io::Error>(Bytes::from(text));
                }
                Err(err) => {
                    // The client keeps what already arrived; the rest of
                    // the answer is simply lost to this failure.
                    warn!("chat stream interrupted: {}", err);
                    break;
                }
            }
        }
        let reply = ChatMessage::from_caramel(answer);
        if let Err(err) = store.append_message(owner_id, document_id, &reply).await {
            error!("failed to persist chat reply: {}", err);
        }
    };

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(body_stream),
    ))
}
