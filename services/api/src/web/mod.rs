pub mod chat;
pub mod market;
pub mod rest;
pub mod review;
pub mod state;

pub use chat::{chat_handler, list_messages_handler};
pub use market::{
    import_anki_handler, import_marketplace_handler, import_transcript_handler,
    list_marketplace_handler, share_document_handler,
};
pub use rest::{
    delete_document_handler, feynman_handler, generate_questions_handler, get_document_handler,
    get_profile_handler, get_questions_handler, keyterms_handler, lifetime_stats_handler,
    list_documents_handler, submit_quiz_handler, update_profile_handler, upload_document_handler,
    weekly_stats_handler,
};
pub use review::{
    add_card_note_handler, current_card_handler, delete_card_note_handler, list_card_notes_handler,
    reset_card_handler, respond_handler, restart_review_handler, start_review_handler,
};

use axum::http::{HeaderMap, StatusCode};
use tracing::{error, warn};
use uuid::Uuid;

use crate::web::state::AppState;
use toffee_core::ports::PortError;

/// Pulls the acting user out of the `x-user-id` header. Auth proper lives
/// in front of this service; the header is the session identity it hands us.
pub(crate) fn require_user(headers: &HeaderMap) -> Result<Uuid, (StatusCode, String)> {
    let user_id_str = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "x-user-id header is required".to_string(),
            )
        })?;
    Uuid::parse_str(user_id_str).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid x-user-id format".to_string(),
        )
    })
}

/// Maps a port failure onto a response. Duplicate-action conditions keep
/// their specific wording so clients can warn precisely; unexpected
/// failures log the cause and return a generic message.
pub(crate) fn port_error(context: &str, err: PortError) -> (StatusCode, String) {
    match err {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::AlreadyShared => (StatusCode::CONFLICT, "Already shared".to_string()),
        PortError::AlreadyImported => (StatusCode::CONFLICT, "Already imported".to_string()),
        PortError::Unexpected(msg) => {
            error!("{}: {}", context, msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {}", context),
            )
        }
    }
}

/// A display title when the upload didn't bring one: the first line of
/// the text, clipped.
pub(crate) fn fallback_title(text: &str) -> String {
    let first_line = text.trim().lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        return "Untitled Document".to_string();
    }
    first_line.chars().take(60).collect()
}

/// Resolves a document summary: the caller's own when given, otherwise
/// the summarizer's one-liner, otherwise a title clipped from the text.
pub(crate) async fn resolve_summary(
    state: &AppState,
    text: &str,
    provided: Option<String>,
) -> String {
    if let Some(summary) = provided.filter(|s| !s.trim().is_empty()) {
        return summary;
    }
    if let Some(summarizer) = &state.summarizer {
        match summarizer.summarize_title(text).await {
            Ok(title) if !title.is_empty() => return title,
            Ok(_) => {}
            Err(err) => warn!("summarizer unavailable, using fallback title: {}", err),
        }
    }
    fallback_title(text)
}
