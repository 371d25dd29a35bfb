//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for documents, question generation,
//! quizzes, stats, the user profile, and the Feynman recall flow, plus
//! the master definition for the OpenAPI specification.

use crate::web::state::AppState;
use crate::web::{port_error, require_user, resolve_summary};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use toffee_core::domain::{
    clean_for_json, GenerationParams, NewDocument, Question, QuizKind, QuizResult,
};
use toffee_core::stats::{day_labels, lifetime_stats, weekly_stats, WeeklyStats};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        upload_document_handler,
    ),
    components(
        schemas(UploadDocumentRequest, UploadDocumentResponse)
    ),
    tags(
        (name = "Toffee API", description = "API endpoints for the study-aid service.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The payload for uploading pasted study content.
#[derive(Deserialize, ToSchema)]
pub struct UploadDocumentRequest {
    pub text: String,
    /// Optional deck title; summarized from the text when omitted.
    #[serde(default)]
    pub summary: Option<String>,
}

/// The response payload sent after successfully saving a document.
#[derive(Serialize, ToSchema)]
pub struct UploadDocumentResponse {
    document_id: Uuid,
    summary: String,
}

#[derive(Deserialize)]
pub struct QuizSubmission {
    pub results: Vec<QuizResult>,
}

#[derive(Serialize)]
pub struct QuizRecorded {
    recorded: usize,
    correct: usize,
}

#[derive(Serialize)]
pub struct WeeklyOverview {
    #[serde(flatten)]
    stats: WeeklyStats,
    /// Weekday initials for the streak slots, oldest first.
    labels: [&'static str; 7],
}

#[derive(Deserialize)]
pub struct UsernameUpdate {
    pub username: String,
}

#[derive(Deserialize)]
pub struct FeynmanSubmission {
    pub term: String,
    pub response: String,
}

fn parse_kind(kind: &str) -> Result<QuizKind, (StatusCode, String)> {
    kind.parse::<QuizKind>()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))
}

//=========================================================================================
// Document Handlers
//=========================================================================================

/// Save pasted study content as a new document.
///
/// A `x-user-id` header is required to associate the document with a user.
#[utoipa::path(
    post,
    path = "/documents",
    request_body = UploadDocumentRequest,
    responses(
        (status = 201, description = "Document saved successfully", body = UploadDocumentResponse),
        (status = 400, description = "Bad request (e.g., missing header or empty text)"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn upload_document_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<UploadDocumentRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    if payload.text.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Document text must not be empty".to_string(),
        ));
    }

    let summary = resolve_summary(&app_state, &payload.text, payload.summary).await;
    let doc = app_state
        .store
        .save_document(owner_id, NewDocument::new(payload.text, summary))
        .await
        .map_err(|e| port_error("save document", e))?;

    Ok((
        StatusCode::CREATED,
        Json(UploadDocumentResponse {
            document_id: doc.id,
            summary: doc.summary,
        }),
    ))
}

pub async fn list_documents_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let docs = app_state
        .store
        .list_documents(owner_id)
        .await
        .map_err(|e| port_error("list documents", e))?;
    Ok(Json(docs))
}

pub async fn get_document_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let doc = app_state
        .store
        .get_document(owner_id, document_id)
        .await
        .map_err(|e| port_error("load document", e))?;
    Ok(Json(doc))
}

pub async fn delete_document_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    app_state
        .store
        .delete_document(owner_id, document_id)
        .await
        .map_err(|e| port_error("delete document", e))?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Question Generation and Quiz Handlers
//=========================================================================================

pub async fn generate_questions_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((document_id, kind)): Path<(Uuid, String)>,
    Json(params): Json<GenerationParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let kind = parse_kind(&kind)?;
    let doc = app_state
        .store
        .get_document(owner_id, document_id)
        .await
        .map_err(|e| port_error("load document", e))?;

    let source = clean_for_json(&doc.text);
    let questions = app_state
        .generator
        .generate_questions(kind, &source, &params)
        .await
        .map_err(|e| port_error("generate questions", e))?;

    app_state
        .store
        .set_questions(owner_id, document_id, kind, &questions)
        .await
        .map_err(|e| port_error("save questions", e))?;
    Ok(Json(questions))
}

pub async fn get_questions_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((document_id, kind)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let kind = parse_kind(&kind)?;
    let doc = app_state
        .store
        .get_document(owner_id, document_id)
        .await
        .map_err(|e| port_error("load document", e))?;
    let questions: Vec<Question> = doc.questions.of(kind).to_vec();
    Ok(Json(questions))
}

pub async fn submit_quiz_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((document_id, kind)): Path<(Uuid, String)>,
    Json(submission): Json<QuizSubmission>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let kind = parse_kind(&kind)?;
    if submission.results.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "A quiz submission needs at least one result".to_string(),
        ));
    }

    app_state
        .store
        .append_quiz_results(owner_id, document_id, kind, &submission.results)
        .await
        .map_err(|e| port_error("record quiz results", e))?;

    let correct = submission.results.iter().filter(|r| r.correct).count();
    app_state
        .store
        .bump_quiz_counters(owner_id, kind, correct as u32, submission.results.len() as u32)
        .await
        .map_err(|e| port_error("update quiz counters", e))?;

    Ok(Json(QuizRecorded {
        recorded: submission.results.len(),
        correct,
    }))
}

//=========================================================================================
// Stats and Profile Handlers
//=========================================================================================

pub async fn lifetime_stats_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let docs = app_state
        .store
        .list_documents(owner_id)
        .await
        .map_err(|e| port_error("load documents", e))?;

    // The store has no cross-document aggregation, so review logs are
    // gathered per document, mirroring its nested layout.
    let mut reviews = Vec::new();
    for doc in &docs {
        let logs = app_state
            .store
            .reviews_for_document(owner_id, doc.id)
            .await
            .map_err(|e| port_error("load review history", e))?;
        reviews.extend(logs);
    }

    Ok(Json(lifetime_stats(&docs, &reviews)))
}

pub async fn weekly_stats_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let docs = app_state
        .store
        .list_documents(owner_id)
        .await
        .map_err(|e| port_error("load documents", e))?;

    let today = Local::now().date_naive();
    Ok(Json(WeeklyOverview {
        stats: weekly_stats(&docs, today),
        labels: day_labels(today),
    }))
}

pub async fn get_profile_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let profile = app_state
        .store
        .get_profile(owner_id)
        .await
        .map_err(|e| port_error("load profile", e))?;
    Ok(Json(profile))
}

pub async fn update_profile_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<UsernameUpdate>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let username = payload.username.trim();
    if username.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Username must not be empty".to_string(),
        ));
    }
    app_state
        .store
        .update_username(owner_id, username)
        .await
        .map_err(|e| port_error("update profile", e))?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Feynman Recall Handlers
//=========================================================================================

pub async fn keyterms_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    let doc = app_state
        .store
        .get_document(owner_id, document_id)
        .await
        .map_err(|e| port_error("load document", e))?;
    let terms = app_state
        .generator
        .extract_keyterms(&doc.text)
        .await
        .map_err(|e| port_error("extract key terms", e))?;
    Ok(Json(terms))
}

pub async fn feynman_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(document_id): Path<Uuid>,
    Json(submission): Json<FeynmanSubmission>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let owner_id = require_user(&headers)?;
    if submission.response.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "An explanation is required".to_string(),
        ));
    }
    let doc = app_state
        .store
        .get_document(owner_id, document_id)
        .await
        .map_err(|e| port_error("load document", e))?;
    let feedback = app_state
        .generator
        .grade_explanation(&submission.term, &doc.text, &submission.response)
        .await
        .map_err(|e| port_error("grade explanation", e))?;
    Ok(Json(feedback))
}
