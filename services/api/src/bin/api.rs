//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{NougatAdapter, OpenRouterSummaryAdapter, PgStore, VercelBlobAdapter},
    config::Config,
    error::ApiError,
    web::{
        add_card_note_handler, chat_handler, current_card_handler, delete_card_note_handler,
        delete_document_handler, feynman_handler, generate_questions_handler,
        get_document_handler, get_profile_handler, get_questions_handler, import_anki_handler,
        import_marketplace_handler, import_transcript_handler, keyterms_handler,
        lifetime_stats_handler, list_card_notes_handler, list_documents_handler,
        list_marketplace_handler, list_messages_handler, reset_card_handler, respond_handler,
        rest::ApiDoc, restart_review_handler, share_document_handler, start_review_handler,
        state::AppState, submit_quiz_handler, update_profile_handler, upload_document_handler,
        weekly_stats_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{delete, get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use toffee_core::ports::{BlobStorage, SummaryService};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            config.log_level.to_string(),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(PgStore::new(db_pool.clone()));
    info!("Running database migrations...");
    store.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let http_client = reqwest::Client::new();
    let nougat = Arc::new(NougatAdapter::new(
        http_client.clone(),
        config.nougat_base_url.clone(),
    ));

    let summarizer = config.openrouter_api_key.as_ref().map(|key| {
        let openai_config = OpenAIConfig::new()
            .with_api_base(OPENROUTER_API_BASE)
            .with_api_key(key);
        Arc::new(OpenRouterSummaryAdapter::new(
            Client::with_config(openai_config),
            config.summary_model.clone(),
        )) as Arc<dyn SummaryService>
    });
    if summarizer.is_none() {
        info!("OPENROUTER_API_KEY not set; uploads will use text-derived titles.");
    }

    let blobs = match (&config.blob_base_url, &config.blob_token) {
        (Some(base_url), Some(token)) => Some(Arc::new(VercelBlobAdapter::new(
            http_client.clone(),
            base_url.clone(),
            token.clone(),
        )) as Arc<dyn BlobStorage>),
        _ => {
            info!("Blob storage not configured; Anki import is disabled.");
            None
        }
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        store,
        generator: nougat.clone(),
        chat: nougat.clone(),
        media: nougat,
        summarizer,
        blobs,
        config: config.clone(),
        reviews: Mutex::new(HashMap::new()),
    });

    let cors = CorsLayer::new()
        .allow_origin(
            "http://localhost:3000"
                .parse::<HeaderValue>()
                .map_err(|e| ApiError::Internal(e.to_string()))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route(
            "/documents",
            post(upload_document_handler).get(list_documents_handler),
        )
        .route(
            "/documents/{id}",
            get(get_document_handler).delete(delete_document_handler),
        )
        .route(
            "/documents/{id}/questions/{kind}",
            post(generate_questions_handler).get(get_questions_handler),
        )
        .route("/documents/{id}/quiz/{kind}", post(submit_quiz_handler))
        .route("/documents/{id}/keyterms", post(keyterms_handler))
        .route("/documents/{id}/feynman", post(feynman_handler))
        .route("/documents/{id}/review", post(start_review_handler))
        .route("/documents/{id}/cards/{index}", delete(reset_card_handler))
        .route(
            "/documents/{id}/cards/{index}/notes",
            get(list_card_notes_handler).post(add_card_note_handler),
        )
        .route(
            "/documents/{id}/cards/{index}/notes/{note_id}",
            delete(delete_card_note_handler),
        )
        .route("/documents/{id}/messages", get(list_messages_handler))
        .route("/documents/{id}/chat", post(chat_handler))
        .route("/documents/{id}/share", post(share_document_handler))
        .route("/review/{session_id}", get(current_card_handler))
        .route("/review/{session_id}/respond", post(respond_handler))
        .route("/review/{session_id}/restart", post(restart_review_handler))
        .route("/stats", get(lifetime_stats_handler))
        .route("/stats/weekly", get(weekly_stats_handler))
        .route(
            "/profile",
            get(get_profile_handler).put(update_profile_handler),
        )
        .route("/marketplace", get(list_marketplace_handler))
        .route(
            "/marketplace/{id}/import",
            post(import_marketplace_handler),
        )
        .route("/import/transcript", post(import_transcript_handler))
        .route("/import/anki", post(import_anki_handler))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
