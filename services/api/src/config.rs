//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    /// Base URL of the generation backend.
    pub nougat_base_url: String,
    /// OpenRouter key for the deck-title summarizer. Uploads fall back to
    /// a text-derived title when absent.
    pub openrouter_api_key: Option<String>,
    pub summary_model: String,
    /// Blob storage for Anki packages. Anki import is unavailable until
    /// both are set.
    pub blob_base_url: Option<String>,
    pub blob_token: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Backend Settings ---
        let nougat_base_url = std::env::var("NOUGAT_BASE_URL")
            .unwrap_or_else(|_| "https://nougat-omega.vercel.app".to_string());

        let openrouter_api_key = std::env::var("OPENROUTER_API_KEY").ok();
        let summary_model = std::env::var("SUMMARY_MODEL")
            .unwrap_or_else(|_| "google/gemini-2.0-flash-lite-001".to_string());

        let blob_base_url = std::env::var("BLOB_BASE_URL").ok();
        let blob_token = std::env::var("BLOB_TOKEN").ok();

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            nougat_base_url,
            openrouter_api_key,
            summary_model,
            blob_base_url,
            blob_token,
        })
    }
}
