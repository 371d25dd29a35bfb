//! services/api/src/adapters/summary_llm.rs
//!
//! This module contains the adapter for the deck-title summarizer.
//! It implements the `SummaryService` port from the `core` crate against
//! an OpenAI-compatible endpoint (OpenRouter).

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use toffee_core::ports::{PortError, PortResult, SummaryService};

/// An adapter that titles uploaded documents with one-line summaries.
#[derive(Clone)]
pub struct OpenRouterSummaryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenRouterSummaryAdapter {
    /// Creates a new `OpenRouterSummaryAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl SummaryService for OpenRouterSummaryAdapter {
    async fn summarize_title(&self, text: &str) -> PortResult<String> {
        // The full document isn't needed to name it.
        let preview = text.chars().take(1000).collect::<String>();

        let messages = vec![ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!(
                    "Summarize this text in one line for a flashcard deck title:\n\n{}",
                    preview
                ))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?,
        )];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(40u32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let title = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| PortError::Unexpected("No summary generated".to_string()))?;

        Ok(title.trim().to_string())
    }
}
