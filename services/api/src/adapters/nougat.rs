//! services/api/src/adapters/nougat.rs
//!
//! Adapter for the hosted generation backend ("nougat"). One HTTP client
//! serves three ports: question/flashcard/keyterm generation, the
//! streaming chat endpoint, and the transcript/Anki import conversions.
//!
//! The backend's JSON is best-effort: a payload that doesn't decode into
//! the expected shape becomes an empty collection, not an error, so a
//! flaky generation never takes a request down with it.

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use toffee_core::domain::{AnkiCard, FeynmanFeedback, Flashcard, GenerationParams, Question, QuizKind};
use toffee_core::ports::{
    ChatService, ChunkStream, MediaImportService, PortError, PortResult, QuestionGenerator,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter for the nougat generation backend.
#[derive(Clone)]
pub struct NougatAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl NougatAdapter {
    /// Creates a new `NougatAdapter`.
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> PortResult<Value> {
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .error_for_status()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        response
            .json::<Value>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    source_document: &'a str,
    difficulty: &'a str,
    focus_areas: &'a [String],
    sample_questions: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    number_of_questions: Option<u32>,
}

#[derive(Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

/// Pulls a typed list out of `payload[field]`, treating anything that
/// doesn't decode as empty.
fn parse_list<T: serde::de::DeserializeOwned>(payload: &Value, field: &str) -> Vec<T> {
    payload
        .get(field)
        .cloned()
        .map(|value| serde_json::from_value(value).unwrap_or_default())
        .unwrap_or_default()
}

/// The keyterms endpoint sometimes returns the term list itself, and
/// sometimes a JSON-encoded string of it. Both decode; neither erroring.
fn parse_terms(payload: &Value) -> Vec<String> {
    match payload.get("terms") {
        Some(Value::String(inner)) => serde_json::from_str(inner).unwrap_or_default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_default(),
        None => Vec::new(),
    }
}

/// Decodes one streamed chat chunk. The backend delivers either
/// newline-delimited JSON fragments (`{"result": "..."}`) or raw text;
/// a chunk where any line fails to parse is taken verbatim.
fn decode_chat_chunk(chunk: &str) -> String {
    #[derive(Deserialize)]
    struct ChatFragment {
        result: String,
    }

    let mut parts = Vec::new();
    for line in chunk.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<ChatFragment>(line) {
            Ok(fragment) => parts.push(fragment.result),
            Err(_) => return chunk.to_string(),
        }
    }
    if parts.is_empty() {
        chunk.to_string()
    } else {
        parts.concat()
    }
}

//=========================================================================================
// `QuestionGenerator` Trait Implementation
//=========================================================================================

#[async_trait]
impl QuestionGenerator for NougatAdapter {
    async fn generate_questions(
        &self,
        kind: QuizKind,
        text: &str,
        params: &GenerationParams,
    ) -> PortResult<Vec<Question>> {
        let path = match kind {
            QuizKind::Mcq => "/nougat/mcqtext",
            QuizKind::Tf => "/nougat/tftext",
            QuizKind::Fitb => "/nougat/fitb",
        };
        let payload = self
            .post_json(
                path,
                &GenerateRequest {
                    source_document: text,
                    difficulty: &params.difficulty,
                    focus_areas: &params.focus_areas,
                    sample_questions: &params.sample_questions,
                    number_of_questions: params.number_of_questions,
                },
            )
            .await?;
        let questions: Vec<Question> = parse_list(&payload, "questions");
        if questions.is_empty() {
            warn!(kind = kind.as_str(), "backend returned no usable questions");
        }
        Ok(questions)
    }

    async fn generate_flashcards(&self, text: &str) -> PortResult<Vec<Flashcard>> {
        let payload = self.post_json("/nougat/cards", &TextRequest { text }).await?;
        // The cards endpoint names its list "questions" as well.
        Ok(parse_list(&payload, "questions"))
    }

    async fn extract_keyterms(&self, text: &str) -> PortResult<Vec<String>> {
        let payload = self
            .post_json("/nougat/keyterms", &TextRequest { text })
            .await?;
        Ok(parse_terms(&payload))
    }

    async fn grade_explanation(
        &self,
        term: &str,
        text: &str,
        response: &str,
    ) -> PortResult<FeynmanFeedback> {
        #[derive(Serialize)]
        struct FeynmanRequest<'a> {
            term: &'a str,
            text: &'a str,
            response: &'a str,
        }
        let payload = self
            .post_json("/nougat/feynman", &FeynmanRequest { term, text, response })
            .await?;
        Ok(serde_json::from_value(payload).unwrap_or_default())
    }
}

//=========================================================================================
// `ChatService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatService for NougatAdapter {
    async fn chat_stream(&self, document_text: &str, question: &str) -> PortResult<ChunkStream> {
        #[derive(Serialize)]
        struct ChatRequest<'a> {
            text: &'a str,
            question: &'a str,
        }
        let response = self
            .client
            .post(self.endpoint("/nougat/chatbot"))
            .json(&ChatRequest {
                text: document_text,
                question,
            })
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .error_for_status()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let mut body = Box::pin(response.bytes_stream());
        let stream = async_stream::stream! {
            while let Some(chunk) = body.next().await {
                match chunk {
                    Ok(raw) => {
                        let text = String::from_utf8_lossy(&raw);
                        let decoded = decode_chat_chunk(&text);
                        if !decoded.is_empty() {
                            yield Ok(decoded);
                        }
                    }
                    Err(err) => {
                        yield Err(PortError::Unexpected(err.to_string()));
                        break;
                    }
                }
            }
        };
        Ok(Box::pin(stream))
    }
}

//=========================================================================================
// `MediaImportService` Trait Implementation
//=========================================================================================

#[async_trait]
impl MediaImportService for NougatAdapter {
    async fn fetch_transcript(&self, video_url: &str) -> PortResult<String> {
        #[derive(Serialize)]
        struct TranscriptRequest<'a> {
            url: &'a str,
        }
        let payload = self
            .post_json("/nougat/transcript", &TranscriptRequest { url: video_url })
            .await?;
        payload
            .get("transcript")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                PortError::Unexpected("transcript missing from backend response".to_string())
            })
    }

    async fn convert_anki(&self, package_url: &str) -> PortResult<Vec<AnkiCard>> {
        #[derive(Serialize)]
        struct AnkiRequest<'a> {
            url: &'a str,
        }
        let payload = self
            .post_json("/nougat/import-anki", &AnkiRequest { url: package_url })
            .await?;
        Ok(parse_list(&payload, "cards"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chunk_decoder_unwraps_a_json_fragment() {
        assert_eq!(decode_chat_chunk(r#"{"result":"Hello"}"#), "Hello");
    }

    #[test]
    fn chunk_decoder_concatenates_newline_delimited_fragments() {
        let chunk = "{\"result\":\"Hel\"}\n{\"result\":\"lo\"}\n";
        assert_eq!(decode_chat_chunk(chunk), "Hello");
    }

    #[test]
    fn chunk_decoder_passes_raw_text_through() {
        assert_eq!(decode_chat_chunk("plain prose chunk"), "plain prose chunk");
    }

    #[test]
    fn chunk_decoder_keeps_a_mixed_chunk_verbatim() {
        // One undecodable line means the whole chunk is treated as text.
        let chunk = "{\"result\":\"a\"}\nnot json";
        assert_eq!(decode_chat_chunk(chunk), chunk);
    }

    #[test]
    fn chunk_decoder_treats_foreign_json_as_text() {
        let chunk = r#"{"other":"shape"}"#;
        assert_eq!(decode_chat_chunk(chunk), chunk);
    }

    #[test]
    fn parse_list_reads_questions() {
        let payload = json!({"questions": [
            {"question": "Q1", "choices": ["a", "b"], "answer": "a"},
            {"question": "Q2", "answer": true}
        ]});
        let questions: Vec<Question> = parse_list(&payload, "questions");
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].choices.as_ref().unwrap().len(), 2);
        assert!(questions[1].choices.is_none());
    }

    #[test]
    fn parse_list_treats_malformed_payloads_as_empty() {
        let questions: Vec<Question> = parse_list(&json!({"questions": "oops"}), "questions");
        assert!(questions.is_empty());
        let missing: Vec<Question> = parse_list(&json!({}), "questions");
        assert!(missing.is_empty());
    }

    #[test]
    fn parse_terms_accepts_both_encodings() {
        let direct = json!({"terms": ["osmosis", "diffusion"]});
        assert_eq!(parse_terms(&direct), vec!["osmosis", "diffusion"]);

        let encoded = json!({"terms": "[\"osmosis\",\"diffusion\"]"});
        assert_eq!(parse_terms(&encoded), vec!["osmosis", "diffusion"]);

        let garbage = json!({"terms": "not a list"});
        assert!(parse_terms(&garbage).is_empty());
    }
}
