//! Groq implementation of the extractor trait.
//!
//! Talks to Groq's OpenAI-compatible chat completions API.
//!
//! # Example
//!
//! ```rust,ignore
//! use research::extractors::GroqExtractor;
//!
//! let extractor = GroqExtractor::from_env()?.with_model("llama-3.1-8b-instant");
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ExtractError, ExtractResult};
use crate::pipeline::prompts::{build_extraction_prompt, EXTRACTION_SYSTEM};
use crate::pipeline::response::parse_analysis;
use crate::security::ApiKey;
use crate::traits::extractor::{Extractor, ModelResponse};

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Groq-backed extractor.
#[derive(Clone)]
pub struct GroqExtractor {
    client: Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
    max_tokens: u32,
}

impl GroqExtractor {
    /// Create a new Groq extractor with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to create HTTP client"),
            api_key: ApiKey::new(api_key),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: 1000,
        }
    }

    /// Create from environment variable `GROQ_API_KEY`.
    pub fn from_env() -> ExtractResult<Self> {
        let api_key = std::env::var("GROQ_API_KEY")
            .map_err(|_| ExtractError::Unavailable("GROQ_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set the chat model (default: llama-3.3-70b-versatile).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for proxies or compatible backends).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the completion token cap (default: 1000).
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Make a chat completion request.
    async fn chat(&self, system: &str, user: &str) -> ExtractResult<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: Some(0.0),
            max_tokens: Some(self.max_tokens),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractError::Unavailable(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(%status, "Groq API returned error");
            return Err(ExtractError::Unavailable(
                format!("Groq API error ({}): {}", status, error_text).into(),
            ));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::Unavailable(Box::new(e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ExtractError::Unavailable("no completion returned".into()))
    }
}

#[async_trait]
impl Extractor for GroqExtractor {
    async fn extract(&self, entity: &str, aggregated_text: &str) -> ExtractResult<ModelResponse> {
        debug!(entity, bytes = aggregated_text.len(), "extraction request");

        let prompt = build_extraction_prompt(entity, aggregated_text);
        let raw = self.chat(EXTRACTION_SYSTEM, &prompt).await?;

        match parse_analysis(&raw) {
            Some(analysis) => Ok(ModelResponse::Structured(analysis)),
            None => {
                warn!(entity, "model reply did not parse; keeping raw text");
                Ok(ModelResponse::Degraded { raw })
            }
        }
    }
}

// Request/Response types

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groq_builder() {
        let extractor = GroqExtractor::new("gsk-test")
            .with_model("llama-3.1-8b-instant")
            .with_base_url("https://custom.api.com/v1")
            .with_max_tokens(500);

        assert_eq!(extractor.model(), "llama-3.1-8b-instant");
        assert_eq!(extractor.base_url, "https://custom.api.com/v1");
        assert_eq!(extractor.max_tokens, 500);
    }

    #[test]
    fn test_key_never_leaks_in_debug() {
        let extractor = GroqExtractor::new("gsk-secret");
        assert_eq!(format!("{:?}", extractor.api_key), "[REDACTED]");
    }
}
