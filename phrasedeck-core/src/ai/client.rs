//! Vision model clients.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

use super::config::AiConfig;
use super::types::{ChatMessage, ChatRequest};

/// Error type for vision model operations.
///
/// Rate limits are reported, not retried; the orchestrator scopes the
/// failure to the current phrase.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },
}

/// Trait for vision-capable model clients.
///
/// Implementations should be stateless and thread-safe. The client returns
/// the model's raw text completion; callers own prompt assembly and parsing.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Send a multimodal chat request and get the text completion.
    async fn complete(&self, request: ChatRequest) -> Result<String, AiError>;
}

#[async_trait]
impl VisionClient for Box<dyn VisionClient> {
    async fn complete(&self, request: ChatRequest) -> Result<String, AiError> {
        (**self).complete(request).await
    }
}

/// Anthropic Messages API client.
pub struct ClaudeClient {
    config: AiConfig,
    client: reqwest::Client,
}

impl ClaudeClient {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

/// Claude API request format.
#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [ChatMessage],
}

/// Claude API response format.
#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorResponse {
    error: ClaudeApiError,
}

#[async_trait]
impl VisionClient for ClaudeClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, AiError> {
        let wire_request = ClaudeRequest {
            model: &self.config.model,
            max_tokens: request.max_tokens.min(self.config.max_tokens),
            system: &request.system,
            messages: &request.messages,
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(AiError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        if status != 200 {
            if let Ok(error_response) = serde_json::from_str::<ClaudeErrorResponse>(&body) {
                return Err(AiError::Api {
                    status,
                    message: error_response.error.message,
                });
            }
            return Err(AiError::Api {
                status,
                message: body,
            });
        }

        let response: ClaudeResponse =
            serde_json::from_str(&body).map_err(|e| AiError::ParseError(e.to_string()))?;

        let text = response
            .content
            .into_iter()
            .find_map(|c| {
                if c.content_type == "text" {
                    c.text
                } else {
                    None
                }
            })
            .ok_or_else(|| AiError::ParseError("No text content in response".to_string()))?;

        Ok(text)
    }
}

/// Vision client for runs with AI-assisted scoring turned off.
///
/// Nothing should reach the model in that mode, so any call is a caller bug
/// and fails loudly instead of fabricating a completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledVision;

#[async_trait]
impl VisionClient for DisabledVision {
    async fn complete(&self, _request: ChatRequest) -> Result<String, AiError> {
        Err(AiError::RequestFailed(
            "AI-assisted scoring is disabled".to_string(),
        ))
    }
}

/// A fake vision client for testing.
///
/// Responses are matched by checking if the request's text content contains
/// a registered substring. If no match is found, a default response is used
/// if set, otherwise the call errors.
#[derive(Debug, Default)]
pub struct FakeVisionClient {
    responses: RwLock<HashMap<String, String>>,
    default_response: Option<String>,
}

impl FakeVisionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client that returns `response` for requests whose text contains
    /// `prompt_contains`.
    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let client = Self::new();
        client.add_response(prompt_contains, response);
        client
    }

    pub fn add_response(&self, prompt_contains: &str, response: &str) {
        self.responses
            .write()
            .unwrap()
            .insert(prompt_contains.to_string(), response.to_string());
    }

    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }
}

#[async_trait]
impl VisionClient for FakeVisionClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, AiError> {
        let text = request.text_content().to_lowercase();

        let responses = self.responses.read().unwrap();
        for (pattern, response) in responses.iter() {
            if text.contains(&pattern.to_lowercase()) {
                return Ok(response.clone());
            }
        }

        match &self.default_response {
            Some(response) => Ok(response.clone()),
            None => Err(AiError::RequestFailed(
                "FakeVisionClient: no response configured for request".to_string(),
            )),
        }
    }
}
