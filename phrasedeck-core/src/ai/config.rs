//! Vision model configuration from environment variables.

use crate::error::{require_env, ConfigError};

/// Default model for image scoring and query planning.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Default completion budget. Score and query arrays are short.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Vision client configuration.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Anthropic API key.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Maximum completion tokens per request.
    pub max_tokens: u32,
}

impl AiConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `ANTHROPIC_API_KEY`
    ///
    /// Optional:
    /// - `PHRASEDECK_AI_MODEL` (default: "claude-sonnet-4-20250514")
    /// - `PHRASEDECK_AI_MAX_TOKENS` (default: 1024)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = require_env("ANTHROPIC_API_KEY")?;

        let model =
            std::env::var("PHRASEDECK_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let max_tokens = std::env::var("PHRASEDECK_AI_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);

        Ok(Self {
            api_key,
            model,
            max_tokens,
        })
    }
}
