//! Vision model integration.
//!
//! This module provides:
//! - [`VisionClient`] trait for abstracting the model provider
//! - [`ClaudeClient`] implementation against the Anthropic Messages API
//! - [`DisabledVision`] for runs with AI-assisted scoring turned off
//! - [`FakeVisionClient`] for tests
//! - Configuration via environment variables ([`AiConfig`])
//! - Prompt templates under [`prompts`]
//!
//! Requests are multimodal: image content blocks (base64, MIME-tagged)
//! followed by text, optionally closed with an assistant-turn prefill that
//! biases the completion format.

mod client;
mod config;
pub mod prompts;
mod types;

pub use client::{AiError, ClaudeClient, DisabledVision, FakeVisionClient, VisionClient};
pub use config::{AiConfig, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
pub use types::{ChatMessage, ChatRequest, ContentBlock, ImageSource, Role};
