//! Translation collaborator.
//!
//! Translation quality is entirely delegated here; the pipeline only needs
//! one string per phrase. The default implementation uses the public Google
//! Translate gtx endpoint through the shared HTTP client.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

use crate::error::FetchError;
use crate::http::HttpClient;

const TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("translation request failed: {0}")]
    RequestFailed(#[from] FetchError),

    #[error("translation service returned HTTP {0}")]
    Status(u16),

    #[error("unexpected translation response shape: {0}")]
    BadResponse(String),
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String, TranslateError>;
}

/// Google Translate (gtx) backed translator.
pub struct GoogleTranslator<C: HttpClient> {
    client: C,
    source: String,
    target: String,
}

impl<C: HttpClient> GoogleTranslator<C> {
    pub fn new(client: C, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            client,
            source: source.into(),
            target: target.into(),
        }
    }

    fn request_url(&self, text: &str) -> Result<String, TranslateError> {
        let mut url =
            Url::parse(TRANSLATE_URL).map_err(|e| TranslateError::BadResponse(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("client", "gtx")
            .append_pair("sl", &self.source)
            .append_pair("tl", &self.target)
            .append_pair("dt", "t")
            .append_pair("q", text);
        Ok(url.into())
    }
}

#[async_trait]
impl<C: HttpClient> Translator for GoogleTranslator<C> {
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let url = self.request_url(text)?;
        let response = self.client.get(&url).await?;

        if !response.is_success() {
            return Err(TranslateError::Status(response.status));
        }

        // The gtx response is a nested array: the first element holds
        // translation segments, each with the translated text at index 0.
        let value: serde_json::Value = serde_json::from_slice(&response.body)
            .map_err(|e| TranslateError::BadResponse(e.to_string()))?;

        let segments = value
            .get(0)
            .and_then(|v| v.as_array())
            .ok_or_else(|| TranslateError::BadResponse("missing segment array".to_string()))?;

        let mut translated = String::new();
        for segment in segments {
            if let Some(part) = segment.get(0).and_then(|v| v.as_str()) {
                translated.push_str(part);
            }
        }

        if translated.is_empty() {
            return Err(TranslateError::BadResponse(
                "empty translation".to_string(),
            ));
        }

        Ok(translated)
    }
}

/// Fake translator for testing: mapped phrases translate, anything else
/// passes through unchanged.
#[derive(Debug, Default)]
pub struct FakeTranslator {
    translations: HashMap<String, String>,
}

impl FakeTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_translation(mut self, phrase: &str, translation: &str) -> Self {
        self.translations
            .insert(phrase.to_string(), translation.to_string());
        self
    }
}

#[async_trait]
impl Translator for FakeTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        Ok(self
            .translations
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_string()))
    }
}
