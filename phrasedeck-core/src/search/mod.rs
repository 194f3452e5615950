//! Image search provider abstraction.
//!
//! A provider turns a query string into an ordered candidate list. Rate
//! limiting is handled inside the provider (one fixed-backoff retry); every
//! error that escapes `search` is permanent and aborts the batch.

mod brave;

pub use brave::{BraveSearch, BRAVE_SEARCH_URL, RESULT_COUNT};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

use crate::error::FetchError;
use crate::types::Candidate;

#[derive(Error, Debug)]
pub enum SearchError {
    /// Rate limited twice in a row; the single backoff retry was consumed.
    #[error("search rate limited after retry")]
    RateLimited,

    #[error("search request failed: {0}")]
    RequestFailed(#[from] FetchError),

    #[error("search returned HTTP {0}")]
    Status(u16),

    #[error("malformed search response: {0}")]
    BadResponse(String),
}

/// Trait for image search providers.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search for candidate images matching `query`.
    async fn search(&self, query: &str) -> Result<Vec<Candidate>, SearchError>;
}

enum MockSearchResponse {
    Results(Vec<Candidate>),
    RateLimited,
    Failure(String),
}

/// Mock search provider for testing.
#[derive(Default)]
pub struct MockSearch {
    responses: Mutex<HashMap<String, MockSearchResponse>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(self, query: &str, results: Vec<Candidate>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(query.to_string(), MockSearchResponse::Results(results));
        self
    }

    pub fn with_rate_limited(self, query: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(query.to_string(), MockSearchResponse::RateLimited);
        self
    }

    pub fn with_failure(self, query: &str, message: &str) -> Self {
        self.responses.lock().unwrap().insert(
            query.to_string(),
            MockSearchResponse::Failure(message.to_string()),
        );
        self
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str) -> Result<Vec<Candidate>, SearchError> {
        match self.responses.lock().unwrap().get(query) {
            Some(MockSearchResponse::Results(results)) => Ok(results.clone()),
            Some(MockSearchResponse::RateLimited) => Err(SearchError::RateLimited),
            Some(MockSearchResponse::Failure(msg)) => Err(SearchError::BadResponse(msg.clone())),
            None => Err(SearchError::BadResponse(format!(
                "No mock results for query: {}",
                query
            ))),
        }
    }
}
