//! Brave image search provider.

use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

use crate::error::{require_env, ConfigError};
use crate::http::{HttpClient, HttpResponse};
use crate::types::{Candidate, ConfidenceTier, ImageMime};

use super::{SearchError, SearchProvider};

pub const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/images/search";

/// Fixed result count requested per query.
pub const RESULT_COUNT: u32 = 20;

/// Fixed delay before the single retry of a rate-limited request.
const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(2);

/// Image search backed by the Brave Search API.
///
/// Queries use a fixed result count, UK English, and strict safe-search.
/// A 429 triggers one backoff-and-retry; a second 429 or any other HTTP
/// failure surfaces as a permanent [`SearchError`].
pub struct BraveSearch<C: HttpClient> {
    client: C,
    api_key: String,
    backoff: Duration,
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    #[serde(default)]
    confidence: Option<String>,
    properties: Option<BraveProperties>,
}

#[derive(Debug, Deserialize)]
struct BraveProperties {
    url: String,
}

impl<C: HttpClient> BraveSearch<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            backoff: RATE_LIMIT_BACKOFF,
        }
    }

    /// Build with the API key from the `BRAVE_API_KEY` environment variable.
    pub fn from_env(client: C) -> Result<Self, ConfigError> {
        Ok(Self::new(client, require_env("BRAVE_API_KEY")?))
    }

    /// Override the rate-limit backoff delay (used by tests).
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    fn request_url(&self, query: &str) -> Result<String, SearchError> {
        let mut url = Url::parse(BRAVE_SEARCH_URL)
            .map_err(|e| SearchError::BadResponse(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("count", &RESULT_COUNT.to_string())
            .append_pair("search_lang", "en-gb")
            .append_pair("safesearch", "strict");
        Ok(url.into())
    }

    async fn request(&self, url: &str) -> Result<HttpResponse, SearchError> {
        let headers = [
            ("Accept", "application/json"),
            ("X-Subscription-Token", self.api_key.as_str()),
        ];
        Ok(self.client.get_with_headers(url, &headers).await?)
    }

    fn parse_candidates(body: &[u8]) -> Result<Vec<Candidate>, SearchError> {
        let response: BraveResponse =
            serde_json::from_slice(body).map_err(|e| SearchError::BadResponse(e.to_string()))?;

        let mut candidates = Vec::new();
        for result in response.results {
            let Some(properties) = result.properties else {
                continue;
            };
            let Some(mime) = ImageMime::from_url(&properties.url) else {
                tracing::debug!(url = %properties.url, "skipping result with unsupported extension");
                continue;
            };
            candidates.push(Candidate {
                url: properties.url,
                mime,
                confidence: ConfidenceTier::parse(result.confidence.as_deref()),
            });
        }
        Ok(candidates)
    }
}

#[async_trait::async_trait]
impl<C: HttpClient> SearchProvider for BraveSearch<C> {
    async fn search(&self, query: &str) -> Result<Vec<Candidate>, SearchError> {
        let url = self.request_url(query)?;

        let mut response = self.request(&url).await?;

        if response.status == 429 {
            tracing::warn!(query, "search rate limited, backing off and retrying once");
            sleep(self.backoff).await;
            response = self.request(&url).await?;
            if response.status == 429 {
                return Err(SearchError::RateLimited);
            }
        }

        if !response.is_success() {
            return Err(SearchError::Status(response.status));
        }

        Self::parse_candidates(&response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockClient;

    fn results_json() -> Vec<u8> {
        serde_json::json!({
            "results": [
                { "confidence": "high", "properties": { "url": "http://img/a.jpg" } },
                { "confidence": "low", "properties": { "url": "http://img/b.gif" } },
                { "properties": { "url": "http://img/c.png" } },
                { "confidence": "medium" }
            ]
        })
        .to_string()
        .into_bytes()
    }

    fn provider(client: MockClient) -> BraveSearch<MockClient> {
        BraveSearch::new(client, "test-key").with_backoff(Duration::from_millis(1))
    }

    fn search_url(query: &str) -> String {
        BraveSearch::<MockClient>::new(MockClient::new(), "k")
            .request_url(query)
            .unwrap()
    }

    #[tokio::test]
    async fn parses_results_and_drops_unsupported() {
        let url = search_url("italy");
        let client = MockClient::new().with_bytes(&url, "application/json", results_json());

        let candidates = provider(client).search("italy").await.unwrap();

        // The gif and the result without properties are dropped.
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].url, "http://img/a.jpg");
        assert_eq!(candidates[0].mime, ImageMime::Jpeg);
        assert_eq!(candidates[0].confidence, ConfidenceTier::High);
        assert_eq!(candidates[1].confidence, ConfidenceTier::Low);
    }

    #[tokio::test]
    async fn retries_exactly_once_on_rate_limit() {
        let url = search_url("italy");
        let client = MockClient::new()
            .with_status(&url, 429, None, vec![])
            .with_bytes(&url, "application/json", results_json());

        let provider = provider(client);
        let candidates = provider.search("italy").await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(provider.client.requests().len(), 2);
    }

    #[tokio::test]
    async fn second_rate_limit_is_permanent() {
        let url = search_url("italy");
        let client = MockClient::new()
            .with_status(&url, 429, None, vec![])
            .with_status(&url, 429, None, vec![]);

        let provider = provider(client);
        let result = provider.search("italy").await;
        assert!(matches!(result, Err(SearchError::RateLimited)));
        assert_eq!(provider.client.requests().len(), 2);
    }

    #[tokio::test]
    async fn non_rate_limit_failure_is_not_retried() {
        let url = search_url("italy");
        let client = MockClient::new().with_status(&url, 500, None, vec![]);

        let provider = provider(client);
        let result = provider.search("italy").await;
        assert!(matches!(result, Err(SearchError::Status(500))));
        assert_eq!(provider.client.requests().len(), 1);
    }

    #[tokio::test]
    async fn malformed_body_is_a_bad_response() {
        let url = search_url("italy");
        let client =
            MockClient::new().with_bytes(&url, "application/json", b"not json".to_vec());

        let result = provider(client).search("italy").await;
        assert!(matches!(result, Err(SearchError::BadResponse(_))));
    }
}
