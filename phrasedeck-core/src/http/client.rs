//! HTTP client trait and implementations.

use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::FetchError;

use super::rate_limiter::RateLimiter;

/// A received HTTP response.
///
/// Non-success statuses are returned as `Ok` so callers can inspect them:
/// the search provider needs to recognize 429 and the image fetcher treats
/// any failure as a candidate drop, not an error.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for HTTP clients, enabling mockability in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a GET request.
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        self.get_with_headers(url, &[]).await
    }

    /// Issue a GET request with extra headers.
    async fn get_with_headers(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, FetchError>;
}

/// Configuration for [`WebClient`].
#[derive(Clone)]
pub struct WebClientBuilder {
    rate_limit: Duration,
    timeout: Duration,
    user_agent: String,
}

impl Default for WebClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WebClientBuilder {
    pub fn new() -> Self {
        Self {
            rate_limit: Duration::from_millis(200),
            timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0 (compatible; phrasedeck/0.1)".to_string(),
        }
    }

    /// Minimum delay between requests to the same host. Zero disables it.
    pub fn rate_limit(mut self, delay: Duration) -> Self {
        self.rate_limit = delay;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<WebClient, FetchError> {
        let inner = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()?;

        Ok(WebClient {
            inner,
            rate_limiter: Arc::new(RateLimiter::new(self.rate_limit)),
        })
    }
}

/// Production HTTP client: reqwest with per-host rate limiting.
#[derive(Clone)]
pub struct WebClient {
    inner: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
}

impl WebClient {
    pub fn new() -> Result<Self, FetchError> {
        WebClientBuilder::new().build()
    }

    pub fn builder() -> WebClientBuilder {
        WebClientBuilder::new()
    }
}

#[async_trait]
impl HttpClient for WebClient {
    async fn get_with_headers(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, FetchError> {
        let parsed =
            reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        if let Some(host) = parsed.host_str() {
            self.rate_limiter.wait(host).await;
        }

        let mut request = self.inner.get(parsed);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        tracing::debug!(url, "http get");
        let response = request.send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Mock HTTP client for testing.
///
/// Responses are keyed by URL. Registering several responses for the same
/// URL serves them in order; the last one repeats. All requests are recorded
/// so tests can assert on call counts.
#[derive(Default)]
pub struct MockClient {
    responses: Mutex<HashMap<String, VecDeque<MockResponse>>>,
    requests: Mutex<Vec<String>>,
}

#[derive(Clone)]
enum MockResponse {
    Response(HttpResponse),
    Error(String),
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, url: &str, response: MockResponse) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// Register a 200 response with the given content type and body.
    pub fn with_bytes(self, url: &str, content_type: &str, body: Vec<u8>) -> Self {
        self.with_status(url, 200, Some(content_type), body)
    }

    /// Register a response with an explicit status.
    pub fn with_status(
        self,
        url: &str,
        status: u16,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> Self {
        self.push(
            url,
            MockResponse::Response(HttpResponse {
                status,
                content_type: content_type.map(|s| s.to_string()),
                body,
            }),
        )
    }

    /// Register a transport error.
    pub fn with_error(self, url: &str, error: &str) -> Self {
        self.push(url, MockResponse::Error(error.to_string()))
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for MockClient {
    async fn get_with_headers(
        &self,
        url: &str,
        _headers: &[(&str, &str)],
    ) -> Result<HttpResponse, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());

        let mut responses = self.responses.lock().unwrap();
        let queue = responses
            .get_mut(url)
            .ok_or_else(|| FetchError::Failed(format!("No mock response for URL: {}", url)))?;

        let response = if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue
                .front()
                .cloned()
                .ok_or_else(|| FetchError::Failed(format!("No mock response for URL: {}", url)))?
        };

        match response {
            MockResponse::Response(r) => Ok(r),
            MockResponse::Error(e) => Err(FetchError::Failed(e)),
        }
    }
}
