//! HTTP plumbing shared by the search provider, image fetcher, and
//! translator. All outgoing requests go through [`HttpClient`] so tests can
//! substitute canned responses.

mod client;
mod rate_limiter;

pub use client::{HttpClient, HttpResponse, MockClient, WebClient, WebClientBuilder};
pub use rate_limiter::RateLimiter;
