//! HTTP client for the image search API
//!
//! This module provides the page fetcher used by the controller: one GET
//! against the Custom Search JSON API per call, spaced by a rate limiter.
//! It never retries; a failed call is surfaced to the caller as-is.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::error::{Result, ScrapeError};
use crate::parser::parse_search_page;
use crate::types::{SearchRequest, SearchResultPage};

/// Custom Search JSON API endpoint
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Default User-Agent mimicking a modern browser
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Source of search result pages
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Retrieve one page of results starting at `request.start_index`.
    ///
    /// # Errors
    /// - `ScrapeError::Transport` / `ScrapeError::UpstreamStatus` on network or HTTP failure
    /// - `ScrapeError::MalformedResponse` if the body cannot be decoded
    async fn fetch(&self, request: &SearchRequest) -> Result<SearchResultPage>;
}

/// Rate limiter to control request frequency
///
/// Ensures that requests are spaced at least `min_interval` apart
/// to stay inside the search API quota.
pub struct RateLimiter {
    /// Minimum interval between requests
    min_interval: Duration,
    /// Timestamp of the last request
    last_request: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified requests per second
    ///
    /// `requests_per_second` must be positive and finite.
    ///
    /// # Example
    /// ```
    /// use imgscrape_core::client::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(2.0); // 2 requests per second
    /// ```
    pub fn new(requests_per_second: f64) -> Self {
        let min_interval = Duration::from_secs_f64(1.0 / requests_per_second);
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(Instant::now() - min_interval)),
        }
    }

    /// Wait until the minimum interval since the previous request has passed
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();

        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }

        *last = Instant::now();
    }

    /// Get the minimum interval between requests
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// Configuration for the HTTP clients
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Search endpoint (default: the Custom Search JSON API)
    pub endpoint: String,
    /// Maximum search requests per second (default: 2.0)
    pub requests_per_second: f64,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            requests_per_second: 2.0,
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Config pointing at a different search endpoint
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }
}

/// Build a reqwest client with the configured timeout and User-Agent
pub fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Page fetcher backed by the Custom Search JSON API
pub struct SearchClient {
    /// Underlying HTTP client
    client: reqwest::Client,
    /// Search endpoint without query string
    endpoint: String,
    /// Rate limiter for request throttling
    rate_limiter: RateLimiter,
}

impl SearchClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    /// Returns `InvalidRequest` if `requests_per_second` is not a positive
    /// finite number, or an error if the HTTP client cannot be created
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        if !(config.requests_per_second.is_finite() && config.requests_per_second > 0.0) {
            return Err(ScrapeError::InvalidRequest(format!(
                "requests_per_second must be positive, got {}",
                config.requests_per_second
            )));
        }
        let client = build_http_client(&config)?;
        let rate_limiter = RateLimiter::new(config.requests_per_second);

        Ok(Self {
            client,
            endpoint: config.endpoint,
            rate_limiter,
        })
    }

    /// Full request URL for a page fetch
    pub fn search_url(&self, request: &SearchRequest) -> String {
        format!(
            "{}?key={}&cx={}&q={}&searchType=image&start={}",
            self.endpoint,
            urlencoding::encode(&request.credentials.api_key),
            urlencoding::encode(&request.credentials.search_engine_id),
            urlencoding::encode(&request.query),
            request.start_index
        )
    }
}

#[async_trait]
impl PageFetcher for SearchClient {
    async fn fetch(&self, request: &SearchRequest) -> Result<SearchResultPage> {
        self.rate_limiter.acquire().await;

        let url = self.search_url(request);
        tracing::debug!(query = %request.query, start = request.start_index, "fetching search page");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown status").to_string());
            return Err(ScrapeError::UpstreamStatus {
                status: status.as_u16(),
                message,
            });
        }

        parse_search_page(&body)
    }
}
