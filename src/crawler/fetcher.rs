//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with browser-like headers
//! - Pacing: a minimum gap between consecutive requests
//! - Retry logic for transient failures and rate limiting
//! - Error classification

use crate::config::{CrawlerConfig, HttpConfig};
use crate::CrawlError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use url::Url;

/// Why a page could not be fetched
///
/// Every variant ends the attempt to fetch this page; the caller abandons
/// the page's subtree and carries on with its siblings.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout or body-read failures on every attempt
    #[error("network failure for {url} after {attempts} attempts: {message}")]
    Transient {
        url: String,
        attempts: u32,
        message: String,
    },

    /// The attempt budget ran out while the server kept rate limiting
    #[error("still rate limited at {url} after {attempts} attempts")]
    RateLimited { url: String, attempts: u32 },

    /// Any other non-success status; never retried
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Retry counters accumulated by a fetcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Rate-limit responses seen
    pub rate_limit_waits: u64,

    /// Transient failures seen
    pub transient_retries: u64,
}

/// Outcome of one attempt that did not produce a page
enum AttemptFailure {
    Transient(String),
    RateLimited,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(CrawlError)` - A header value was invalid or the client failed to build
///
/// # Example
///
/// ```no_run
/// use dirlist_catalog::config::HttpConfig;
/// use dirlist_catalog::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, CrawlError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_str(&config.accept)?);
    if let Some(referer) = &config.referer {
        headers.insert(REFERER, HeaderValue::from_str(referer)?);
    }

    let timeout = Duration::from_secs(config.timeout_secs);
    let client = Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Returns true for statuses that mean "slow down and try again"
pub fn is_rate_limited(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
}

/// Sequential page fetcher with pacing and retries
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Return body |
/// | HTTP 429 / 503 | Wait `rate-limit-cooldown`, retry |
/// | Connect / timeout / body error | Wait `transient-retry-delay`, retry |
/// | Any other status | Fail immediately |
///
/// Rate-limit retries and transient retries draw on the same budget of
/// `max-attempts` attempts per page. No wait follows the last attempt.
pub struct Fetcher {
    client: Client,
    request_delay: Duration,
    max_attempts: u32,
    rate_limit_cooldown: Duration,
    transient_retry_delay: Duration,
    last_request: Option<Instant>,
    stats: FetchStats,
}

impl Fetcher {
    /// Creates a fetcher using the given client and retry policy
    pub fn new(client: Client, config: &CrawlerConfig) -> Self {
        Self {
            client,
            request_delay: config.request_delay(),
            max_attempts: config.max_attempts.max(1),
            rate_limit_cooldown: config.rate_limit_cooldown(),
            transient_retry_delay: config.transient_retry_delay(),
            last_request: None,
            stats: FetchStats::default(),
        }
    }

    /// Builds the client from `http` and applies the retry policy from `crawler`
    pub fn from_config(crawler: &CrawlerConfig, http: &HttpConfig) -> Result<Self, CrawlError> {
        Ok(Self::new(build_http_client(http)?, crawler))
    }

    pub fn stats(&self) -> FetchStats {
        self.stats
    }

    /// Fetches a page body, retrying per the policy above
    pub async fn fetch(&mut self, url: &Url) -> Result<String, FetchError> {
        let mut last_failure = AttemptFailure::RateLimited;

        for attempt in 1..=self.max_attempts {
            let is_last = attempt == self.max_attempts;
            self.pace().await;
            tracing::debug!("Checking: {} (attempt {}/{})", url, attempt, self.max_attempts);

            let failure = match self.client.get(url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        match response.text().await {
                            Ok(body) => return Ok(body),
                            Err(e) => AttemptFailure::Transient(e.to_string()),
                        }
                    } else if is_rate_limited(status) {
                        AttemptFailure::RateLimited
                    } else {
                        tracing::warn!("HTTP {} for {}", status.as_u16(), url);
                        return Err(FetchError::Status {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                    }
                }
                Err(e) => AttemptFailure::Transient(e.to_string()),
            };

            match &failure {
                AttemptFailure::RateLimited => {
                    self.stats.rate_limit_waits += 1;
                    if !is_last {
                        tracing::warn!(
                            "Rate limited at {}, waiting {:?}",
                            url,
                            self.rate_limit_cooldown
                        );
                        tokio::time::sleep(self.rate_limit_cooldown).await;
                    }
                }
                AttemptFailure::Transient(message) => {
                    self.stats.transient_retries += 1;
                    tracing::warn!("Network failure for {}: {}", url, message);
                    if !is_last {
                        tokio::time::sleep(self.transient_retry_delay).await;
                    }
                }
            }

            last_failure = failure;
        }

        Err(match last_failure {
            AttemptFailure::RateLimited => FetchError::RateLimited {
                url: url.to_string(),
                attempts: self.max_attempts,
            },
            AttemptFailure::Transient(message) => FetchError::Transient {
                url: url.to_string(),
                attempts: self.max_attempts,
                message,
            },
        })
    }

    /// Waits until `request_delay` has passed since the previous request
    async fn pace(&mut self) {
        if let Some(last) = self.last_request {
            tokio::time::sleep_until(last + self.request_delay).await;
        }
        self.last_request = Some(Instant::now());
    }
}
