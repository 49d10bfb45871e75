//! HTTP page fetcher
//!
//! This module handles every plain page read of the crawl:
//! - Building the HTTP client from the fetch configuration
//! - GET requests for results pages and listing detail pages
//! - Bounded retries with jittered exponential backoff
//! - Error classification

use crate::config::FetchConfig;
use rand::Rng;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a page could not be obtained
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Every attempt hit a transient failure
    #[error("{url} unavailable after {attempts} attempts: {last_error}")]
    Exhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    /// The server answered with a status that retrying will not change
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Builds an HTTP client for page reads
///
/// # Example
///
/// ```no_run
/// use offer_sweep::config::FetchConfig;
/// use offer_sweep::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if let Some(agent) = &config.user_agent {
        builder = builder.user_agent(agent.clone());
    }

    builder.build()
}

/// Fetches pages with bounded retries
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Timeout / connection error | Retry, backoff between attempts |
/// | HTTP 5xx | Retry, backoff between attempts |
/// | HTTP 429 | Retry, backoff between attempts |
/// | Other non-success HTTP status | Immediate → `FetchError::Status` |
///
/// After the last attempt the caller gets `FetchError::Exhausted` and
/// decides whether that is fatal for what it was doing.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    attempts: u32,
    backoff_base: Duration,
}

impl PageFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            attempts: config.attempts.max(1),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
        })
    }

    /// Fetches the raw markup of a page
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let mut last_error = String::new();

        for attempt in 1..=self.attempts {
            tracing::info!("Getting page: {}", url);

            match self.client.get(url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        match response.text().await {
                            Ok(body) => return Ok(body),
                            Err(e) => last_error = e.to_string(),
                        }
                    } else if is_transient_status(status) {
                        last_error = format!("HTTP {}", status.as_u16());
                    } else {
                        return Err(FetchError::Status {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                    }
                }
                Err(e) => {
                    last_error = if e.is_timeout() {
                        "Request timeout".to_string()
                    } else if e.is_connect() {
                        "Connection refused".to_string()
                    } else {
                        e.to_string()
                    };
                }
            }

            tracing::error!(
                "Request for {} failed ({}). Attempt {}/{}",
                url,
                last_error,
                attempt,
                self.attempts
            );

            if attempt < self.attempts {
                let delay = backoff_delay(self.backoff_base, attempt);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts: self.attempts,
            last_error,
        })
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Exponential delay for the given 1-based attempt plus up to one base of jitter
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    if base.is_zero() {
        return Duration::ZERO;
    }

    let exponential = base.saturating_mul(1 << attempt.saturating_sub(1).min(6));
    let jitter_ms = rand::thread_rng().gen_range(0..=base.as_millis() as u64);
    exponential + Duration::from_millis(jitter_ms)
}
