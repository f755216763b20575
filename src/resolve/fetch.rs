// src/resolve/fetch.rs
use std::time::Duration;

use thiserror::Error;

use crate::sources::{Method, RequestSpec};

/// Fixed per-request socket timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Redirect budget per logical request (some sites bounce http -> https -> www).
const MAX_REDIRECTS: usize = 10;

const USER_AGENT: &str = concat!("mittagstisch/", env!("CARGO_PKG_VERSION"));

/// Fetch failures, classified so each source can report what actually
/// happened to it.
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS, connect or transport failure before/while reading the response.
    #[error("failed to fetch {url}: {message}")]
    Network { url: String, message: String },

    /// The request exceeded the socket timeout and was aborted in flight.
    #[error("request to {url} timed out after {timeout_ms} ms")]
    Timeout { url: String, timeout_ms: u64 },

    /// The site answered with a non-success status.
    #[error("unexpected status {status} from {url}")]
    UpstreamStatus { url: String, status: u16 },
}

/// HTTP client for upstream restaurant sites.
///
/// One request per call, no retries, no caching. Redirects are followed
/// transparently as part of the same logical request.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl Fetcher {
    pub fn new() -> Self {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    /// Client with a custom per-request timeout; tests use short ones.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self { client, timeout }
    }

    /// Execute one request spec and return the decoded body text.
    pub async fn fetch(&self, request: &RequestSpec) -> Result<String, FetchError> {
        let url = request.url();

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| self.classify(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamStatus {
                url,
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| self.classify(&url, e))
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}
