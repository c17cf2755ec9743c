//! HTTP client for the origin server.
//!
//! # Responsibilities
//! - Build `origin + path` URLs
//! - Issue GET requests with a bounded deadline
//! - Classify failures (status, transport, timeout)

use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

use crate::config::OriginConfig;
use crate::resilience::with_timeout;

/// Errors that can occur while fetching from the origin.
#[derive(Debug, Error)]
pub enum OriginError {
    /// Origin answered with a non-success status.
    #[error("origin returned {status} for {url}")]
    Status { url: String, status: u16 },

    /// Connection, protocol or body read failure.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Origin did not answer within the configured deadline.
    #[error("request to {url} timed out after {}s", .limit.as_secs())]
    Timeout { url: String, limit: Duration },

    /// The HTTP client could not be constructed.
    #[error("failed to build origin client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Result type for origin fetches.
pub type FetchResult<T> = Result<T, OriginError>;

/// GET-only client bound to one origin base URL.
#[derive(Debug, Clone)]
pub struct OriginClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl OriginClient {
    pub fn new(config: &OriginConfig) -> FetchResult<Self> {
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .map_err(OriginError::Client)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full origin URL for a request path.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Fetch `path` from the origin and return the full body.
    pub async fn fetch(&self, path: &str) -> FetchResult<Bytes> {
        let url = self.url_for(path);

        let request = async {
            let response = self.http.get(&url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Ok::<_, reqwest::Error>(Err(status.as_u16()));
            }
            Ok(Ok(response.bytes().await?))
        };

        match with_timeout(self.timeout, request).await {
            Ok(Ok(Ok(body))) => {
                tracing::debug!(url = %url, bytes = body.len(), "Fetched from origin");
                Ok(body)
            }
            Ok(Ok(Err(status))) => Err(OriginError::Status { url, status }),
            Ok(Err(source)) => Err(OriginError::Request { url, source }),
            Err(elapsed) => Err(OriginError::Timeout {
                url,
                limit: elapsed.0,
            }),
        }
    }
}
