//! HTTP client abstraction used by the request executor

use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tokio::time::timeout;

/// Maximum redirects followed before a response is returned as-is
pub const MAX_REDIRECTS: usize = 5;

/// HTTP client trait for abstraction and testing
///
/// Implementations must report a deadline overrun as [`AppError::Timeout`];
/// every other failure to obtain a response is a transport error.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a GET request honoring the configured timeout
    async fn get(&self, url: &str) -> Result<HttpResponse>;

    /// Timeout applied to every request
    fn timeout(&self) -> Duration;
}

/// Response head as seen by the benchmark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status_code: u16,
    pub final_url: String,
}

impl HttpResponse {
    /// Check if the response indicates success
    pub fn is_success(&self) -> bool {
        self.status_code >= 200 && self.status_code < 300
    }
}

/// reqwest-backed client shared read-only by every request task
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
    timeout: Duration,
}

impl ReqwestClient {
    /// Create a client whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", crate::PKG_NAME, crate::VERSION))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let url = Url::parse(url)
            .map_err(|e| AppError::parse(format!("Invalid URL: {}", e)))?;

        let response = timeout(self.timeout, self.client.get(url).send())
            .await
            .map_err(|_| AppError::timeout(format!("HTTP request timed out after {}ms", self.timeout.as_millis())))?
            .map_err(AppError::from)?;

        Ok(HttpResponse {
            status_code: response.status().as_u16(),
            final_url: response.url().to_string(),
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Utility functions for HTTP operations
pub struct HttpUtils;

impl HttpUtils {
    /// Accept only absolute http(s) URLs that name a host
    pub fn validate_url(url: &str) -> Result<()> {
        let parsed = Url::parse(url)
            .map_err(|e| AppError::validation(format!("Invalid URL format: {}", e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "Unsupported URL scheme '{}': only http and https can be benchmarked",
                parsed.scheme()
            )));
        }
        parsed
            .host()
            .map(|_| ())
            .ok_or_else(|| AppError::validation("URL must have a host"))
    }

    pub fn is_https(url: &str) -> bool {
        Url::parse(url).map(|parsed| parsed.scheme() == "https").unwrap_or(false)
    }

    /// Normalize URL for comparison (drop fragment, sort query parameters)
    pub fn normalize_url(url: &str) -> Result<String> {
        let mut parsed = Url::parse(url)
            .map_err(|e| AppError::parse(format!("Invalid URL: {}", e)))?;

        parsed.set_fragment(None);

        let mut pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        if !pairs.is_empty() {
            pairs.sort();
            parsed.set_query(None);
            for (key, value) in pairs {
                parsed.query_pairs_mut().append_pair(&key, &value);
            }
        }

        Ok(parsed.to_string())
    }
}
