//! Benchmark input model

use crate::{
    client::HttpUtils,
    error::{AppError, Result},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to benchmark: URLs in output order, requests per URL and one timeout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkRequest {
    urls: Vec<String>,
    count: usize,
    timeout: Duration,
}

impl BenchmarkRequest {
    /// Build a request, rejecting empty URL lists, bad URLs, a zero count
    /// and a zero timeout.
    pub fn new(urls: Vec<String>, count: usize, timeout: Duration) -> Result<Self> {
        if urls.is_empty() {
            return Err(AppError::validation("At least one target URL is required"));
        }
        for url in &urls {
            HttpUtils::validate_url(url)?;
        }
        if count == 0 {
            return Err(AppError::validation("Request count must be greater than 0"));
        }
        if timeout.is_zero() {
            return Err(AppError::validation("Timeout must be greater than 0"));
        }

        Ok(Self { urls, count, timeout })
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
