//! Configuration data model and validation

use crate::{
    client::HttpUtils,
    models::request::BenchmarkRequest,
    types::{AggregationStrategy, AppError, OutputFormat, Result, UrlSchedule},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on requests per URL
pub const MAX_REQUEST_COUNT: u32 = 100_000;

/// Upper bound on the per-request timeout
pub const MAX_TIMEOUT_MS: u64 = 300_000;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Target URLs to benchmark, in report order
    #[serde(default)]
    pub target_urls: Vec<String>,

    /// Number of concurrent requests issued per URL
    #[serde(default = "default_request_count")]
    pub request_count: u32,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// How outcomes are aggregated
    #[serde(default)]
    pub strategy: AggregationStrategy,

    /// Whether URLs run one after another or together
    #[serde(default)]
    pub schedule: UrlSchedule,

    /// Report output format
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_urls: Vec::new(),
            request_count: default_request_count(),
            timeout_ms: default_timeout_ms(),
            strategy: AggregationStrategy::default(),
            schedule: UrlSchedule::default(),
            output_format: OutputFormat::default(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Total number of requests the run will issue
    pub fn total_requests(&self) -> u64 {
        self.target_urls.len() as u64 * u64::from(self.request_count)
    }

    /// Validate the configuration and return the first error
    pub fn validate(&self) -> Result<()> {
        if self.target_urls.is_empty() {
            return Err(AppError::config("At least one target URL is required"));
        }

        for url in &self.target_urls {
            if url.is_empty() {
                return Err(AppError::config("Target URL cannot be empty"));
            }
            if let Err(e) = HttpUtils::validate_url(url) {
                return Err(AppError::config(format!("Invalid target URL '{}': {}", url, e)));
            }
        }

        if self.request_count == 0 {
            return Err(AppError::config("Request count must be greater than 0"));
        }

        if self.request_count > MAX_REQUEST_COUNT {
            return Err(AppError::config(format!("Request count cannot exceed {}", MAX_REQUEST_COUNT)));
        }

        if self.timeout_ms == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(AppError::config("Timeout cannot exceed 300 seconds"));
        }

        Ok(())
    }

    /// Build the benchmark input from this configuration
    pub fn to_request(&self) -> Result<BenchmarkRequest> {
        self.validate()?;
        BenchmarkRequest::new(self.target_urls.clone(), self.request_count as usize, self.timeout())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(target_urls) = std::env::var("BENCH_URLS") {
            self.target_urls = split_list(&target_urls);
        }

        if let Ok(count) = std::env::var("BENCH_COUNT") {
            self.request_count = count.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid BENCH_COUNT value '{}': {}", count, e)))?;
        }

        if let Ok(timeout) = std::env::var("BENCH_TIMEOUT_MS") {
            self.timeout_ms = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid BENCH_TIMEOUT_MS value '{}': {}", timeout, e)))?;
        }

        if let Ok(strategy) = std::env::var("BENCH_STRATEGY") {
            self.strategy = strategy.parse()
                .map_err(|e| AppError::config(format!("Invalid BENCH_STRATEGY value '{}': {}", strategy, e)))?;
        }

        if let Ok(schedule) = std::env::var("BENCH_SCHEDULE") {
            self.schedule = schedule.parse()
                .map_err(|e| AppError::config(format!("Invalid BENCH_SCHEDULE value '{}': {}", schedule, e)))?;
        }

        if let Ok(format) = std::env::var("BENCH_FORMAT") {
            self.output_format = format.parse()
                .map_err(|e| AppError::config(format!("Invalid BENCH_FORMAT value '{}': {}", format, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

/// Split a comma-separated list, trimming and dropping empty entries
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn default_request_count() -> u32 {
    crate::defaults::DEFAULT_REQUEST_COUNT
}

fn default_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
