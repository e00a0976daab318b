//! Non-fatal configuration checks
//!
//! [`Config::validate`] rejects configurations that cannot run. The checks
//! here only produce warnings about settings that will run but may yield
//! misleading numbers or an unexpectedly heavy load.

use crate::{
    client::HttpUtils,
    error::Result,
    models::Config,
    types::UrlSchedule,
};
use colored::*;
use std::collections::HashSet;

/// Requests per URL below which min/max/avg say little
pub const LOW_COUNT_THRESHOLD: u32 = 3;
/// Requests per URL above which the target may start rate limiting
pub const HIGH_COUNT_THRESHOLD: u32 = 1_000;
pub const SHORT_TIMEOUT_MS: u64 = 100;
pub const LONG_TIMEOUT_MS: u64 = 60_000;
/// Total requests across all URLs worth flagging
pub const LARGE_RUN_THRESHOLD: u64 = 10_000;
/// In-flight requests under the concurrent schedule worth flagging
pub const LARGE_FAN_OUT_THRESHOLD: u64 = 5_000;

/// Configuration validator with advisory rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Run [`Config::validate`] and collect advisory warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Self::validate_target_urls(&config.target_urls);
        warnings.extend(Self::validate_load_settings(config));
        Ok(warnings)
    }

    fn validate_target_urls(urls: &[String]) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for url in urls {
            let key = HttpUtils::normalize_url(url).unwrap_or_else(|_| url.clone());
            if !seen.insert(key) {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("URL '{}' is listed more than once and will be benchmarked repeatedly", url),
                ));
            }

            let Ok(parsed) = url::Url::parse(url) else {
                continue;
            };

            if !HttpUtils::is_https(url) {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("URL '{}' uses plain HTTP", url),
                ));
            }

            if let Some(url::Host::Ipv4(ip)) = parsed.host() {
                if ip.is_private() || ip.is_loopback() {
                    warnings.push(ValidationWarning::new(
                        ValidationLevel::Info,
                        format!("URL '{}' targets a private/local network", url),
                    ));
                }
            }
        }

        warnings
    }

    fn validate_load_settings(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.request_count < LOW_COUNT_THRESHOLD {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Request count of {} may not provide reliable statistics (recommended: >= {})",
                    config.request_count, LOW_COUNT_THRESHOLD
                ),
            ));
        } else if config.request_count > HIGH_COUNT_THRESHOLD {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "{} simultaneous requests per URL may trigger rate limiting or exhaust local sockets",
                    config.request_count
                ),
            ));
        }

        if config.timeout_ms < SHORT_TIMEOUT_MS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Timeout of {}ms may classify healthy responses as timeouts", config.timeout_ms),
            ));
        } else if config.timeout_ms > LONG_TIMEOUT_MS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Long timeout of {}s will slow down failure detection", config.timeout_ms / 1000),
            ));
        }

        let total = config.total_requests();
        if total > LARGE_RUN_THRESHOLD {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Configuration will send {} requests in total", total),
            ));
        }

        if config.schedule == UrlSchedule::Concurrent && config.target_urls.len() > 1 && total > LARGE_FAN_OUT_THRESHOLD {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Concurrent schedule keeps up to {} requests in flight at once across {} URLs",
                    total,
                    config.target_urls.len()
                ),
            ));
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if !use_color {
            return format!("{} {}", tag, self.message);
        }
        let tag = match self.level {
            ValidationLevel::Info => tag.blue(),
            ValidationLevel::Warning => tag.yellow().bold(),
        };
        format!("{} {}", tag, self.message)
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
