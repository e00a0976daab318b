//! Type definitions and aliases

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// How request outcomes are combined into a statistic without data races
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AggregationStrategy {
    /// Pre-sized slot arena, one slot per task, read after the barrier
    #[default]
    Partitioned,
    /// Running totals behind a mutex, folded by each task as it finishes
    Guarded,
}

impl AggregationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Partitioned => "partitioned",
            Self::Guarded => "guarded",
        }
    }
}

impl fmt::Display for AggregationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "partitioned" | "lock-free" | "a" => Ok(Self::Partitioned),
            "guarded" | "mutex" | "b" => Ok(Self::Guarded),
            other => Err(AppError::parse(format!("Invalid aggregation strategy: {}", other))),
        }
    }
}

/// Whether URLs are benchmarked one after another or all at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UrlSchedule {
    /// One URL at a time, in input order
    #[default]
    Sequential,
    /// Every URL's batch launched together
    Concurrent,
}

impl UrlSchedule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Concurrent => "concurrent",
        }
    }
}

impl fmt::Display for UrlSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrlSchedule {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "concurrent" | "parallel" => Ok(Self::Concurrent),
            other => Err(AppError::parse(format!("Invalid URL schedule: {}", other))),
        }
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(AppError::parse(format!("Invalid output format: {}", other))),
        }
    }
}

/// Classification of a single request outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeClass {
    /// Response with a 2xx status
    Success,
    /// Response with any other status
    NotOk,
    /// Transport-level deadline exceeded
    Timeout,
    /// No response obtained for any other reason
    TransportError,
}

impl OutcomeClass {
    /// Whether this class lands in the not2xx bucket
    pub fn is_not2xx(&self) -> bool {
        matches!(self, Self::NotOk | Self::TransportError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("partitioned".parse::<AggregationStrategy>().unwrap(), AggregationStrategy::Partitioned);
        assert_eq!("Guarded".parse::<AggregationStrategy>().unwrap(), AggregationStrategy::Guarded);
        assert_eq!("mutex".parse::<AggregationStrategy>().unwrap(), AggregationStrategy::Guarded);
        assert!("spinlock".parse::<AggregationStrategy>().is_err());
    }

    #[test]
    fn test_schedule_parsing() {
        assert_eq!("sequential".parse::<UrlSchedule>().unwrap(), UrlSchedule::Sequential);
        assert_eq!(" parallel ".parse::<UrlSchedule>().unwrap(), UrlSchedule::Concurrent);
        assert!("random".parse::<UrlSchedule>().is_err());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("plain".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_not2xx_buckets() {
        assert!(OutcomeClass::NotOk.is_not2xx());
        assert!(OutcomeClass::TransportError.is_not2xx());
        assert!(!OutcomeClass::Timeout.is_not2xx());
        assert!(!OutcomeClass::Success.is_not2xx());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&AggregationStrategy::Guarded).unwrap(), "\"guarded\"");
        assert_eq!(serde_json::to_string(&UrlSchedule::Concurrent).unwrap(), "\"concurrent\"");
    }
}
