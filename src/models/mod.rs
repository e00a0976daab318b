//! Data models and structures for the HTTP benchmark

pub mod config;
pub mod metrics;
pub mod request;

// Re-export main model types
pub use config::Config;
pub use metrics::{BenchmarkReport, LatencySummary, Outcome, RequestOutcome, UrlStatistic};
pub use request::BenchmarkRequest;
