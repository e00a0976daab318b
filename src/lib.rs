//! HTTP Benchmark
//!
//! A concurrent HTTP load-testing engine. For each target URL it fires a
//! batch of simultaneous GET requests, waits for every one of them on a
//! completion barrier, and reports timeouts, non-2xx responses and
//! min/max/avg latency of the successful requests.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use executor::{BenchmarkExecutor, BenchmarkOrchestrator, CompletionBarrier};
pub use models::{BenchmarkReport, BenchmarkRequest, Config, RequestOutcome, UrlStatistic};
pub use output::{ColoredFormatter, JsonFormatter, OutputFormatter, OutputFormatterFactory, PlainFormatter};
pub use stats::{aggregate, GuardedAccumulator};
pub use types::{AggregationStrategy, OutputFormat, UrlSchedule};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Values stamped in by the build script
pub mod build_info {
    pub const BUILD_TIME: &str = match option_env!("BUILD_TIME") {
        Some(value) => value,
        None => "unknown",
    };
    pub const GIT_COMMIT: &str = match option_env!("GIT_COMMIT") {
        Some(value) => value,
        None => "unknown",
    };
    pub const TARGET_TRIPLE: &str = match option_env!("TARGET_TRIPLE") {
        Some(value) => value,
        None => "unknown",
    };
}

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_REQUEST_COUNT: u32 = 100;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
