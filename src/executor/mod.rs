//! Benchmark execution engine
//!
//! This module contains the components that turn a [`BenchmarkRequest`]
//! into statistics:
//! - [`request`]: one timed, classified GET
//! - [`barrier`]: the completion barrier every request task signals
//! - [`orchestrator`]: per-URL fan-out and aggregation

pub mod barrier;
pub mod orchestrator;
pub mod request;

pub use barrier::{CompletionBarrier, CompletionGuard};
pub use orchestrator::BenchmarkOrchestrator;
pub use request::{classify, execute_request};

use crate::{
    error::Result,
    models::{BenchmarkReport, BenchmarkRequest, Config},
    types::{AggregationStrategy, UrlSchedule},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Execution settings taken from the application configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Timeout applied to every request
    pub timeout: Duration,
    pub strategy: AggregationStrategy,
    pub schedule: UrlSchedule,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout: crate::defaults::DEFAULT_TIMEOUT,
            strategy: AggregationStrategy::default(),
            schedule: UrlSchedule::default(),
        }
    }
}

impl From<&Config> for ExecutionConfig {
    fn from(config: &Config) -> Self {
        Self {
            timeout: config.timeout(),
            strategy: config.strategy,
            schedule: config.schedule,
        }
    }
}

/// High-level benchmark executor interface
#[async_trait]
pub trait BenchmarkExecutor: Send + Sync {
    /// Benchmark every URL in the request and report the results
    async fn execute(&self, request: &BenchmarkRequest) -> Result<BenchmarkReport>;
}

/// Factory for executors built from configuration
pub struct ExecutorFactory;

impl ExecutorFactory {
    /// Create a reqwest-backed orchestrator for `config`
    pub fn create(config: &Config) -> Result<BenchmarkOrchestrator> {
        BenchmarkOrchestrator::from_execution_config(&ExecutionConfig::from(config))
    }
}
