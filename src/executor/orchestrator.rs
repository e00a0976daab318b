//! Fan-out of one request batch per URL and collection of the results
//!
//! Each batch launches `count` tasks at once, one per request, then waits on
//! a [`CompletionBarrier`] before aggregating. How outcomes travel from the
//! tasks to the aggregator depends on the [`AggregationStrategy`]:
//! - `Partitioned`: every task owns one pre-allocated slot and writes it
//!   exactly once; slots are read only after the barrier releases
//! - `Guarded`: tasks fold their outcome into a shared
//!   [`GuardedAccumulator`] as they finish

use super::{
    barrier::CompletionBarrier,
    request::execute_request,
    BenchmarkExecutor, ExecutionConfig,
};
use crate::{
    client::{HttpClient, ReqwestClient},
    error::{AppError, Result},
    logging::BenchmarkLogger,
    models::{BenchmarkReport, BenchmarkRequest, RequestOutcome, UrlStatistic},
    stats::{self, GuardedAccumulator},
    types::{AggregationStrategy, UrlSchedule},
};
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Runs benchmark batches against a shared HTTP client
pub struct BenchmarkOrchestrator {
    client: Arc<dyn HttpClient>,
    strategy: AggregationStrategy,
    schedule: UrlSchedule,
    logger: Option<Arc<BenchmarkLogger>>,
}

impl BenchmarkOrchestrator {
    /// Create an orchestrator using the default strategy and schedule
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            strategy: AggregationStrategy::default(),
            schedule: UrlSchedule::default(),
            logger: None,
        }
    }

    /// Create an orchestrator backed by a reqwest client
    pub fn from_execution_config(config: &ExecutionConfig) -> Result<Self> {
        let client = ReqwestClient::new(config.timeout)?;
        Ok(Self::new(Arc::new(client))
            .with_strategy(config.strategy)
            .with_schedule(config.schedule))
    }

    pub fn with_strategy(mut self, strategy: AggregationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_schedule(mut self, schedule: UrlSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_logger(mut self, logger: Arc<BenchmarkLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn strategy(&self) -> AggregationStrategy {
        self.strategy
    }

    pub fn schedule(&self) -> UrlSchedule {
        self.schedule
    }

    /// Benchmark every URL of `request`, one statistic per URL in input order
    pub async fn run(&self, request: &BenchmarkRequest) -> Result<Vec<UrlStatistic>> {
        if let Some(logger) = &self.logger {
            logger.log_run_start(request, self.strategy, self.schedule).await;
        }

        match self.schedule {
            UrlSchedule::Sequential => {
                let mut statistics = Vec::with_capacity(request.urls().len());
                for url in request.urls() {
                    statistics.push(self.bench_url(url, request.count(), request.timeout()).await?);
                }
                Ok(statistics)
            }
            UrlSchedule::Concurrent => {
                let batches = request
                    .urls()
                    .iter()
                    .map(|url| self.bench_url(url, request.count(), request.timeout()));
                join_all(batches).await.into_iter().collect()
            }
        }
    }

    /// Run the benchmark and wrap the statistics with run metadata
    pub async fn run_report(&self, request: &BenchmarkRequest) -> Result<BenchmarkReport> {
        let started_at = Utc::now();
        let statistics = self.run(request).await?;
        let report = BenchmarkReport {
            started_at,
            completed_at: Utc::now(),
            strategy: self.strategy,
            schedule: self.schedule,
            count: request.count(),
            timeout_ms: request.timeout().as_millis() as u64,
            statistics,
        };

        if let Some(logger) = &self.logger {
            logger.log_run_complete(&report).await;
        }
        Ok(report)
    }

    /// Launch `count` concurrent requests against `url` and aggregate them
    ///
    /// Every request is cut off after `timeout`. Tasks never log while their
    /// siblings are in flight; per-request detail is written once the batch
    /// clock has stopped.
    pub async fn bench_url(&self, url: &str, count: usize, timeout: Duration) -> Result<UrlStatistic> {
        let correlation_id = match &self.logger {
            Some(logger) => Some(logger.log_batch_start(url, count).await),
            None => None,
        };

        let stat = match self.strategy {
            AggregationStrategy::Partitioned => {
                self.bench_partitioned(url, count, timeout, correlation_id.as_deref()).await?
            }
            AggregationStrategy::Guarded => self.bench_guarded(url, count, timeout, correlation_id.as_deref()).await?,
        };

        if let (Some(logger), Some(id)) = (&self.logger, correlation_id.as_deref()) {
            for (index, outcome) in stat.outcomes.iter().enumerate() {
                logger.log_request(id, index, outcome).await;
            }
            logger.log_batch_complete(id, &stat).await;
        }
        Ok(stat)
    }

    async fn bench_partitioned(
        &self,
        url: &str,
        count: usize,
        timeout: Duration,
        correlation_id: Option<&str>,
    ) -> Result<UrlStatistic> {
        let slots: Arc<[OnceLock<RequestOutcome>]> = (0..count).map(|_| OnceLock::new()).collect();
        let target: Arc<str> = Arc::from(url);
        let (barrier, guards) = CompletionBarrier::new(count);

        let start = Instant::now();
        for (index, guard) in guards.into_iter().enumerate() {
            let slots = Arc::clone(&slots);
            let client = Arc::clone(&self.client);
            let target = Arc::clone(&target);
            tokio::spawn(async move {
                let _guard = guard;
                let outcome = execute_request(client.as_ref(), &target, timeout).await;
                // Slot `index` belongs to this task alone.
                let stored = slots[index].set(outcome).is_ok();
                debug_assert!(stored, "outcome slot {} written twice", index);
            });
        }
        barrier.wait().await;
        let total = start.elapsed();

        let mut unreported = Vec::new();
        let outcomes = slots
            .iter()
            .enumerate()
            .map(|(index, slot)| match slot.get() {
                Some(outcome) => outcome.clone(),
                None => {
                    unreported.push(index);
                    RequestOutcome::unreported()
                }
            })
            .collect();

        self.report_unreported(correlation_id, url, &unreported).await;
        stats::aggregate(url, total, outcomes)
    }

    async fn bench_guarded(
        &self,
        url: &str,
        count: usize,
        timeout: Duration,
        correlation_id: Option<&str>,
    ) -> Result<UrlStatistic> {
        let accumulator = Arc::new(GuardedAccumulator::new(count));
        // Only touched when a record is rejected
        let rejected: Arc<Mutex<Vec<(usize, AppError)>>> = Arc::new(Mutex::new(Vec::new()));
        let target: Arc<str> = Arc::from(url);
        let (barrier, guards) = CompletionBarrier::new(count);

        let start = Instant::now();
        for (index, guard) in guards.into_iter().enumerate() {
            let accumulator = Arc::clone(&accumulator);
            let rejected = Arc::clone(&rejected);
            let client = Arc::clone(&self.client);
            let target = Arc::clone(&target);
            tokio::spawn(async move {
                let _guard = guard;
                let outcome = execute_request(client.as_ref(), &target, timeout).await;
                if let Err(error) = accumulator.record(index, outcome) {
                    rejected.lock().unwrap_or_else(PoisonError::into_inner).push((index, error));
                }
            });
        }
        barrier.wait().await;
        let total = start.elapsed();

        if let (Some(logger), Some(id)) = (&self.logger, correlation_id) {
            let rejected = std::mem::take(&mut *rejected.lock().unwrap_or_else(PoisonError::into_inner));
            for (index, error) in &rejected {
                logger.log_record_failure(id, *index, error).await;
            }
        }
        self.report_unreported(correlation_id, url, &accumulator.unreported()).await;
        accumulator.finish(url, total)
    }

    async fn report_unreported(&self, correlation_id: Option<&str>, url: &str, indices: &[usize]) {
        if let (Some(logger), Some(id)) = (&self.logger, correlation_id) {
            logger.log_unreported(id, url, indices).await;
        }
    }
}

#[async_trait]
impl BenchmarkExecutor for BenchmarkOrchestrator {
    async fn execute(&self, request: &BenchmarkRequest) -> Result<BenchmarkReport> {
        self.run_report(request).await
    }
}
