//! Request outcome and statistic data models

use crate::types::{AggregationStrategy, OutcomeClass, UrlSchedule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Message attached to outcomes whose task ended without reporting
pub const UNREPORTED_OUTCOME_MESSAGE: &str = "request task ended without reporting an outcome";

/// Convert a duration to whole nanoseconds, saturating at `u64::MAX`
pub fn duration_to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

fn nanos_to_ms(nanos: f64) -> f64 {
    nanos / 1_000_000.0
}

/// What happened to a single request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// A response arrived with this status code
    Response { status: u16 },
    /// The transport deadline was exceeded
    Timeout,
    /// No response for any other reason
    TransportError { message: String },
}

/// Classified result of one request plus its measured latency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOutcome {
    /// Wall-clock time from just before the call until it returned
    pub elapsed_nanos: u64,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl RequestOutcome {
    /// A response with a status code
    pub fn response(elapsed: Duration, status: u16) -> Self {
        Self {
            elapsed_nanos: duration_to_nanos(elapsed),
            outcome: Outcome::Response { status },
        }
    }

    /// A request that hit the timeout
    pub fn timeout(elapsed: Duration) -> Self {
        Self {
            elapsed_nanos: duration_to_nanos(elapsed),
            outcome: Outcome::Timeout,
        }
    }

    /// A request that failed without a response
    pub fn transport_error<S: Into<String>>(elapsed: Duration, message: S) -> Self {
        Self {
            elapsed_nanos: duration_to_nanos(elapsed),
            outcome: Outcome::TransportError { message: message.into() },
        }
    }

    /// Placeholder for a task that died before writing its outcome
    pub fn unreported() -> Self {
        Self::transport_error(Duration::ZERO, UNREPORTED_OUTCOME_MESSAGE)
    }

    /// Classify this outcome
    pub fn class(&self) -> OutcomeClass {
        match &self.outcome {
            Outcome::Response { status } if (200..300).contains(status) => OutcomeClass::Success,
            Outcome::Response { .. } => OutcomeClass::NotOk,
            Outcome::Timeout => OutcomeClass::Timeout,
            Outcome::TransportError { .. } => OutcomeClass::TransportError,
        }
    }

    pub fn is_success(&self) -> bool {
        self.class() == OutcomeClass::Success
    }

    pub fn status(&self) -> Option<u16> {
        match self.outcome {
            Outcome::Response { status } => Some(status),
            _ => None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos)
    }

    pub fn elapsed_ms(&self) -> f64 {
        nanos_to_ms(self.elapsed_nanos as f64)
    }
}

/// Min/max/avg latency over successful requests
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub min_nanos: u64,
    pub max_nanos: u64,
    pub avg_nanos: f64,
}

impl LatencySummary {
    pub fn min(&self) -> Duration {
        Duration::from_nanos(self.min_nanos)
    }

    pub fn max(&self) -> Duration {
        Duration::from_nanos(self.max_nanos)
    }

    pub fn min_ms(&self) -> f64 {
        nanos_to_ms(self.min_nanos as f64)
    }

    pub fn max_ms(&self) -> f64 {
        nanos_to_ms(self.max_nanos as f64)
    }

    pub fn avg_ms(&self) -> f64 {
        nanos_to_ms(self.avg_nanos)
    }
}

/// Aggregated report for one URL's batch of requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlStatistic {
    /// Target URL
    pub url: String,

    /// Number of requests issued
    pub count: usize,

    /// Wall-clock duration of the whole batch
    pub total_nanos: u64,

    /// Requests that hit the timeout
    pub timeouts: usize,

    /// Requests that got a non-2xx status or no response at all
    pub not2xx: usize,

    /// The part of `not2xx` that never received a response
    pub transport_errors: usize,

    /// Latency over successful requests; `None` means no data
    pub latency: Option<LatencySummary>,

    /// Per-request outcomes in launch order
    pub outcomes: Vec<RequestOutcome>,
}

impl UrlStatistic {
    /// Number of 2xx responses
    pub fn successes(&self) -> usize {
        self.count.saturating_sub(self.timeouts + self.not2xx)
    }

    pub fn has_latency_data(&self) -> bool {
        self.latency.is_some()
    }

    pub fn total(&self) -> Duration {
        Duration::from_nanos(self.total_nanos)
    }

    fn rate(&self, part: usize) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            part as f64 / self.count as f64 * 100.0
        }
    }

    /// Timeouts as a percentage of all requests
    pub fn timeout_rate(&self) -> f64 {
        self.rate(self.timeouts)
    }

    /// Non-2xx responses and transport errors as a percentage of all requests
    pub fn not2xx_rate(&self) -> f64 {
        self.rate(self.not2xx)
    }

    pub fn success_rate(&self) -> f64 {
        self.rate(self.successes())
    }

    /// Completed requests per second over the batch wall-clock time
    pub fn requests_per_second(&self) -> Option<f64> {
        if self.total_nanos == 0 {
            return None;
        }
        Some(self.count as f64 / self.total().as_secs_f64())
    }

    /// Latencies of successful requests, sorted ascending
    pub fn success_latencies(&self) -> Vec<u64> {
        let mut latencies: Vec<u64> = self
            .outcomes
            .iter()
            .filter(|outcome| outcome.is_success())
            .map(|outcome| outcome.elapsed_nanos)
            .collect();
        latencies.sort_unstable();
        latencies
    }

    /// Nearest-rank percentile over successful latencies
    pub fn percentile(&self, percentile: f64) -> Option<u64> {
        let latencies = self.success_latencies();
        if latencies.is_empty() || !(0.0..=100.0).contains(&percentile) {
            return None;
        }
        let rank = (percentile / 100.0 * latencies.len() as f64).ceil() as usize;
        let index = rank.clamp(1, latencies.len()) - 1;
        Some(latencies[index])
    }

    /// Check the bucket invariants against the stored outcomes
    pub fn is_consistent(&self) -> bool {
        self.outcomes.len() == self.count
            && self.timeouts + self.not2xx + self.successes() == self.count
            && self.transport_errors <= self.not2xx
            && self.latency.is_some() == (self.successes() > 0)
    }
}

/// Results of a complete benchmark run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub strategy: AggregationStrategy,
    pub schedule: UrlSchedule,
    /// Requests issued per URL
    pub count: usize,
    pub timeout_ms: u64,
    /// One entry per URL, in input order
    pub statistics: Vec<UrlStatistic>,
}

impl BenchmarkReport {
    pub fn total_requests(&self) -> usize {
        self.statistics.iter().map(|stat| stat.count).sum()
    }

    pub fn total_successes(&self) -> usize {
        self.statistics.iter().map(UrlStatistic::successes).sum()
    }

    /// URLs for which every request failed
    pub fn urls_without_data(&self) -> Vec<&str> {
        self.statistics
            .iter()
            .filter(|stat| !stat.has_latency_data())
            .map(|stat| stat.url.as_str())
            .collect()
    }

    pub fn wall_clock(&self) -> Duration {
        (self.completed_at - self.started_at).to_std().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn statistic_with(outcomes: Vec<RequestOutcome>, timeouts: usize, not2xx: usize) -> UrlStatistic {
        UrlStatistic {
            url: "http://example.com".to_string(),
            count: outcomes.len(),
            total_nanos: 10_000_000,
            timeouts,
            not2xx,
            transport_errors: 0,
            latency: None,
            outcomes,
        }
    }

    #[test]
    fn test_outcome_classification() {
        assert_eq!(RequestOutcome::response(ms(1), 200).class(), OutcomeClass::Success);
        assert_eq!(RequestOutcome::response(ms(1), 299).class(), OutcomeClass::Success);
        assert_eq!(RequestOutcome::response(ms(1), 199).class(), OutcomeClass::NotOk);
        assert_eq!(RequestOutcome::response(ms(1), 301).class(), OutcomeClass::NotOk);
        assert_eq!(RequestOutcome::response(ms(1), 500).class(), OutcomeClass::NotOk);
        assert_eq!(RequestOutcome::timeout(ms(1)).class(), OutcomeClass::Timeout);
        assert_eq!(
            RequestOutcome::transport_error(ms(1), "connection refused").class(),
            OutcomeClass::TransportError
        );
    }

    #[test]
    fn test_unreported_outcome() {
        let outcome = RequestOutcome::unreported();
        assert_eq!(outcome.elapsed_nanos, 0);
        assert_eq!(outcome.class(), OutcomeClass::TransportError);
        assert_eq!(outcome.status(), None);
    }

    #[test]
    fn test_duration_to_nanos_saturates() {
        assert_eq!(duration_to_nanos(ms(2)), 2_000_000);
        assert_eq!(duration_to_nanos(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_outcome_serialization_shape() {
        let json = serde_json::to_value(RequestOutcome::response(ms(3), 404)).unwrap();
        assert_eq!(json["kind"], "response");
        assert_eq!(json["status"], 404);
        assert_eq!(json["elapsed_nanos"], 3_000_000);

        let json = serde_json::to_value(RequestOutcome::timeout(ms(3))).unwrap();
        assert_eq!(json["kind"], "timeout");
    }

    #[test]
    fn test_rates() {
        let outcomes = vec![
            RequestOutcome::response(ms(1), 200),
            RequestOutcome::timeout(ms(2)),
            RequestOutcome::response(ms(3), 500),
            RequestOutcome::response(ms(4), 200),
        ];
        let stat = statistic_with(outcomes, 1, 1);
        assert_eq!(stat.successes(), 2);
        assert_eq!(stat.timeout_rate(), 25.0);
        assert_eq!(stat.not2xx_rate(), 25.0);
        assert_eq!(stat.success_rate(), 50.0);
        assert_eq!(stat.requests_per_second(), Some(400.0));
    }

    #[test]
    fn test_percentiles_nearest_rank() {
        let outcomes = (1..=10).map(|i| RequestOutcome::response(ms(i), 200)).collect();
        let stat = statistic_with(outcomes, 0, 0);
        assert_eq!(stat.percentile(50.0), Some(5_000_000));
        assert_eq!(stat.percentile(90.0), Some(9_000_000));
        assert_eq!(stat.percentile(99.0), Some(10_000_000));
        assert_eq!(stat.percentile(0.0), Some(1_000_000));
        assert_eq!(stat.percentile(101.0), None);
    }

    #[test]
    fn test_percentile_without_successes() {
        let outcomes = vec![RequestOutcome::timeout(ms(5)), RequestOutcome::response(ms(1), 503)];
        let stat = statistic_with(outcomes, 1, 1);
        assert_eq!(stat.percentile(50.0), None);
        assert!(stat.success_latencies().is_empty());
    }

    #[test]
    fn test_report_totals() {
        let mut ok = statistic_with(vec![RequestOutcome::response(ms(1), 200)], 0, 0);
        ok.latency = Some(LatencySummary { min_nanos: 1_000_000, max_nanos: 1_000_000, avg_nanos: 1_000_000.0 });
        let mut failed = statistic_with(vec![RequestOutcome::timeout(ms(1))], 1, 0);
        failed.url = "http://down.example.com".to_string();
        let started_at = Utc::now();
        let report = BenchmarkReport {
            started_at,
            completed_at: started_at + chrono::Duration::milliseconds(5),
            strategy: AggregationStrategy::Partitioned,
            schedule: UrlSchedule::Sequential,
            count: 1,
            timeout_ms: 1000,
            statistics: vec![ok, failed],
        };
        assert_eq!(report.total_requests(), 2);
        assert_eq!(report.total_successes(), 1);
        assert_eq!(report.urls_without_data(), vec!["http://down.example.com"]);
        assert_eq!(report.wall_clock(), ms(5));
    }
}
