//! Result aggregation for benchmark batches
//!
//! Both aggregation strategies fold outcomes through [`RunningTotals`], so a
//! given outcome set yields the same [`UrlStatistic`] whichever strategy
//! collected it:
//! - [`aggregate`] folds a complete, index-ordered outcome slice after the
//!   completion barrier (ownership partitioning)
//! - [`GuardedAccumulator`] folds outcomes one at a time under a mutex as
//!   request tasks finish

pub mod accumulator;

pub use accumulator::GuardedAccumulator;

use crate::{
    error::{AppError, Result},
    models::metrics::{duration_to_nanos, LatencySummary, RequestOutcome, UrlStatistic},
    types::OutcomeClass,
};
use std::time::Duration;

/// Running totals over a stream of outcomes
///
/// Every field is an integer, so folding is commutative and associative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningTotals {
    successes: u64,
    latency_sum: u128,
    min: u64,
    max: u64,
    timeouts: u64,
    not2xx: u64,
    transport_errors: u64,
}

impl Default for RunningTotals {
    fn default() -> Self {
        Self {
            successes: 0,
            latency_sum: 0,
            min: u64::MAX,
            max: 0,
            timeouts: 0,
            not2xx: 0,
            transport_errors: 0,
        }
    }
}

impl RunningTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the totals
    pub fn fold(&mut self, outcome: &RequestOutcome) {
        match outcome.class() {
            OutcomeClass::Timeout => self.timeouts += 1,
            OutcomeClass::NotOk => self.not2xx += 1,
            OutcomeClass::TransportError => {
                self.not2xx += 1;
                self.transport_errors += 1;
            }
            OutcomeClass::Success => {
                let took = outcome.elapsed_nanos;
                self.successes += 1;
                self.latency_sum += u128::from(took);
                self.min = self.min.min(took);
                self.max = self.max.max(took);
            }
        }
    }

    /// Number of outcomes folded so far
    pub fn folded(&self) -> u64 {
        self.successes + self.timeouts + self.not2xx
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn timeouts(&self) -> u64 {
        self.timeouts
    }

    pub fn not2xx(&self) -> u64 {
        self.not2xx
    }

    pub fn transport_errors(&self) -> u64 {
        self.transport_errors
    }

    /// Latency summary, or `None` when no request succeeded
    pub fn latency(&self) -> Option<LatencySummary> {
        if self.successes == 0 {
            return None;
        }
        Some(LatencySummary {
            min_nanos: self.min,
            max_nanos: self.max,
            avg_nanos: self.latency_sum as f64 / self.successes as f64,
        })
    }

    /// Freeze the totals into a statistic for `url`
    pub fn into_statistic(self, url: &str, total: Duration, outcomes: Vec<RequestOutcome>) -> Result<UrlStatistic> {
        if outcomes.is_empty() {
            return Err(AppError::statistics(format!("No outcomes recorded for {}", url)));
        }
        if self.folded() != outcomes.len() as u64 {
            return Err(AppError::statistics(format!(
                "Folded {} outcomes for {} but {} were recorded",
                self.folded(),
                url,
                outcomes.len()
            )));
        }

        Ok(UrlStatistic {
            url: url.to_string(),
            count: outcomes.len(),
            total_nanos: duration_to_nanos(total),
            timeouts: self.timeouts as usize,
            not2xx: self.not2xx as usize,
            transport_errors: self.transport_errors as usize,
            latency: self.latency(),
            outcomes,
        })
    }
}

impl<'a> FromIterator<&'a RequestOutcome> for RunningTotals {
    fn from_iter<I: IntoIterator<Item = &'a RequestOutcome>>(iter: I) -> Self {
        let mut totals = RunningTotals::new();
        for outcome in iter {
            totals.fold(outcome);
        }
        totals
    }
}

/// Aggregate a complete outcome set for one URL
///
/// `outcomes` must be in launch order; an empty set is rejected so no
/// statistic is ever built from a zero count.
pub fn aggregate(url: &str, total: Duration, outcomes: Vec<RequestOutcome>) -> Result<UrlStatistic> {
    let totals: RunningTotals = outcomes.iter().collect();
    totals.into_statistic(url, total, outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn outcome_strategy() -> impl Strategy<Value = RequestOutcome> {
        prop_oneof![
            (0u64..5_000_000_000, 200u16..300).prop_map(|(nanos, status)| RequestOutcome::response(Duration::from_nanos(nanos), status)),
            (0u64..5_000_000_000, 300u16..600).prop_map(|(nanos, status)| RequestOutcome::response(Duration::from_nanos(nanos), status)),
            (0u64..5_000_000_000).prop_map(|nanos| RequestOutcome::timeout(Duration::from_nanos(nanos))),
            (0u64..5_000_000_000).prop_map(|nanos| RequestOutcome::transport_error(Duration::from_nanos(nanos), "connection refused")),
        ]
    }

    #[test]
    fn test_all_successful_known_latencies() {
        let outcomes = (1..=10).map(|i| RequestOutcome::response(ms(i), 200)).collect();
        let stat = aggregate("https://example.com", ms(12), outcomes).unwrap();

        let latency = stat.latency.unwrap();
        assert_eq!(latency.min(), ms(1));
        assert_eq!(latency.max(), ms(10));
        assert_eq!(latency.avg_ms(), 5.5);
        assert_eq!(stat.timeouts, 0);
        assert_eq!(stat.not2xx, 0);
        assert_eq!(stat.count, 10);
        assert_eq!(stat.total(), ms(12));
        assert!(stat.is_consistent());
    }

    #[test]
    fn test_all_failed_reports_no_data() {
        let outcomes = vec![
            RequestOutcome::timeout(ms(100)),
            RequestOutcome::response(ms(3), 500),
            RequestOutcome::timeout(ms(100)),
            RequestOutcome::response(ms(4), 500),
            RequestOutcome::response(ms(5), 500),
        ];
        let stat = aggregate("https://example.com", ms(100), outcomes).unwrap();

        assert_eq!(stat.timeouts, 2);
        assert_eq!(stat.not2xx, 3);
        assert_eq!(stat.successes(), 0);
        assert!(stat.latency.is_none());
        assert!(stat.is_consistent());
    }

    #[test]
    fn test_transport_errors_count_as_not2xx() {
        let outcomes = vec![
            RequestOutcome::response(ms(2), 200),
            RequestOutcome::transport_error(ms(1), "dns failure"),
            RequestOutcome::response(ms(3), 404),
        ];
        let stat = aggregate("https://example.com", ms(3), outcomes).unwrap();

        assert_eq!(stat.not2xx, 2);
        assert_eq!(stat.transport_errors, 1);
        assert_eq!(stat.successes(), 1);
        // Failed requests never feed latency figures.
        assert_eq!(stat.latency.unwrap().max(), ms(2));
    }

    #[test]
    fn test_empty_outcome_set_rejected() {
        let error = aggregate("https://example.com", ms(1), Vec::new()).unwrap_err();
        assert!(matches!(error, AppError::Statistics(_)));
    }

    #[test]
    fn test_fold_count_mismatch_rejected() {
        let mut totals = RunningTotals::new();
        totals.fold(&RequestOutcome::response(ms(1), 200));
        let outcomes = vec![RequestOutcome::response(ms(1), 200), RequestOutcome::response(ms(2), 200)];
        assert!(totals.into_statistic("https://example.com", ms(2), outcomes).is_err());
    }

    proptest! {
        #[test]
        fn prop_buckets_partition_outcomes(outcomes in prop::collection::vec(outcome_strategy(), 1..200)) {
            let stat = aggregate("https://example.com", ms(1), outcomes.clone()).unwrap();
            prop_assert_eq!(stat.timeouts + stat.not2xx + stat.successes(), outcomes.len());
            prop_assert!(stat.is_consistent());
        }

        #[test]
        fn prop_latency_bounds(outcomes in prop::collection::vec(outcome_strategy(), 1..200)) {
            let stat = aggregate("https://example.com", ms(1), outcomes).unwrap();
            let successes = stat.success_latencies();
            match stat.latency {
                Some(latency) => {
                    prop_assert!(latency.min_nanos as f64 <= latency.avg_nanos);
                    prop_assert!(latency.avg_nanos <= latency.max_nanos as f64);
                    prop_assert!(successes.contains(&latency.min_nanos));
                    prop_assert!(successes.contains(&latency.max_nanos));
                }
                None => prop_assert!(successes.is_empty()),
            }
        }

        #[test]
        fn prop_fold_order_independent(outcomes in prop::collection::vec(outcome_strategy(), 1..100), seed in any::<u64>()) {
            let forward: RunningTotals = outcomes.iter().collect();

            let mut shuffled = outcomes.clone();
            // Deterministic Fisher-Yates driven by the proptest seed.
            let mut state = seed | 1;
            for i in (1..shuffled.len()).rev() {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                let j = (state % (i as u64 + 1)) as usize;
                shuffled.swap(i, j);
            }
            let reordered: RunningTotals = shuffled.iter().collect();

            prop_assert_eq!(forward, reordered);
            prop_assert_eq!(forward.latency(), reordered.latency());
        }
    }
}
