//! Shared accumulator folded under a mutex by request tasks

use super::RunningTotals;
use crate::{
    error::{AppError, Result},
    models::metrics::{RequestOutcome, UrlStatistic},
};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug)]
struct AccumulatorState {
    totals: RunningTotals,
    /// Outcomes by launch index; `None` until that task reports
    outcomes: Vec<Option<RequestOutcome>>,
}

/// Running totals plus the indexed outcome list behind one lock
///
/// The lock is held only while one outcome is folded in, never across a
/// network call.
#[derive(Debug)]
pub struct GuardedAccumulator {
    state: Mutex<AccumulatorState>,
}

impl GuardedAccumulator {
    /// Create an accumulator expecting `count` outcomes
    pub fn new(count: usize) -> Self {
        Self {
            state: Mutex::new(AccumulatorState {
                totals: RunningTotals::new(),
                outcomes: vec![None; count],
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AccumulatorState> {
        // Folds are plain integer updates, so a poisoned lock still holds valid totals.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fold the outcome of the request launched at `index`
    pub fn record(&self, index: usize, outcome: RequestOutcome) -> Result<()> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let expected = state.outcomes.len();
        let slot = state
            .outcomes
            .get_mut(index)
            .ok_or_else(|| AppError::statistics(format!("Outcome index {} out of range for {} requests", index, expected)))?;
        if slot.is_some() {
            return Err(AppError::statistics(format!("Outcome for request {} recorded twice", index)));
        }
        state.totals.fold(&outcome);
        *slot = Some(outcome);
        Ok(())
    }

    /// Number of outcomes recorded so far
    pub fn recorded(&self) -> usize {
        self.lock().totals.folded() as usize
    }

    /// Launch indices that have not reported yet
    pub fn unreported(&self) -> Vec<usize> {
        self.lock()
            .outcomes
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(index, _)| index)
            .collect()
    }

    /// Freeze the accumulator into a statistic
    ///
    /// Missing outcomes are filled with [`RequestOutcome::unreported`] so the
    /// statistic always covers every launched request.
    pub fn finish(&self, url: &str, total: Duration) -> Result<UrlStatistic> {
        let mut state = self.lock();
        let slots = std::mem::take(&mut state.outcomes);
        let mut totals = state.totals;
        drop(state);

        let outcomes = slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    let outcome = RequestOutcome::unreported();
                    totals.fold(&outcome);
                    outcome
                })
            })
            .collect();

        totals.into_statistic(url, total, outcomes)
    }
}
