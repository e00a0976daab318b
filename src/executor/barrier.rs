//! Counting completion barrier for request tasks

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::sync::Notify;

#[derive(Debug)]
struct BarrierState {
    remaining: AtomicUsize,
    notify: Notify,
}

/// Releases waiters once every issued [`CompletionGuard`] has been dropped
///
/// The barrier starts at the number of tasks it will wait for. Each task
/// owns one guard and signals completion by dropping it, which also happens
/// on early return or panic.
#[derive(Debug, Clone)]
pub struct CompletionBarrier {
    state: Arc<BarrierState>,
}

/// One task's completion signal
#[derive(Debug)]
#[must_use = "dropping the guard signals completion immediately"]
pub struct CompletionGuard {
    state: Arc<BarrierState>,
}

impl CompletionBarrier {
    /// Create a barrier waiting for `count` tasks, plus their guards
    pub fn new(count: usize) -> (Self, Vec<CompletionGuard>) {
        let state = Arc::new(BarrierState {
            remaining: AtomicUsize::new(count),
            notify: Notify::new(),
        });
        let guards = (0..count)
            .map(|_| CompletionGuard { state: Arc::clone(&state) })
            .collect();
        (Self { state }, guards)
    }

    /// Tasks that have not signaled yet
    pub fn remaining(&self) -> usize {
        self.state.remaining.load(Ordering::Acquire)
    }

    /// Wait until every guard has been dropped
    pub async fn wait(&self) {
        loop {
            // Register before checking so a release between the check and
            // the await is not lost.
            let notified = self.state.notify.notified();
            if self.remaining() == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if self.state.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.state.notify.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_zero_count_releases_immediately() {
        let (barrier, guards) = CompletionBarrier::new(0);
        assert!(guards.is_empty());
        barrier.wait().await;
    }

    #[tokio::test]
    async fn test_waits_for_every_guard() {
        let (barrier, mut guards) = CompletionBarrier::new(3);
        assert_eq!(barrier.remaining(), 3);

        drop(guards.pop());
        assert_eq!(barrier.remaining(), 2);

        let waiter = tokio::spawn({
            let barrier = barrier.clone();
            async move { barrier.wait().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guards);
        tokio::time::timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
        assert_eq!(barrier.remaining(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_guards_released_from_many_tasks() {
        let (barrier, guards) = CompletionBarrier::new(500);
        for guard in guards {
            tokio::spawn(async move {
                let _guard = guard;
                tokio::task::yield_now().await;
            });
        }
        tokio::time::timeout(Duration::from_secs(5), barrier.wait()).await.unwrap();
    }

    #[tokio::test]
    async fn test_panicking_task_still_releases() {
        let (barrier, mut guards) = CompletionBarrier::new(2);
        let healthy = guards.pop().unwrap();
        let doomed = guards.pop().unwrap();

        let handle = tokio::spawn(async move {
            let _guard = doomed;
            panic!("request task blew up");
        });
        tokio::spawn(async move {
            let _guard = healthy;
        });

        assert!(handle.await.unwrap_err().is_panic());
        tokio::time::timeout(Duration::from_secs(1), barrier.wait()).await.unwrap();
    }
}
