//! Bounded-concurrency execution of content checks.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::error;

use crate::error::Result;
use crate::sampler::DocumentCheckOutcome;

/// Runs submitted content checks under a fixed concurrency cap.
///
/// Submission acquires a pool slot before spawning, so enumeration blocks
/// when the pool is saturated and never races arbitrarily far ahead of
/// execution.
pub struct ReconcileCoordinator {
    semaphore: Arc<Semaphore>,
    handles: Vec<(String, JoinHandle<Result<DocumentCheckOutcome>>)>,
}

impl ReconcileCoordinator {
    /// Create a coordinator admitting at most `threads` concurrent tasks.
    pub fn new(threads: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(threads)),
            handles: Vec::new(),
        }
    }

    /// Submit one collection's content check, blocking until a slot frees.
    pub async fn submit<F>(&mut self, key: String, task: F)
    where
        F: Future<Output = Result<DocumentCheckOutcome>> + Send + 'static,
    {
        let permit = self.semaphore.clone().acquire_owned().await.unwrap();
        let handle = tokio::spawn(async move {
            let result = task.await;
            drop(permit);
            result
        });
        self.handles.push((key, handle));
    }

    /// Await every submitted task, in submission order.
    ///
    /// Task failures and panics are contained here: they are logged and
    /// yield `None`, leaving the collection's outcome indeterminate without
    /// affecting sibling tasks.
    pub async fn drain(self) -> Vec<(String, Option<DocumentCheckOutcome>)> {
        let mut results = Vec::with_capacity(self.handles.len());
        for (key, handle) in self.handles {
            let outcome = match handle.await {
                Ok(Ok(outcome)) => Some(outcome),
                Ok(Err(e)) => {
                    error!("{}: content check failed - {}", key, e);
                    None
                }
                Err(e) => {
                    error!("{}: content check task panicked - {}", key, e);
                    None
                }
            };
            results.push((key, outcome));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn outcome(checked: u64) -> DocumentCheckOutcome {
        DocumentCheckOutcome {
            matched: true,
            checked,
            elapsed_seconds: 0,
            mismatch: None,
        }
    }

    #[tokio::test]
    async fn test_drain_returns_results_in_submission_order() {
        let mut coordinator = ReconcileCoordinator::new(4);
        for i in 0..8u64 {
            coordinator
                .submit(format!("db.c{}", i), async move { Ok(outcome(i)) })
                .await;
        }

        let results = coordinator.drain().await;
        let keys: Vec<_> = results.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys[0], "db.c0");
        assert_eq!(keys[7], "db.c7");
        assert_eq!(results[3].1.as_ref().unwrap().checked, 3);
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_cap() {
        static RUNNING: AtomicUsize = AtomicUsize::new(0);
        static PEAK: AtomicUsize = AtomicUsize::new(0);

        let mut coordinator = ReconcileCoordinator::new(2);
        for i in 0..6u64 {
            coordinator
                .submit(format!("db.c{}", i), async move {
                    let now = RUNNING.fetch_add(1, Ordering::SeqCst) + 1;
                    PEAK.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    RUNNING.fetch_sub(1, Ordering::SeqCst);
                    Ok(outcome(i))
                })
                .await;
        }

        let results = coordinator.drain().await;
        assert_eq!(results.len(), 6);
        assert!(PEAK.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_panicking_task_does_not_crash_siblings() {
        let mut coordinator = ReconcileCoordinator::new(2);
        coordinator
            .submit("db.bad".to_string(), async { panic!("boom") })
            .await;
        coordinator
            .submit("db.good".to_string(), async { Ok(outcome(1)) })
            .await;

        let results = coordinator.drain().await;
        assert!(results[0].1.is_none());
        assert_eq!(results[1].1.as_ref().unwrap().checked, 1);
    }
}
