// ⏱️ Debounce Scheduler - trailing-edge delay for validation requests
//
// Every scheduled job sleeps for the quiet window before running. Coalescing is
// done by the job itself: it checks its request token after waking and does
// nothing if a newer edit superseded it.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct DebounceScheduler {
    quiet: Duration,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl DebounceScheduler {
    pub fn new(quiet: Duration) -> Self {
        DebounceScheduler {
            quiet,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn quiet_window(&self) -> Duration {
        self.quiet
    }

    /// Run `job` after the quiet window. Must be called inside a Tokio runtime.
    pub fn schedule<F>(&self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let quiet = self.quiet;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            job.await;
        });

        let mut tasks = lock(&self.tasks);
        tasks.retain(|t| !t.is_finished());
        tasks.push(handle);
    }

    /// Jobs not yet finished
    pub fn pending(&self) -> usize {
        lock(&self.tasks).iter().filter(|t| !t.is_finished()).count()
    }

    /// Wait for every scheduled job, including ones scheduled while waiting
    pub async fn settle(&self) {
        loop {
            let batch = std::mem::take(&mut *lock(&self.tasks));
            if batch.is_empty() {
                break;
            }
            for handle in batch {
                if let Err(e) = handle.await {
                    warn!(error = %e, "validation task did not complete");
                }
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
