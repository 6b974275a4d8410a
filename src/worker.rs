//! Bounded worker pool for CPU-bound record processing
//!
//! At most `max_workers` tasks run at once on tokio's blocking thread pool.
//! `submit` waits for a free slot when the pool is full.

use crate::error::{Error, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::debug;

/// Bounded pool of blocking tasks
#[derive(Debug)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    tasks: JoinSet<()>,
    max_workers: usize,
}

impl WorkerPool {
    /// Create a pool running at most `max_workers` tasks at once (minimum 1)
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_workers)),
            tasks: JoinSet::new(),
            max_workers,
        }
    }

    /// Run `task` on the pool, waiting for a free slot first.
    ///
    /// Fails with the first error of a task that has already finished.
    pub async fn submit<F>(&mut self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|e| Error::worker(format!("worker pool closed: {e}")))?;

        self.reap()?;

        self.tasks.spawn_blocking(move || {
            let _permit = permit;
            task();
        });
        Ok(())
    }

    /// Wait for every submitted task.
    ///
    /// All tasks are awaited even when one fails; the first failure is returned.
    pub async fn join(mut self) -> Result<()> {
        let mut first_error = None;
        let mut completed = 0usize;

        while let Some(result) = self.tasks.join_next().await {
            completed += 1;
            if let Err(e) = result {
                first_error.get_or_insert(task_error(&e));
            }
        }

        debug!(completed, "worker pool drained");
        first_error.map_or(Ok(()), Err)
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Tasks currently holding a slot
    pub fn in_flight(&self) -> usize {
        self.max_workers - self.semaphore.available_permits()
    }

    /// Collect tasks that already finished
    fn reap(&mut self) -> Result<()> {
        while let Some(result) = self.tasks.try_join_next() {
            result.map_err(|e| task_error(&e))?;
        }
        Ok(())
    }
}

fn task_error(err: &JoinError) -> Error {
    if err.is_panic() {
        Error::worker(format!("worker task panicked: {err}"))
    } else {
        Error::worker(format!("worker task failed: {err}"))
    }
}
