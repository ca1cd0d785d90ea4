//! Serial task executor
//!
//! Each relay owns one `SerialExecutor`. Submitted tasks run on a single
//! worker, one at a time, in submission order. The queue is unbounded and
//! there is no cancellation: once queued, a task runs to completion.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("executor '{0}' has been shut down")]
    ShutDown(String),
}

type Job = BoxFuture<'static, ()>;

pub struct SerialExecutor {
    name: String,
    sender: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    /// Held across the drain so every `shutdown` caller waits for it
    worker: AsyncMutex<Option<JoinHandle<()>>>,
}

impl SerialExecutor {
    /// Spawn the worker on the current tokio runtime
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(name: impl Into<String>) -> Self {
        let name = name.into();
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        let worker_name = name.clone();
        let worker = tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                // A panicking task must not take the worker down with it
                if AssertUnwindSafe(job).catch_unwind().await.is_err() {
                    error!(executor = %worker_name, "task panicked");
                }
            }
            debug!(executor = %worker_name, "worker stopped");
        });

        Self {
            name,
            sender: Mutex::new(Some(sender)),
            worker: AsyncMutex::new(Some(worker)),
        }
    }

    /// Queue a task behind everything already submitted
    ///
    /// Never blocks. Fails only after `shutdown` has been called.
    pub fn execute<F>(&self, task: F) -> Result<(), ExecutorError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let guard = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        let sender = guard
            .as_ref()
            .ok_or_else(|| ExecutorError::ShutDown(self.name.clone()))?;
        sender
            .send(task.boxed())
            .map_err(|_| ExecutorError::ShutDown(self.name.clone()))
    }

    pub fn is_running(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Stop accepting tasks and wait for the queued ones to finish
    ///
    /// Every caller, including concurrent ones, returns only once the queue
    /// has drained.
    pub async fn shutdown(&self) {
        self.sender
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        let mut worker = self.worker.lock().await;
        if let Some(handle) = worker.as_mut() {
            if let Err(e) = handle.await {
                error!(executor = %self.name, "worker failed: {}", e);
            }
            *worker = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_tasks_run_in_submission_order() {
        let executor = SerialExecutor::start("test");
        let seen = Arc::new(AsyncMutex::new(Vec::new()));

        for i in 0..5u64 {
            let seen = seen.clone();
            executor
                .execute(async move {
                    // Earlier tasks sleep longer; order must still hold
                    tokio::time::sleep(Duration::from_millis(10 * (5 - i))).await;
                    seen.lock().await.push(i);
                })
                .unwrap();
        }

        executor.shutdown().await;
        assert_eq!(*seen.lock().await, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_execute_after_shutdown_fails() {
        let executor = SerialExecutor::start("closed");
        executor.shutdown().await;
        assert!(!executor.is_running());
        assert!(matches!(
            executor.execute(async {}),
            Err(ExecutorError::ShutDown(name)) if name == "closed"
        ));
        executor.shutdown().await;
    }

    #[tokio::test]
    async fn test_panicking_task_does_not_stop_worker() {
        let executor = SerialExecutor::start("panics");
        let ran = Arc::new(AsyncMutex::new(false));

        executor
            .execute(async {
                if true {
                    panic!("boom");
                }
            })
            .unwrap();
        let flag = ran.clone();
        executor
            .execute(async move {
                *flag.lock().await = true;
            })
            .unwrap();

        executor.shutdown().await;
        assert!(*ran.lock().await);
    }

    #[tokio::test]
    async fn test_concurrent_shutdowns_both_wait_for_drain() {
        let executor = SerialExecutor::start("twice");
        let done = Arc::new(AtomicBool::new(false));

        let flag = done.clone();
        executor
            .execute(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                flag.store(true, Ordering::SeqCst);
            })
            .unwrap();

        let (first, second) = tokio::join!(
            async {
                executor.shutdown().await;
                done.load(Ordering::SeqCst)
            },
            async {
                executor.shutdown().await;
                done.load(Ordering::SeqCst)
            },
        );
        assert!(first);
        assert!(second);
    }
}
