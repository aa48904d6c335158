//! Background execution of submitted tasks.
//!
//! ```text
//! handler ── store.create(processing) ──► TaskRunner::spawn(id, work)
//!                                              │
//!                                              ├─► wait for a run permit
//!                                              ├─► work(ProgressReporter) ──► store.update(Progress)*
//!                                              └─► store.update(Complete | Fail)
//! ```
//!
//! Exactly one terminal write happens per spawned task, including when the
//! work panics.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::store::TaskStore;
use super::task::{TaskId, TaskUpdate};

/// Writes partial progress for a single task. Failures are logged, never returned.
#[derive(Clone)]
pub struct ProgressReporter {
    store: Arc<dyn TaskStore>,
    task_id: TaskId,
}

impl ProgressReporter {
    pub fn new(store: Arc<dyn TaskStore>, task_id: TaskId) -> Self {
        Self { store, task_id }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub async fn report(&self, partial: serde_json::Value) {
        if let Err(e) = self
            .store
            .update(self.task_id, TaskUpdate::Progress(partial))
            .await
        {
            warn!(task_id = %self.task_id, error = %e, "failed to record progress");
        }
    }

    /// Serialize a domain snapshot and report it.
    pub async fn report_snapshot<T: Serialize>(&self, snapshot: &T) {
        match serde_json::to_value(snapshot) {
            Ok(value) => self.report(value).await,
            Err(e) => warn!(task_id = %self.task_id, error = %e, "failed to serialize progress"),
        }
    }
}

/// Spawns task work onto the tokio runtime with bounded concurrency.
///
/// Submission never waits: runs beyond the limit queue on the semaphore and
/// stay `processing` until a permit frees up.
#[derive(Clone)]
pub struct TaskRunner {
    store: Arc<dyn TaskStore>,
    permits: Arc<Semaphore>,
}

impl TaskRunner {
    pub fn new(store: Arc<dyn TaskStore>, max_concurrent: usize) -> Self {
        Self {
            store,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Run `work` in the background and record its outcome on `task_id`.
    pub fn spawn<F, Fut>(&self, task_id: TaskId, work: F) -> JoinHandle<()>
    where
        F: FnOnce(ProgressReporter) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<serde_json::Value>> + Send + 'static,
    {
        let store = self.store.clone();
        let permits = self.permits.clone();

        tokio::spawn(async move {
            let _permit = permits.acquire_owned().await.ok();
            debug!(task_id = %task_id, "task started");

            let reporter = ProgressReporter::new(store.clone(), task_id);
            let started = Instant::now();
            let outcome = AssertUnwindSafe(async move { work(reporter).await })
                .catch_unwind()
                .await;
            let duration_ms = started.elapsed().as_millis() as u64;

            let update = match outcome {
                Ok(Ok(result)) => {
                    info!(task_id = %task_id, duration_ms, "task completed");
                    TaskUpdate::Complete(result)
                }
                Ok(Err(e)) => {
                    let message = format!("{:#}", e);
                    warn!(task_id = %task_id, duration_ms, error = %message, "task failed");
                    TaskUpdate::Fail(message)
                }
                Err(panic) => {
                    let message = panic_message(panic);
                    error!(task_id = %task_id, duration_ms, panic = %message, "task panicked");
                    TaskUpdate::Fail(format!("task panicked: {}", message))
                }
            };

            if let Err(e) = store.update(task_id, update).await {
                error!(task_id = %task_id, error = %e, "failed to record task outcome");
            }
        })
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
