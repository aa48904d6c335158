//! Task storage.
//!
//! `TaskStore` is the seam between request handlers and the task runner.
//! Records are never deleted; pruning finished tasks is left to whoever owns
//! the process.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::task::{TaskId, TaskOutcome, TaskRecord, TaskUpdate};

#[derive(Debug, Error)]
pub enum TaskStoreError {
    #[error("task {0} not found")]
    NotFound(TaskId),

    #[error("task {0} already exists")]
    DuplicateTask(TaskId),

    #[error("task {0} already reached a terminal state")]
    AlreadyTerminal(TaskId),
}

pub type TaskStoreResult<T> = std::result::Result<T, TaskStoreError>;

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a new record. Fails if the id is already present.
    async fn create(&self, record: TaskRecord) -> TaskStoreResult<()>;

    /// Apply an update atomically. Unknown ids are logged and ignored;
    /// a second terminal write is rejected.
    async fn update(&self, id: TaskId, update: TaskUpdate) -> TaskStoreResult<()>;

    async fn get(&self, id: TaskId) -> TaskStoreResult<TaskRecord>;

    /// Number of tracked records.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// In-process store. Data is lost on restart.
#[derive(Default)]
pub struct MemoryTaskStore {
    records: RwLock<HashMap<TaskId, TaskRecord>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create(&self, record: TaskRecord) -> TaskStoreResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(TaskStoreError::DuplicateTask(record.id));
        }
        records.insert(record.id, record);
        Ok(())
    }

    async fn update(&self, id: TaskId, update: TaskUpdate) -> TaskStoreResult<()> {
        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(&id) else {
            warn!(task_id = %id, "update for unknown task ignored");
            return Ok(());
        };

        if record.outcome.is_some() {
            if update.is_terminal() {
                return Err(TaskStoreError::AlreadyTerminal(id));
            }
            debug!(task_id = %id, "progress after terminal state ignored");
            return Ok(());
        }

        let now = Utc::now();
        match update {
            TaskUpdate::Progress(partial) => {
                record.partial = Some(partial);
                record.updated_at = now;
            }
            TaskUpdate::Complete(result) => {
                record.outcome = Some(TaskOutcome::Completed(result));
                record.updated_at = now;
                record.completed_at = Some(now);
            }
            TaskUpdate::Fail(message) => {
                record.outcome = Some(TaskOutcome::Failed(message));
                record.updated_at = now;
                record.completed_at = Some(now);
            }
        }
        Ok(())
    }

    async fn get(&self, id: TaskId) -> TaskStoreResult<TaskRecord> {
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(TaskStoreError::NotFound(id))
    }

    async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::tasks::TaskStatus;
    use serde_json::json;

    fn record() -> TaskRecord {
        TaskRecord::processing(TaskId::new(), json!({"user1": "a", "user2": "b"}))
    }

    #[tokio::test]
    async fn create_then_get() {
        let store = MemoryTaskStore::new();
        let rec = record();
        let id = rec.id;
        store.create(rec).await.unwrap();

        let fetched = store.get(id).await.unwrap();
        assert_eq!(fetched.status(), TaskStatus::Processing);
        assert_eq!(fetched.params["user2"], "b");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_create_fails() {
        let store = MemoryTaskStore::new();
        let rec = record();
        store.create(rec.clone()).await.unwrap();

        let err = store.create(rec).await.unwrap_err();
        assert!(matches!(err, TaskStoreError::DuplicateTask(_)));
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let store = MemoryTaskStore::new();
        let err = store.get(TaskId::new()).await.unwrap_err();
        assert!(matches!(err, TaskStoreError::NotFound(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn update_unknown_is_ignored() {
        let store = MemoryTaskStore::new();
        store
            .update(TaskId::new(), TaskUpdate::Progress(json!({"posts_checked": 1})))
            .await
            .unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn progress_overwrites_partial() {
        let store = MemoryTaskStore::new();
        let rec = record();
        let id = rec.id;
        store.create(rec).await.unwrap();

        store
            .update(id, TaskUpdate::Progress(json!({"posts_checked": 1})))
            .await
            .unwrap();
        store
            .update(id, TaskUpdate::Progress(json!({"posts_checked": 2})))
            .await
            .unwrap();

        let fetched = store.get(id).await.unwrap();
        assert_eq!(fetched.partial, Some(json!({"posts_checked": 2})));
        assert_eq!(fetched.status(), TaskStatus::Processing);
        assert!(fetched.updated_at >= fetched.started_at);
    }

    #[tokio::test]
    async fn terminal_write_is_once_only() {
        let store = MemoryTaskStore::new();
        let rec = record();
        let id = rec.id;
        store.create(rec).await.unwrap();

        store
            .update(id, TaskUpdate::Complete(json!({"ok": true})))
            .await
            .unwrap();

        let err = store
            .update(id, TaskUpdate::Fail("late failure".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskStoreError::AlreadyTerminal(_)));

        let fetched = store.get(id).await.unwrap();
        assert_eq!(fetched.status(), TaskStatus::Completed);
        assert_eq!(fetched.result(), Some(&json!({"ok": true})));
        assert!(fetched.error().is_none());
        assert!(fetched.completed_at.is_some());
    }

    #[tokio::test]
    async fn progress_after_terminal_is_ignored() {
        let store = MemoryTaskStore::new();
        let rec = record();
        let id = rec.id;
        store.create(rec).await.unwrap();

        store.update(id, TaskUpdate::Fail("boom".into())).await.unwrap();
        store
            .update(id, TaskUpdate::Progress(json!({"posts_checked": 9})))
            .await
            .unwrap();

        let fetched = store.get(id).await.unwrap();
        assert_eq!(fetched.status(), TaskStatus::Error);
        assert_eq!(fetched.error(), Some("boom"));
        assert!(fetched.partial.is_none());
    }
}
