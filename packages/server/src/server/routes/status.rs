use axum::{
    extract::{Extension, Path},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::kernel::tasks::{TaskId, TaskOutcome, TaskRecord};
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};

/// Shape of `GET /status/{task_id}`, one variant per task state.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskStatusResponse {
    Completed {
        task_id: String,
        result: Value,
    },
    Error {
        task_id: String,
        error: String,
    },
    Processing {
        task_id: String,
        /// Unix seconds
        started_at: f64,
        elapsed_seconds: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        partial: Option<Value>,
    },
}

impl TaskStatusResponse {
    pub fn from_record(record: TaskRecord, now: DateTime<Utc>) -> Self {
        let task_id = record.id.to_string();
        let elapsed_seconds = record.elapsed_seconds(now);
        match record.outcome {
            Some(TaskOutcome::Completed(result)) => Self::Completed { task_id, result },
            Some(TaskOutcome::Failed(error)) => Self::Error { task_id, error },
            None => Self::Processing {
                task_id,
                started_at: record.started_at.timestamp_millis() as f64 / 1000.0,
                elapsed_seconds,
                partial: record.partial,
            },
        }
    }
}

pub async fn task_status_handler(
    Extension(state): Extension<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<TaskStatusResponse>> {
    let task_id =
        TaskId::parse(&task_id).map_err(|_| ApiError::NotFound("Task not found".to_string()))?;
    let record = state.deps.task_store.get(task_id).await?;

    Ok(Json(TaskStatusResponse::from_record(record, Utc::now())))
}
