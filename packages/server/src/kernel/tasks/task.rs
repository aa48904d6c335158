use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier of a background task (random UUID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Processing,
    Completed,
    Error,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Processing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Error => "error",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of a task. Holding either the payload or the error (never
/// both) is what keeps `result` and `error` mutually exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Completed(serde_json::Value),
    Failed(String),
}

/// State tracked for one submitted analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub id: TaskId,
    /// Request parameters as accepted at submission
    pub params: serde_json::Value,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Latest progress snapshot, overwritten on every report
    pub partial: Option<serde_json::Value>,
    pub outcome: Option<TaskOutcome>,
}

impl TaskRecord {
    /// A fresh record in `processing` state.
    pub fn processing(id: TaskId, params: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id,
            params,
            started_at: now,
            updated_at: now,
            completed_at: None,
            partial: None,
            outcome: None,
        }
    }

    pub fn status(&self) -> TaskStatus {
        match self.outcome {
            None => TaskStatus::Processing,
            Some(TaskOutcome::Completed(_)) => TaskStatus::Completed,
            Some(TaskOutcome::Failed(_)) => TaskStatus::Error,
        }
    }

    pub fn result(&self) -> Option<&serde_json::Value> {
        match &self.outcome {
            Some(TaskOutcome::Completed(value)) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Some(TaskOutcome::Failed(message)) => Some(message),
            _ => None,
        }
    }

    /// Seconds since the task was created.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> f64 {
        (now - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// A mutation applied to an existing record.
#[derive(Debug, Clone)]
pub enum TaskUpdate {
    /// Replace the progress snapshot
    Progress(serde_json::Value),
    /// Terminal success
    Complete(serde_json::Value),
    /// Terminal failure
    Fail(String),
}

impl TaskUpdate {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskUpdate::Progress(_))
    }
}
