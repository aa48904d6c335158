//! Task infrastructure for background analysis execution.
//!
//! - [`TaskStore`] - keyed task state with atomic per-record updates
//! - [`MemoryTaskStore`] - in-process implementation
//! - [`TaskRunner`] - spawns work and records the terminal outcome
//! - [`ProgressReporter`] - partial-progress callback handed to the work
//!
//! # Lifecycle
//!
//! ```text
//! processing ──success──► completed
//!     │
//!     └──────failure──► error
//! ```
//!
//! Both end states are terminal. Business logic stays in domains.

mod runner;
mod store;
mod task;

pub use runner::{ProgressReporter, TaskRunner};
pub use store::{MemoryTaskStore, TaskStore, TaskStoreError, TaskStoreResult};
pub use task::{TaskId, TaskOutcome, TaskRecord, TaskStatus, TaskUpdate};
