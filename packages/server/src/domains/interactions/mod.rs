//! Interactions domain - does `user1` like or comment on `user2`'s posts?
//!
//! - `models` - request validation, fetch scope, report shapes
//! - `activities` - profile lookups, the analysis itself, task submission

pub mod activities;
pub mod models;

pub use activities::{analyze_interactions, start_analysis};
pub use models::{AnalysisParams, AnalyzeRequest, FetchScope, InteractionReport, PostLimit};
