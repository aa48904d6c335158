use anyhow::{Context, Result};
use tracing::info;

use super::analyze::analyze_interactions;
use super::profile::RetryPolicy;
use crate::domains::interactions::models::{AnalysisParams, FetchScope};
use crate::kernel::tasks::{TaskId, TaskRecord};
use crate::kernel::ServerDeps;

/// Record a `processing` task and hand the analysis to the runner.
///
/// Returns as soon as the record exists; no scraping happens here.
pub async fn start_analysis(deps: &ServerDeps, params: AnalysisParams) -> Result<TaskId> {
    let scope = FetchScope::resolve(&params, deps.operator_username.as_deref());
    let scraper = deps.scraper_for(scope.credentialed);

    let task_id = TaskId::new();
    let stored = serde_json::to_value(&params).context("failed to serialize analysis params")?;
    deps.task_store
        .create(TaskRecord::processing(task_id, stored))
        .await
        .context("failed to record analysis task")?;

    info!(
        task_id = %task_id,
        user1 = %params.user1,
        user2 = %params.user2,
        fetch_all = scope.fetch_all,
        credentialed = scope.credentialed,
        "analysis submitted"
    );

    deps.task_runner.spawn(task_id, move |progress| async move {
        let report = analyze_interactions(
            scraper.as_ref(),
            &params.user1,
            &params.user2,
            &scope,
            RetryPolicy::default(),
            &progress,
        )
        .await?;
        Ok(serde_json::to_value(report)?)
    });

    Ok(task_id)
}
