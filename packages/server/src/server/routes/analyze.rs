use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domains::interactions::activities::{compare_followers, RetryPolicy};
use crate::domains::interactions::models::{AnalyzeRequest, ValidationError};
use crate::domains::interactions::start_analysis;
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct CredentialsQuery {
    #[serde(default)]
    pub use_credentials: bool,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    task_id: String,
    status: &'static str,
    message: &'static str,
    check_status: String,
}

/// `POST /analyze` - validate, record a task and return immediately.
pub async fn submit_analysis_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<SubmitResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let params = request.validate()?;

    let task_id = start_analysis(&state.deps, params).await?;

    Ok(Json(SubmitResponse {
        task_id: task_id.to_string(),
        status: "processing",
        message: "Analysis started in background",
        check_status: format!("{}/status/{}", state.deps.public_base_url, task_id),
    }))
}

#[derive(Serialize)]
pub struct BasicComparisonResponse {
    user1: String,
    user2: String,
    user1_followers: i64,
    user2_followers: i64,
    status: &'static str,
    message: &'static str,
}

/// `GET /analyze/{user1}/{user2}` - follower counts only, fetched inline.
pub async fn basic_comparison_handler(
    Extension(state): Extension<AppState>,
    Path((user1, user2)): Path<(String, String)>,
    Query(query): Query<CredentialsQuery>,
) -> ApiResult<Json<BasicComparisonResponse>> {
    let user1 = user1.trim().to_string();
    let user2 = user2.trim().to_string();
    if user1.is_empty() || user2.is_empty() {
        return Err(ValidationError::MissingUsername.into());
    }

    let scraper = state.deps.scraper_for(query.use_credentials);
    let (user1_followers, user2_followers) =
        compare_followers(scraper.as_ref(), &user1, &user2, RetryPolicy::default())
            .await
            .map_err(|e| {
                tracing::warn!(user1 = %user1, user2 = %user2, error = %e, "basic comparison failed");
                ApiError::from(e)
            })?;

    Ok(Json(BasicComparisonResponse {
        user1,
        user2,
        user1_followers,
        user2_followers,
        status: "basic_info_only",
        message: "Use POST /analyze for detailed interaction analysis",
    }))
}
