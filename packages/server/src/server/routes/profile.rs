use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::Serialize;

use super::analyze::CredentialsQuery;
use crate::domains::interactions::activities::{lookup_profile, RetryPolicy};
use crate::domains::interactions::models::ProfileSummary;
use crate::server::app::AppState;
use crate::server::error::ApiResult;

#[derive(Serialize)]
pub struct ProfileResponse {
    status: &'static str,
    profile: ProfileSummary,
}

pub async fn profile_handler(
    Extension(state): Extension<AppState>,
    Path(username): Path<String>,
    Query(query): Query<CredentialsQuery>,
) -> ApiResult<Json<ProfileResponse>> {
    let scraper = state.deps.scraper_for(query.use_credentials);
    let profile = lookup_profile(scraper.as_ref(), username.trim(), RetryPolicy::default()).await?;

    Ok(Json(ProfileResponse {
        status: "ok",
        profile,
    }))
}
