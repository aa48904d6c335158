use axum::{extract::Extension, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    tracked_tasks: usize,
}

/// Health check endpoint. Reports how many tasks the store currently holds.
pub async fn health_handler(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "instagram-analyzer",
        tracked_tasks: state.deps.task_store.len().await,
    })
}

/// Service banner with the endpoint map.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Instagram Interaction Analyzer API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "active",
        "endpoints": {
            "health": "/health",
            "analyze_get": "/analyze/{user1}/{user2}",
            "analyze_post": "/analyze",
            "check_status": "/status/{task_id}",
            "profile": "/profile/{username}"
        }
    }))
}
