//! Shared harness for HTTP integration tests.
//!
//! Builds the real router over a `MockInstagramScraper` so no test touches
//! the network.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use server_core::kernel::tasks::{MemoryTaskStore, TaskStore};
use server_core::kernel::{BaseInstagramScraper, MockInstagramScraper, ServerDeps};
use server_core::server::build_app;

pub const OPERATOR: &str = "operator_account";
pub const BASE_URL: &str = "http://analyzer.test";

pub struct TestHarness {
    pub app: Router,
    pub store: Arc<dyn TaskStore>,
}

impl TestHarness {
    pub fn new(scraper: MockInstagramScraper) -> Self {
        Self::with_scrapers(scraper, None)
    }

    /// Harness with a separate scraper for credentialed runs.
    pub fn with_scrapers(
        scraper: MockInstagramScraper,
        operator_scraper: Option<MockInstagramScraper>,
    ) -> Self {
        let store: Arc<dyn TaskStore> = Arc::new(MemoryTaskStore::new());
        let deps = ServerDeps::new(
            Arc::new(scraper),
            operator_scraper.map(|s| Arc::new(s) as Arc<dyn BaseInstagramScraper>),
            store.clone(),
            4,
            Some(OPERATOR.to_string()),
            BASE_URL.to_string(),
        );

        Self {
            app: build_app(deps),
            store,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        send(self.app.clone(), request).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.post_raw(uri, body.to_string()).await
    }

    pub async fn post_raw(&self, uri: &str, body: String) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        send(self.app.clone(), request).await
    }

    /// Poll `/status/{id}` until the task leaves `processing`.
    pub async fn wait_for_terminal(&self, task_id: &str) -> Value {
        for _ in 0..300 {
            let (status, body) = self.get(&format!("/status/{}", task_id)).await;
            assert_eq!(status, StatusCode::OK);
            if body["status"] != "processing" {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("task {} did not finish in time", task_id);
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

/// Scraper with a target profile and a handful of posts.
pub fn scraper_with_target(target: &str, posts: usize) -> MockInstagramScraper {
    let posts = (0..posts)
        .map(|i| MockInstagramScraper::post(&format!("{}-{}", target, i), 3, 2))
        .collect();
    MockInstagramScraper::new()
        .with_profile(MockInstagramScraper::profile(target, 1_000))
        .with_posts(target, posts)
}
