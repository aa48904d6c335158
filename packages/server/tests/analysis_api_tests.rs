//! Integration tests for background analysis submission and status polling.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{scraper_with_target, TestHarness, BASE_URL, OPERATOR};
use server_core::kernel::tasks::TaskId;
use server_core::kernel::{MockInstagramScraper, ScrapeError};

// ============================================================================
// Submission
// ============================================================================

#[tokio::test]
async fn submit_returns_immediately_with_fresh_ids() {
    let scraper = scraper_with_target("bob", 2).with_profile_delay(Duration::from_millis(300));
    let harness = TestHarness::new(scraper);

    let (status, first) = harness
        .post_json("/analyze", json!({"user1": "alice", "user2": "bob"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["status"], "processing");
    assert_eq!(first["message"], "Analysis started in background");

    let (_, second) = harness
        .post_json("/analyze", json!({"user1": "alice", "user2": "bob"}))
        .await;
    assert_ne!(first["task_id"], second["task_id"]);

    let task_id = first["task_id"].as_str().unwrap();
    assert_eq!(
        first["check_status"],
        format!("{}/status/{}", BASE_URL, task_id)
    );

    // Scraper is still sleeping on the profile lookup
    let (status, polled) = harness.get(&format!("/status/{}", task_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(polled["status"], "processing");
    assert!(polled["elapsed_seconds"].as_f64().unwrap() >= 0.0);
    assert!(polled["started_at"].is_number());
}

#[tokio::test]
async fn completed_task_carries_report() {
    let scraper = scraper_with_target("bob", 3)
        .with_likers("bob-0", &["alice", "carol"])
        .with_comments(
            "bob-2",
            vec![MockInstagramScraper::comment("alice", "great shot")],
        );
    let harness = TestHarness::new(scraper);

    let (_, submitted) = harness
        .post_json("/analyze", json!({"user1": "alice", "user2": "bob"}))
        .await;
    let body = harness
        .wait_for_terminal(submitted["task_id"].as_str().unwrap())
        .await;

    assert_eq!(body["status"], "completed");
    assert!(body.get("error").is_none());

    let result = &body["result"];
    assert_eq!(result["user1"], "alice");
    assert_eq!(result["user2"], "bob");
    assert_eq!(result["status"], "success");
    assert_eq!(result["posts_checked"], 3);
    assert_eq!(result["user1_likes_found"], 1);
    assert_eq!(result["user1_comments_found"], 1);
    assert_eq!(result["user1_comments"][0]["text"], "great shot");
    assert_eq!(result["profile"]["followers"], 1_000);
    assert_eq!(
        result["analysis_scope"],
        "Checked 3 most recent posts quickly"
    );
    assert_eq!(
        result["recent_posts"][0]["post_link"],
        "https://www.instagram.com/p/SCbob-0/"
    );
}

#[tokio::test]
async fn missing_target_profile_ends_in_error() {
    let scraper = MockInstagramScraper::new().with_profile_error(
        "ghost",
        ScrapeError::NotFound {
            username: "ghost".into(),
        },
    );
    let harness = TestHarness::new(scraper);

    let (_, submitted) = harness
        .post_json("/analyze", json!({"user1": "alice", "user2": "ghost"}))
        .await;
    let body = harness
        .wait_for_terminal(submitted["task_id"].as_str().unwrap())
        .await;

    assert_eq!(body["status"], "error");
    assert!(!body["error"].as_str().unwrap().is_empty());
    assert!(body.get("result").is_none());
}

#[tokio::test]
async fn terminal_state_does_not_revert() {
    let harness = TestHarness::new(scraper_with_target("bob", 1));

    let (_, submitted) = harness
        .post_json("/analyze", json!({"user1": "alice", "user2": "bob"}))
        .await;
    let task_id = submitted["task_id"].as_str().unwrap();
    let first = harness.wait_for_terminal(task_id).await;

    tokio::time::sleep(Duration::from_millis(30)).await;
    let (_, again) = harness.get(&format!("/status/{}", task_id)).await;
    assert_eq!(first, again);
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn missing_usernames_are_rejected_without_creating_tasks() {
    let harness = TestHarness::new(MockInstagramScraper::new());

    for body in [
        json!({"user2": "bob"}),
        json!({"user1": "alice"}),
        json!({"user1": "", "user2": "bob"}),
        json!({"user1": "alice", "user2": "   "}),
    ] {
        let (status, response) = harness.post_json("/analyze", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["detail"], "Both usernames are required");
    }

    let (status, response) = harness.post_raw("/analyze", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["detail"].is_string());

    assert!(harness.store.is_empty().await);
}

#[tokio::test]
async fn oversized_caps_are_clamped_in_stored_params() {
    let harness = TestHarness::new(scraper_with_target("bob", 1));

    let (_, submitted) = harness
        .post_json(
            "/analyze",
            json!({"user1": " alice ", "user2": "bob", "max_posts": 999, "max_stories": 999}),
        )
        .await;
    let task_id = TaskId::parse(submitted["task_id"].as_str().unwrap()).unwrap();

    let record = harness.store.get(task_id).await.unwrap();
    assert_eq!(record.params["max_posts"], 20);
    assert_eq!(record.params["max_stories"], 5);
    assert_eq!(record.params["user1"], "alice");
}

#[tokio::test]
async fn huge_and_float_caps_are_clamped_in_stored_params() {
    let harness = TestHarness::new(scraper_with_target("bob", 1));

    for body in [
        r#"{"user1": "alice", "user2": "bob", "max_posts": 100000000000000000000}"#,
        r#"{"user1": "alice", "user2": "bob", "max_posts": 999.0}"#,
    ] {
        let (status, submitted) = harness.post_raw("/analyze", body.to_string()).await;
        assert_eq!(status, StatusCode::OK, "rejected {}", body);
        let task_id = TaskId::parse(submitted["task_id"].as_str().unwrap()).unwrap();

        let record = harness.store.get(task_id).await.unwrap();
        assert_eq!(record.params["max_posts"], 20);
    }
}

// ============================================================================
// Status lookups
// ============================================================================

#[tokio::test]
async fn unknown_or_malformed_task_ids_are_404() {
    let harness = TestHarness::new(MockInstagramScraper::new());

    let (status, body) = harness
        .get(&format!("/status/{}", TaskId::new()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Task not found");

    let (status, _) = harness.get("/status/not-a-task").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Fetch scope
// ============================================================================

#[tokio::test]
async fn fast_tier_checks_at_most_five_posts() {
    let harness = TestHarness::new(scraper_with_target("bob", 12));

    let (_, submitted) = harness
        .post_json(
            "/analyze",
            json!({"user1": "alice", "user2": "bob", "max_posts": 20}),
        )
        .await;
    let body = harness
        .wait_for_terminal(submitted["task_id"].as_str().unwrap())
        .await;

    assert_eq!(body["result"]["posts_checked"], 5);
}

#[tokio::test]
async fn operator_gets_full_credentialed_scope() {
    // Only the credentialed scraper knows the target, so a run on the
    // anonymous one would fail the profile lookup.
    let anonymous = MockInstagramScraper::new();
    let operator = scraper_with_target("bob", 9);
    let harness = TestHarness::with_scrapers(anonymous, Some(operator.clone()));

    let (_, submitted) = harness
        .post_json(
            "/analyze",
            json!({"user1": OPERATOR, "user2": "bob", "max_posts": 1, "fetch_all_posts": false}),
        )
        .await;
    let body = harness
        .wait_for_terminal(submitted["task_id"].as_str().unwrap())
        .await;

    assert_eq!(body["status"], "completed");
    assert_eq!(body["result"]["posts_checked"], 9);
    assert_eq!(operator.post_calls()[0].limit, 500);
}
