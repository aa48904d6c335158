//! Pure Apify REST API client.
//!
//! A minimal client for the Apify platform API. Supports starting actor runs,
//! polling for completion, and fetching dataset results, plus typed helpers
//! for the Instagram profile, post, comment and liker actors.
//!
//! # Example
//!
//! ```rust,ignore
//! use apify_client::ApifyClient;
//!
//! let client = ApifyClient::new("your-api-token".into());
//!
//! let profile = client.scrape_instagram_profile("natgeo").await?;
//! let posts = client.scrape_instagram_posts("natgeo", 5).await?;
//! for post in &posts {
//!     println!("{}", post.caption.as_deref().unwrap_or("(no caption)"));
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{
    InstagramComment, InstagramLiker, InstagramPost, InstagramProfile, ProfileScraperInput,
    PostScraperInput, RunData, UrlScraperInput,
};

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use types::ApiResponse;

const DEFAULT_BASE_URL: &str = "https://api.apify.com/v2";

/// apify/instagram-profile-scraper
pub const INSTAGRAM_PROFILE_SCRAPER: &str = "apify~instagram-profile-scraper";

/// apify/instagram-post-scraper
pub const INSTAGRAM_POST_SCRAPER: &str = "apify~instagram-post-scraper";

/// apify/instagram-comment-scraper
pub const INSTAGRAM_COMMENT_SCRAPER: &str = "apify~instagram-comment-scraper";

/// Seconds the API holds a run-status request open while waiting for a finish.
const WAIT_FOR_FINISH_SECS: u64 = 60;

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL.to_string())
    }

    /// Point the client at a different API root (proxies, test servers).
    pub fn with_base_url(token: String, base_url: String) -> Self {
        // Long-polling holds requests open for WAIT_FOR_FINISH_SECS, leave headroom.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(WAIT_FOR_FINISH_SECS + 30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn run_url(&self, actor_id: &str) -> String {
        format!("{}/acts/{}/runs", self.base_url, actor_id)
    }

    fn run_status_url(&self, run_id: &str) -> String {
        format!(
            "{}/actor-runs/{}?waitForFinish={}",
            self.base_url, run_id, WAIT_FOR_FINISH_SECS
        )
    }

    fn dataset_items_url(&self, dataset_id: &str) -> String {
        format!("{}/datasets/{}/items?format=json", self.base_url, dataset_id)
    }

    /// Start an actor run with the given input. Returns immediately with run metadata.
    pub async fn start_run<I: Serialize + ?Sized>(
        &self,
        actor_id: &str,
        input: &I,
    ) -> Result<RunData> {
        let resp = self
            .client
            .post(self.run_url(actor_id))
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let resp = check_status(resp).await?;
        let api_resp: ApiResponse<RunData> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Poll until a run completes. Uses `waitForFinish` for efficient long-polling.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        loop {
            let resp = self
                .client
                .get(self.run_status_url(run_id))
                .bearer_auth(&self.token)
                .send()
                .await?;

            let resp = check_status(resp).await?;
            let api_resp: ApiResponse<RunData> = resp.json().await?;
            match api_resp.data.status.as_str() {
                "SUCCEEDED" => return Ok(api_resp.data),
                "FAILED" | "ABORTED" | "TIMED-OUT" => {
                    return Err(ApifyError::RunFailed(api_resp.data.status));
                }
                _ => {
                    tracing::debug!(run_id, status = %api_resp.data.status, "Run still in progress");
                    continue;
                }
            }
        }
    }

    /// Fetch dataset items from a completed run.
    pub async fn get_dataset_items<T: DeserializeOwned>(&self, dataset_id: &str) -> Result<Vec<T>> {
        let resp = self
            .client
            .get(self.dataset_items_url(dataset_id))
            .bearer_auth(&self.token)
            .send()
            .await?;

        let resp = check_status(resp).await?;
        let items: Vec<T> = resp.json().await?;
        Ok(items)
    }

    /// Run an actor end-to-end: start, wait for completion, fetch the default dataset.
    pub async fn run_actor<I, T>(&self, actor_id: &str, input: &I) -> Result<Vec<T>>
    where
        I: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let run = self.start_run(actor_id, input).await?;
        tracing::debug!(actor_id, run_id = %run.id, "Apify run started, polling for completion");

        let completed = self.wait_for_run(&run.id).await?;
        tracing::debug!(
            actor_id,
            run_id = %completed.id,
            dataset_id = %completed.default_dataset_id,
            "Run completed, fetching results"
        );

        self.get_dataset_items(&completed.default_dataset_id).await
    }

    /// Scrape a single Instagram profile. Errors with `EmptyDataset` when the
    /// actor returns nothing for the username.
    pub async fn scrape_instagram_profile(&self, username: &str) -> Result<InstagramProfile> {
        tracing::info!(username, "Starting Instagram profile scrape");

        let input = ProfileScraperInput {
            usernames: vec![username.to_string()],
        };
        let profiles: Vec<InstagramProfile> =
            self.run_actor(INSTAGRAM_PROFILE_SCRAPER, &input).await?;

        profiles
            .into_iter()
            .find(|p| p.username.eq_ignore_ascii_case(username))
            .ok_or(ApifyError::EmptyDataset)
    }

    /// Scrape the most recent posts of a profile, newest first.
    pub async fn scrape_instagram_posts(
        &self,
        username: &str,
        limit: u32,
    ) -> Result<Vec<InstagramPost>> {
        tracing::info!(username, limit, "Starting Instagram post scrape");

        let input = PostScraperInput {
            username: vec![username.to_string()],
            results_limit: limit,
        };
        let posts: Vec<InstagramPost> = self.run_actor(INSTAGRAM_POST_SCRAPER, &input).await?;
        tracing::info!(count = posts.len(), "Fetched Instagram posts");

        Ok(posts)
    }

    /// Scrape comments left on a single post.
    pub async fn scrape_instagram_comments(
        &self,
        post_url: &str,
        limit: u32,
    ) -> Result<Vec<InstagramComment>> {
        let input = UrlScraperInput {
            direct_urls: vec![post_url.to_string()],
            results_limit: limit,
        };
        self.run_actor(INSTAGRAM_COMMENT_SCRAPER, &input).await
    }

    /// Scrape accounts that liked a single post using the given liker actor.
    pub async fn scrape_instagram_likers(
        &self,
        actor_id: &str,
        post_url: &str,
        limit: u32,
    ) -> Result<Vec<InstagramLiker>> {
        let input = UrlScraperInput {
            direct_urls: vec![post_url.to_string()],
            results_limit: limit,
        };
        self.run_actor(actor_id, &input).await
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(ApifyError::Api {
        status: status.as_u16(),
        message: body,
    })
}
