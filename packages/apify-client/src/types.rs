use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input for the apify/instagram-profile-scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileScraperInput {
    pub usernames: Vec<String>,
}

/// Input for the apify/instagram-post-scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct PostScraperInput {
    pub username: Vec<String>,
    #[serde(rename = "resultsLimit")]
    pub results_limit: u32,
}

/// Input for actors keyed by post URL (comments, likers).
#[derive(Debug, Clone, Serialize)]
pub struct UrlScraperInput {
    #[serde(rename = "directUrls")]
    pub direct_urls: Vec<String>,
    #[serde(rename = "resultsLimit")]
    pub results_limit: u32,
}

/// A single Instagram profile from the Apify dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct InstagramProfile {
    pub username: String,
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
    pub biography: Option<String>,
    #[serde(rename = "profilePicUrl")]
    pub profile_pic_url: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(rename = "followersCount")]
    pub followers_count: Option<i64>,
    #[serde(rename = "followsCount")]
    pub follows_count: Option<i64>,
    #[serde(rename = "postsCount")]
    pub posts_count: Option<i64>,
}

/// A single Instagram post from the Apify dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct InstagramPost {
    pub id: Option<String>,
    pub caption: Option<String>,
    #[serde(rename = "ownerUsername")]
    pub owner_username: Option<String>,
    pub url: String,
    #[serde(rename = "shortCode")]
    pub short_code: Option<String>,
    #[serde(rename = "likesCount")]
    pub likes_count: Option<i64>,
    #[serde(rename = "commentsCount")]
    pub comments_count: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// A comment from the apify/instagram-comment-scraper dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct InstagramComment {
    pub text: Option<String>,
    #[serde(rename = "ownerUsername")]
    pub owner_username: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// An account that liked a post.
#[derive(Debug, Clone, Deserialize)]
pub struct InstagramLiker {
    pub username: Option<String>,
}

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}
