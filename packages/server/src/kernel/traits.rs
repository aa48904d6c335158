// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Interaction analysis lives in domains/interactions and uses these traits.
//
// Naming convention: Base* for trait names (e.g., BaseInstagramScraper)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Scraper errors
// =============================================================================

#[derive(Debug, Clone, Error)]
pub enum ScrapeError {
    #[error("profile '{username}' does not exist or is not visible")]
    NotFound { username: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("rate limited by upstream scraper")]
    RateLimited,

    #[error("scraper capability unavailable: {0}")]
    Unavailable(String),

    #[error("upstream scraper error: {0}")]
    Upstream(String),
}

impl ScrapeError {
    /// Whether repeating the same call could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ScrapeError::NotFound { .. } | ScrapeError::Unauthorized(_) | ScrapeError::Unavailable(_)
        )
    }
}

pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;

/// Finite, non-restartable sequence produced by the scraper.
pub type ScrapeStream<T> = BoxStream<'static, ScrapeResult<T>>;

// =============================================================================
// Scraped entities
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub full_name: String,
    pub biography: String,
    pub profile_pic_url: String,
    pub is_private: bool,
    pub is_verified: bool,
    pub followers: i64,
    pub following: i64,
    pub post_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub short_code: Option<String>,
    pub url: String,
    pub caption: String,
    pub likes: i64,
    pub comments: i64,
    pub taken_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub owner_username: Option<String>,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Instagram Scraper Trait (Infrastructure - external collaborator)
// =============================================================================

#[async_trait]
pub trait BaseInstagramScraper: Send + Sync {
    /// Fetch a public profile by username
    async fn fetch_profile(&self, username: &str) -> ScrapeResult<Profile>;

    /// Recent posts of a profile, newest first, at most `limit` of them
    async fn fetch_posts(&self, username: &str, limit: u32) -> ScrapeResult<ScrapeStream<Post>>;

    /// Usernames of accounts that liked the post
    async fn fetch_likers(&self, post: &Post, limit: u32) -> ScrapeResult<ScrapeStream<String>>;

    /// Comments left on the post
    async fn fetch_comments(&self, post: &Post, limit: u32) -> ScrapeResult<ScrapeStream<Comment>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_and_unauthorized_are_not_retryable() {
        assert!(!ScrapeError::NotFound {
            username: "ghost".into()
        }
        .is_retryable());
        assert!(!ScrapeError::Unauthorized("login required".into()).is_retryable());
    }

    #[test]
    fn transient_errors_are_retryable() {
        assert!(ScrapeError::RateLimited.is_retryable());
        assert!(ScrapeError::Upstream("connection reset".into()).is_retryable());
    }
}
