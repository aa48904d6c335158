// TestDependencies - mock implementations for testing
//
// Provides a scriptable Instagram scraper that can be injected into ServerDeps.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::traits::{
    BaseInstagramScraper, Comment, Post, Profile, ScrapeError, ScrapeResult, ScrapeStream,
};

// =============================================================================
// Mock Instagram Scraper
// =============================================================================

/// Arguments captured from a sampling call (posts, likers, comments)
#[derive(Debug, Clone, PartialEq)]
pub struct SampleCallArgs {
    pub key: String,
    pub limit: u32,
}

/// Canned scraper. Sequences are returned in full regardless of `limit`,
/// so callers have to enforce their own ceilings. Clones share state, so a
/// test can keep a handle and inspect calls after handing one to the server.
#[derive(Clone, Default)]
pub struct MockInstagramScraper {
    profiles: Arc<Mutex<HashMap<String, Profile>>>,
    profile_errors: Arc<Mutex<HashMap<String, (u32, ScrapeError)>>>,
    posts: Arc<Mutex<HashMap<String, Vec<ScrapeResult<Post>>>>>,
    posts_errors: Arc<Mutex<HashMap<String, ScrapeError>>>,
    likers: Arc<Mutex<HashMap<String, Vec<String>>>>,
    liker_errors: Arc<Mutex<HashMap<String, ScrapeError>>>,
    comments: Arc<Mutex<HashMap<String, Vec<Comment>>>>,
    comment_errors: Arc<Mutex<HashMap<String, ScrapeError>>>,
    profile_delay: Option<Duration>,
    profile_calls: Arc<Mutex<Vec<String>>>,
    post_calls: Arc<Mutex<Vec<SampleCallArgs>>>,
    liker_calls: Arc<Mutex<Vec<SampleCallArgs>>>,
    comment_calls: Arc<Mutex<Vec<SampleCallArgs>>>,
}

impl MockInstagramScraper {
    pub fn new() -> Self {
        Self::default()
    }

    /// A public profile with sensible defaults.
    pub fn profile(username: &str, followers: i64) -> Profile {
        Profile {
            username: username.to_string(),
            full_name: format!("{} (test)", username),
            biography: "bio".to_string(),
            profile_pic_url: format!("https://cdn.example/{}.jpg", username),
            is_private: false,
            is_verified: false,
            followers,
            following: 42,
            post_count: 7,
        }
    }

    /// A post taken at 2024-06-01 12:00 UTC with a short code derived from `id`.
    pub fn post(id: &str, likes: i64, comments: i64) -> Post {
        let taken_at = Utc
            .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Post {
            id: id.to_string(),
            short_code: Some(format!("SC{}", id)),
            url: format!("https://cdn.example/media/{}.jpg", id),
            caption: format!("caption for {}", id),
            likes,
            comments,
            taken_at,
        }
    }

    pub fn comment(owner: &str, text: &str) -> Comment {
        Comment {
            owner_username: Some(owner.to_string()),
            text: text.to_string(),
            created_at: None,
        }
    }

    pub fn with_profile(self, profile: Profile) -> Self {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.username.clone(), profile);
        self
    }

    /// Always fail profile lookups for `username`
    pub fn with_profile_error(self, username: &str, error: ScrapeError) -> Self {
        self.with_profile_failures(username, u32::MAX, error)
    }

    /// Fail the first `times` lookups for `username`, then fall through to the canned profile
    pub fn with_profile_failures(self, username: &str, times: u32, error: ScrapeError) -> Self {
        self.profile_errors
            .lock()
            .unwrap()
            .insert(username.to_string(), (times, error));
        self
    }

    /// Delay every profile lookup (keeps tasks in `processing` for a while)
    pub fn with_profile_delay(mut self, delay: Duration) -> Self {
        self.profile_delay = Some(delay);
        self
    }

    pub fn with_posts(self, username: &str, posts: Vec<Post>) -> Self {
        self.posts
            .lock()
            .unwrap()
            .insert(username.to_string(), posts.into_iter().map(Ok).collect());
        self
    }

    /// Posts stream that yields the given items, errors included
    pub fn with_post_items(self, username: &str, items: Vec<ScrapeResult<Post>>) -> Self {
        self.posts.lock().unwrap().insert(username.to_string(), items);
        self
    }

    pub fn with_posts_error(self, username: &str, error: ScrapeError) -> Self {
        self.posts_errors
            .lock()
            .unwrap()
            .insert(username.to_string(), error);
        self
    }

    pub fn with_likers(self, post_id: &str, likers: &[&str]) -> Self {
        self.likers.lock().unwrap().insert(
            post_id.to_string(),
            likers.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn with_likers_error(self, post_id: &str, error: ScrapeError) -> Self {
        self.liker_errors
            .lock()
            .unwrap()
            .insert(post_id.to_string(), error);
        self
    }

    pub fn with_comments(self, post_id: &str, comments: Vec<Comment>) -> Self {
        self.comments
            .lock()
            .unwrap()
            .insert(post_id.to_string(), comments);
        self
    }

    pub fn with_comments_error(self, post_id: &str, error: ScrapeError) -> Self {
        self.comment_errors
            .lock()
            .unwrap()
            .insert(post_id.to_string(), error);
        self
    }

    /// Usernames passed to fetch_profile, in call order
    pub fn profile_calls(&self) -> Vec<String> {
        self.profile_calls.lock().unwrap().clone()
    }

    pub fn post_calls(&self) -> Vec<SampleCallArgs> {
        self.post_calls.lock().unwrap().clone()
    }

    pub fn liker_calls(&self) -> Vec<SampleCallArgs> {
        self.liker_calls.lock().unwrap().clone()
    }

    pub fn comment_calls(&self) -> Vec<SampleCallArgs> {
        self.comment_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseInstagramScraper for MockInstagramScraper {
    async fn fetch_profile(&self, username: &str) -> ScrapeResult<Profile> {
        self.profile_calls.lock().unwrap().push(username.to_string());

        if let Some(delay) = self.profile_delay {
            tokio::time::sleep(delay).await;
        }

        {
            let mut errors = self.profile_errors.lock().unwrap();
            if let Some((remaining, error)) = errors.get_mut(username) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(error.clone());
                }
            }
        }

        self.profiles
            .lock()
            .unwrap()
            .get(username)
            .cloned()
            .ok_or_else(|| ScrapeError::NotFound {
                username: username.to_string(),
            })
    }

    async fn fetch_posts(&self, username: &str, limit: u32) -> ScrapeResult<ScrapeStream<Post>> {
        self.post_calls.lock().unwrap().push(SampleCallArgs {
            key: username.to_string(),
            limit,
        });

        if let Some(error) = self.posts_errors.lock().unwrap().get(username) {
            return Err(error.clone());
        }

        let items = self
            .posts
            .lock()
            .unwrap()
            .get(username)
            .cloned()
            .unwrap_or_default();
        Ok(stream::iter(items).boxed())
    }

    async fn fetch_likers(&self, post: &Post, limit: u32) -> ScrapeResult<ScrapeStream<String>> {
        self.liker_calls.lock().unwrap().push(SampleCallArgs {
            key: post.id.clone(),
            limit,
        });

        if let Some(error) = self.liker_errors.lock().unwrap().get(&post.id) {
            return Err(error.clone());
        }

        let likers = self
            .likers
            .lock()
            .unwrap()
            .get(&post.id)
            .cloned()
            .unwrap_or_default();
        Ok(stream::iter(likers.into_iter().map(Ok)).boxed())
    }

    async fn fetch_comments(&self, post: &Post, limit: u32) -> ScrapeResult<ScrapeStream<Comment>> {
        self.comment_calls.lock().unwrap().push(SampleCallArgs {
            key: post.id.clone(),
            limit,
        });

        if let Some(error) = self.comment_errors.lock().unwrap().get(&post.id) {
            return Err(error.clone());
        }

        let comments = self
            .comments
            .lock()
            .unwrap()
            .get(&post.id)
            .cloned()
            .unwrap_or_default();
        Ok(stream::iter(comments.into_iter().map(Ok)).boxed())
    }
}
