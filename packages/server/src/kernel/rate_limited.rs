//! Rate-limited scraper wrapper.
//!
//! Wraps any BaseInstagramScraper with rate limiting using the governor crate.
//! Every collaborator call waits for a permit; items of an already-opened
//! stream are not limited.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

use super::traits::{BaseInstagramScraper, Comment, Post, Profile, ScrapeResult, ScrapeStream};

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

pub struct RateLimitedScraper<S: BaseInstagramScraper> {
    inner: S,
    limiter: Arc<DefaultRateLimiter>,
}

impl<S: BaseInstagramScraper> RateLimitedScraper<S> {
    /// Sustained `requests_per_second` with bursts up to `burst`.
    /// Zero values are raised to one.
    pub fn new(scraper: S, requests_per_second: u32, burst: u32) -> Self {
        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(per_second).allow_burst(burst);

        Self::with_quota(scraper, quota)
    }

    pub fn with_quota(scraper: S, quota: Quota) -> Self {
        Self {
            inner: scraper,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn wait_for_permit(&self) {
        self.limiter.until_ready().await;
    }
}

#[async_trait]
impl<S: BaseInstagramScraper> BaseInstagramScraper for RateLimitedScraper<S> {
    async fn fetch_profile(&self, username: &str) -> ScrapeResult<Profile> {
        self.wait_for_permit().await;
        self.inner.fetch_profile(username).await
    }

    async fn fetch_posts(&self, username: &str, limit: u32) -> ScrapeResult<ScrapeStream<Post>> {
        self.wait_for_permit().await;
        self.inner.fetch_posts(username, limit).await
    }

    async fn fetch_likers(&self, post: &Post, limit: u32) -> ScrapeResult<ScrapeStream<String>> {
        self.wait_for_permit().await;
        self.inner.fetch_likers(post, limit).await
    }

    async fn fetch_comments(&self, post: &Post, limit: u32) -> ScrapeResult<ScrapeStream<Comment>> {
        self.wait_for_permit().await;
        self.inner.fetch_comments(post, limit).await
    }
}

/// Extension trait for easy rate limiting.
pub trait ScraperExt: BaseInstagramScraper + Sized {
    fn rate_limited(self, requests_per_second: u32, burst: u32) -> RateLimitedScraper<Self> {
        RateLimitedScraper::new(self, requests_per_second, burst)
    }
}

impl<S: BaseInstagramScraper + Sized> ScraperExt for S {}
