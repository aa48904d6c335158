//! Instagram scraper backed by Apify actors.

use std::sync::Arc;

use apify_client::{ApifyClient, ApifyError, InstagramPost, InstagramProfile};
use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::debug;

use super::traits::{
    BaseInstagramScraper, Comment, Post, Profile, ScrapeError, ScrapeResult, ScrapeStream,
};

/// Wrapper around ApifyClient that implements BaseInstagramScraper
pub struct ApifyScraper {
    apify: Arc<ApifyClient>,
    likers_actor: Option<String>,
}

impl ApifyScraper {
    pub fn new(apify: Arc<ApifyClient>, likers_actor: Option<String>) -> Self {
        Self {
            apify,
            likers_actor,
        }
    }
}

#[async_trait]
impl BaseInstagramScraper for ApifyScraper {
    async fn fetch_profile(&self, username: &str) -> ScrapeResult<Profile> {
        let profile = self
            .apify
            .scrape_instagram_profile(username)
            .await
            .map_err(|e| map_apify_error(e, username))?;
        Ok(profile_from_apify(profile))
    }

    async fn fetch_posts(&self, username: &str, limit: u32) -> ScrapeResult<ScrapeStream<Post>> {
        let posts = self
            .apify
            .scrape_instagram_posts(username, limit)
            .await
            .map_err(|e| map_apify_error(e, username))?;

        Ok(stream::iter(posts.into_iter().map(|p| Ok(post_from_apify(p)))).boxed())
    }

    async fn fetch_likers(&self, post: &Post, limit: u32) -> ScrapeResult<ScrapeStream<String>> {
        let Some(actor) = self.likers_actor.as_deref() else {
            return Err(ScrapeError::Unavailable(
                "no liker actor configured (APIFY_LIKERS_ACTOR)".into(),
            ));
        };

        let likers = self
            .apify
            .scrape_instagram_likers(actor, &post.url, limit)
            .await
            .map_err(|e| map_apify_error(e, &post.url))?;
        debug!(post_url = %post.url, count = likers.len(), "Fetched likers");

        Ok(stream::iter(likers.into_iter().filter_map(|l| l.username).map(Ok)).boxed())
    }

    async fn fetch_comments(&self, post: &Post, limit: u32) -> ScrapeResult<ScrapeStream<Comment>> {
        let comments = self
            .apify
            .scrape_instagram_comments(&post.url, limit)
            .await
            .map_err(|e| map_apify_error(e, &post.url))?;
        debug!(post_url = %post.url, count = comments.len(), "Fetched comments");

        Ok(stream::iter(comments.into_iter().map(|c| {
            Ok(Comment {
                owner_username: c.owner_username,
                text: c.text.unwrap_or_default(),
                created_at: c.timestamp,
            })
        }))
        .boxed())
    }
}

fn map_apify_error(error: ApifyError, subject: &str) -> ScrapeError {
    match (&error, error.status()) {
        (ApifyError::EmptyDataset, _) => ScrapeError::NotFound {
            username: subject.to_string(),
        },
        (_, Some(401 | 403)) => ScrapeError::Unauthorized(error.to_string()),
        (_, Some(429)) => ScrapeError::RateLimited,
        _ => ScrapeError::Upstream(error.to_string()),
    }
}

fn profile_from_apify(p: InstagramProfile) -> Profile {
    Profile {
        username: p.username,
        full_name: p.full_name.unwrap_or_default(),
        biography: p.biography.unwrap_or_default(),
        profile_pic_url: p.profile_pic_url.unwrap_or_default(),
        is_private: p.private,
        is_verified: p.verified,
        followers: p.followers_count.unwrap_or(0),
        following: p.follows_count.unwrap_or(0),
        post_count: p.posts_count.unwrap_or(0),
    }
}

fn post_from_apify(p: InstagramPost) -> Post {
    Post {
        id: p
            .id
            .or_else(|| p.short_code.clone())
            .unwrap_or_else(|| p.url.clone()),
        short_code: p.short_code,
        url: p.url,
        caption: p.caption.unwrap_or_default(),
        likes: p.likes_count.unwrap_or(0),
        comments: p.comments_count.unwrap_or(0),
        taken_at: p.timestamp.unwrap_or_else(Utc::now),
    }
}
