use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::kernel::{Comment, Post, Profile};

pub const COMMENT_TEXT_LIMIT: usize = 500;
pub const CAPTION_LIMIT: usize = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub username: String,
    pub full_name: String,
    pub biography: String,
    pub profile_pic_url: String,
    pub is_private: bool,
    pub followers: i64,
    pub following: i64,
    pub total_posts: i64,
}

impl From<&Profile> for ProfileSummary {
    fn from(profile: &Profile) -> Self {
        Self {
            username: profile.username.clone(),
            full_name: profile.full_name.clone(),
            biography: profile.biography.clone(),
            profile_pic_url: profile.profile_pic_url.clone(),
            is_private: profile.is_private,
            followers: profile.followers,
            following: profile.following,
            total_posts: profile.post_count,
        }
    }
}

/// A comment `user1` left on one of the scanned posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User1Comment {
    pub text: String,
    pub post_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentSample {
    pub username: Option<String>,
    pub text: String,
}

impl From<&Comment> for CommentSample {
    fn from(comment: &Comment) -> Self {
        Self {
            username: comment.owner_username.clone(),
            text: truncate_chars(&comment.text, COMMENT_TEXT_LIMIT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentPost {
    /// `YYYY-MM-DD`
    pub post_date: String,
    /// RFC 3339
    pub timestamp: String,
    pub epoch: i64,
    pub likes: i64,
    pub comments: i64,
    pub sample_likes: Vec<String>,
    pub sample_comments: Vec<CommentSample>,
    pub caption: String,
    pub url: String,
    pub post_link: String,
    pub user1_liked: bool,
    pub user1_commented: bool,
}

impl RecentPost {
    pub fn new(
        post: &Post,
        sample_likes: Vec<String>,
        sample_comments: Vec<CommentSample>,
        user1: &str,
    ) -> Self {
        let user1_liked = sample_likes.iter().any(|u| u == user1);
        let user1_commented = sample_comments
            .iter()
            .any(|c| c.username.as_deref() == Some(user1));

        Self {
            post_date: post_date(&post.taken_at),
            timestamp: post.taken_at.to_rfc3339(),
            epoch: post.taken_at.timestamp(),
            likes: post.likes,
            comments: post.comments,
            sample_likes,
            sample_comments,
            caption: truncate_chars(&post.caption, CAPTION_LIMIT),
            url: post.url.clone(),
            post_link: post_link(post),
            user1_liked,
            user1_commented,
        }
    }
}

/// Running aggregate, reported as task progress after every post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionTally {
    pub posts_checked: u32,
    pub user1_likes_found: u32,
    pub user1_comments_found: u32,
    pub user1_comments: Vec<User1Comment>,
    pub analysis_scope: String,
    pub recent_posts: Vec<RecentPost>,
    pub sampling_errors: u32,
}

impl InteractionTally {
    /// Fold one scanned post into the aggregate.
    pub fn record_post(&mut self, entry: RecentPost, user1_comment: Option<User1Comment>) {
        self.posts_checked += 1;
        if entry.user1_liked {
            self.user1_likes_found += 1;
        }
        if let Some(comment) = user1_comment {
            self.user1_comments.push(comment);
            self.user1_comments_found = self.user1_comments.len() as u32;
        }
        self.recent_posts.push(entry);
        self.analysis_scope = scope_description(self.posts_checked);
    }
}

/// The `result` payload of a completed analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionReport {
    pub user1: String,
    pub user2: String,
    pub profile: ProfileSummary,
    #[serde(flatten)]
    pub tally: InteractionTally,
    /// Seconds
    pub analysis_time: f64,
    pub status: String,
    pub message: String,
}

impl InteractionReport {
    pub fn success(
        user1: &str,
        user2: &str,
        profile: ProfileSummary,
        mut tally: InteractionTally,
        analysis_time: f64,
    ) -> Self {
        tally.analysis_scope = scope_description(tally.posts_checked);
        Self {
            user1: user1.to_string(),
            user2: user2.to_string(),
            profile,
            tally,
            analysis_time,
            status: "success".to_string(),
            message: "Fast analysis completed".to_string(),
        }
    }
}

pub fn post_date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

pub fn post_link(post: &Post) -> String {
    match post.short_code.as_deref() {
        Some(code) if !code.is_empty() => format!("https://www.instagram.com/p/{}/", code),
        _ => post.url.clone(),
    }
}

pub fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

fn scope_description(posts_checked: u32) -> String {
    format!("Checked {} most recent posts quickly", posts_checked)
}
