//! Interaction analysis: how often `user1` shows up in the likes and comments
//! of `user2`'s recent posts.

use std::time::Instant;

use anyhow::{Context, Result};
use futures::{StreamExt, TryStreamExt};
use tracing::{debug, info};

use super::profile::{fetch_profile_with_retry, RetryPolicy};
use crate::domains::interactions::models::{
    post_date, truncate_chars, CommentSample, FetchScope, InteractionReport, InteractionTally,
    ProfileSummary, RecentPost, User1Comment, COMMENT_TEXT_LIMIT,
};
use crate::kernel::tasks::ProgressReporter;
use crate::kernel::{BaseInstagramScraper, Comment, Post, ScrapeResult};

pub async fn analyze_interactions(
    scraper: &dyn BaseInstagramScraper,
    user1: &str,
    user2: &str,
    scope: &FetchScope,
    retry: RetryPolicy,
    progress: &ProgressReporter,
) -> Result<InteractionReport> {
    let started = Instant::now();
    info!(
        task_id = %progress.task_id(),
        user1 = %user1,
        user2 = %user2,
        fetch_all = scope.fetch_all,
        credentialed = scope.credentialed,
        "starting interaction analysis"
    );

    let profile = fetch_profile_with_retry(scraper, user2, retry)
        .await
        .with_context(|| format!("could not fetch profile for {}", user2))?;

    let mut tally = InteractionTally::default();
    scan_recent_posts(scraper, user1, user2, scope, progress, &mut tally).await;

    let analysis_time = started.elapsed().as_secs_f64();
    info!(
        task_id = %progress.task_id(),
        posts_checked = tally.posts_checked,
        likes = tally.user1_likes_found,
        comments = tally.user1_comments_found,
        sampling_errors = tally.sampling_errors,
        analysis_time,
        "interaction analysis finished"
    );

    Ok(InteractionReport::success(
        user1,
        user2,
        ProfileSummary::from(&profile),
        tally,
        analysis_time,
    ))
}

async fn scan_recent_posts(
    scraper: &dyn BaseInstagramScraper,
    user1: &str,
    user2: &str,
    scope: &FetchScope,
    progress: &ProgressReporter,
    tally: &mut InteractionTally,
) {
    let ceiling = scope.post_limit.ceiling();
    if ceiling == 0 {
        return;
    }

    let mut posts = match scraper.fetch_posts(user2, ceiling).await {
        Ok(posts) => posts.take(ceiling as usize),
        Err(e) => {
            debug!(user2 = %user2, error = %e, "could not list posts");
            tally.sampling_errors += 1;
            return;
        }
    };

    while let Some(item) = posts.next().await {
        let post = match item {
            Ok(post) => post,
            Err(e) => {
                debug!(user2 = %user2, error = %e, "post stream ended early");
                tally.sampling_errors += 1;
                break;
            }
        };

        scan_post(scraper, &post, user1, scope, tally).await;
        progress.report_snapshot(tally).await;
    }
}

async fn scan_post(
    scraper: &dyn BaseInstagramScraper,
    post: &Post,
    user1: &str,
    scope: &FetchScope,
    tally: &mut InteractionTally,
) {
    let likers = match sample_likers(scraper, post, scope.liker_ceiling).await {
        Ok(likers) => likers,
        Err(e) => {
            debug!(post_id = %post.id, error = %e, "liker sample skipped");
            tally.sampling_errors += 1;
            Vec::new()
        }
    };

    let comments = match sample_comments(scraper, post, scope.comment_ceiling).await {
        Ok(comments) => comments,
        Err(e) => {
            debug!(post_id = %post.id, error = %e, "comment sample skipped");
            tally.sampling_errors += 1;
            Vec::new()
        }
    };

    let user1_comment = comments
        .iter()
        .find(|c| c.owner_username.as_deref() == Some(user1))
        .map(|c| User1Comment {
            text: truncate_chars(&c.text, COMMENT_TEXT_LIMIT),
            post_date: post_date(&post.taken_at),
        });

    let samples = comments.iter().map(CommentSample::from).collect();
    let entry = RecentPost::new(post, likers, samples, user1);
    tally.record_post(entry, user1_comment);
}

async fn sample_likers(
    scraper: &dyn BaseInstagramScraper,
    post: &Post,
    ceiling: u32,
) -> ScrapeResult<Vec<String>> {
    if post.likes <= 0 || ceiling == 0 {
        return Ok(Vec::new());
    }
    scraper
        .fetch_likers(post, ceiling)
        .await?
        .take(ceiling as usize)
        .try_collect()
        .await
}

async fn sample_comments(
    scraper: &dyn BaseInstagramScraper,
    post: &Post,
    ceiling: u32,
) -> ScrapeResult<Vec<Comment>> {
    if post.comments <= 0 || ceiling == 0 {
        return Ok(Vec::new());
    }
    scraper
        .fetch_comments(post, ceiling)
        .await?
        .take(ceiling as usize)
        .try_collect()
        .await
}
