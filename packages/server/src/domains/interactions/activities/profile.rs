use std::time::Duration;

use tracing::{debug, warn};

use crate::domains::interactions::models::ProfileSummary;
use crate::kernel::{BaseInstagramScraper, Profile, ScrapeResult};

/// Retry schedule for profile lookups. The delay grows linearly with the
/// attempt number.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(800),
        }
    }
}

impl RetryPolicy {
    pub fn no_delay(attempts: u32) -> Self {
        Self {
            attempts,
            backoff: Duration::ZERO,
        }
    }
}

/// Fetch a profile, retrying transient failures.
pub async fn fetch_profile_with_retry(
    scraper: &dyn BaseInstagramScraper,
    username: &str,
    policy: RetryPolicy,
) -> ScrapeResult<Profile> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match scraper.fetch_profile(username).await {
            Ok(profile) => return Ok(profile),
            Err(e) if e.is_retryable() && attempt < attempts => {
                warn!(username = %username, attempt, error = %e, "profile lookup failed, retrying");
                tokio::time::sleep(policy.backoff * attempt).await;
                attempt += 1;
            }
            Err(e) => {
                debug!(username = %username, attempt, error = %e, "profile lookup gave up");
                return Err(e);
            }
        }
    }
}

/// Profile card used by `GET /profile/{username}`.
pub async fn lookup_profile(
    scraper: &dyn BaseInstagramScraper,
    username: &str,
    policy: RetryPolicy,
) -> ScrapeResult<ProfileSummary> {
    let profile = fetch_profile_with_retry(scraper, username, policy).await?;
    Ok(ProfileSummary::from(&profile))
}

/// Follower counts of both users, fetched one after the other.
pub async fn compare_followers(
    scraper: &dyn BaseInstagramScraper,
    user1: &str,
    user2: &str,
    policy: RetryPolicy,
) -> ScrapeResult<(i64, i64)> {
    let first = fetch_profile_with_retry(scraper, user1, policy).await?;
    let second = fetch_profile_with_retry(scraper, user2, policy).await?;
    Ok((first.followers, second.followers))
}
