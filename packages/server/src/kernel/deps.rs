//! Server dependencies for handlers and background tasks (using traits for testability)
//!
//! This module provides the central dependency container shared by the HTTP
//! layer and the task runner. The scraper is a trait object so tests can
//! swap in `MockInstagramScraper`.

use apify_client::ApifyClient;
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::kernel::apify_scraper::ApifyScraper;
use crate::kernel::rate_limited::ScraperExt;
use crate::kernel::tasks::{MemoryTaskStore, TaskRunner, TaskStore};
use crate::kernel::BaseInstagramScraper;

/// Server dependencies accessible to handlers and tasks
#[derive(Clone)]
pub struct ServerDeps {
    /// Anonymous scraper used unless credentialed mode is requested
    pub scraper: Arc<dyn BaseInstagramScraper>,
    /// Scraper running on the operator's own account (optional)
    pub operator_scraper: Option<Arc<dyn BaseInstagramScraper>>,
    pub task_store: Arc<dyn TaskStore>,
    pub task_runner: TaskRunner,
    /// Username that always gets full, credentialed analysis
    pub operator_username: Option<String>,
    /// Prefix for `check_status` links
    pub public_base_url: String,
}

impl ServerDeps {
    pub fn new(
        scraper: Arc<dyn BaseInstagramScraper>,
        operator_scraper: Option<Arc<dyn BaseInstagramScraper>>,
        task_store: Arc<dyn TaskStore>,
        max_concurrent_analyses: usize,
        operator_username: Option<String>,
        public_base_url: String,
    ) -> Self {
        let task_runner = TaskRunner::new(task_store.clone(), max_concurrent_analyses);
        Self {
            scraper,
            operator_scraper,
            task_store,
            task_runner,
            operator_username,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Production wiring: rate-limited Apify scrapers and an in-memory task store.
    pub fn from_config(config: &Config) -> Self {
        let build_scraper = |token: &str| -> Arc<dyn BaseInstagramScraper> {
            let apify = Arc::new(ApifyClient::new(token.to_string()));
            Arc::new(
                ApifyScraper::new(apify, config.apify_likers_actor.clone())
                    .rate_limited(config.scraper_requests_per_second, config.scraper_burst),
            )
        };

        let scraper = build_scraper(&config.apify_api_token);
        let operator_scraper = config.apify_operator_token.as_deref().map(build_scraper);

        Self::new(
            scraper,
            operator_scraper,
            Arc::new(MemoryTaskStore::new()),
            config.max_concurrent_analyses,
            config.operator_username.clone(),
            config.public_base_url.clone(),
        )
    }

    /// Pick the scraper for a run. Credentialed mode falls back to the
    /// anonymous scraper when no operator account is configured.
    pub fn scraper_for(&self, credentialed: bool) -> Arc<dyn BaseInstagramScraper> {
        match (&self.operator_scraper, credentialed) {
            (Some(operator), true) => operator.clone(),
            (None, true) => {
                debug!("credentialed scraping unavailable, continuing without credentials");
                self.scraper.clone()
            }
            (_, false) => self.scraper.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::MockInstagramScraper;

    fn deps(operator_scraper: bool) -> ServerDeps {
        let anonymous = Arc::new(
            MockInstagramScraper::new().with_profile(MockInstagramScraper::profile("anon", 1)),
        );
        let operator: Option<Arc<dyn BaseInstagramScraper>> = operator_scraper.then(|| {
            Arc::new(MockInstagramScraper::new().with_profile(MockInstagramScraper::profile("op", 2)))
                as Arc<dyn BaseInstagramScraper>
        });

        ServerDeps::new(
            anonymous,
            operator,
            Arc::new(MemoryTaskStore::new()),
            2,
            Some("boss".into()),
            "http://localhost:8000/".into(),
        )
    }

    #[tokio::test]
    async fn credentialed_uses_operator_scraper_when_available() {
        let deps = deps(true);
        assert!(deps.scraper_for(true).fetch_profile("op").await.is_ok());
        assert!(deps.scraper_for(false).fetch_profile("anon").await.is_ok());
    }

    #[tokio::test]
    async fn credentialed_falls_back_to_anonymous() {
        let deps = deps(false);
        assert!(deps.scraper_for(true).fetch_profile("anon").await.is_ok());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        assert_eq!(deps(false).public_base_url, "http://localhost:8000");
    }
}
