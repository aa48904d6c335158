//! Kernel module - server infrastructure and dependencies.

pub mod apify_scraper;
pub mod deps;
pub mod rate_limited;
pub mod tasks;
pub mod test_dependencies;
pub mod traits;

pub use apify_scraper::ApifyScraper;
pub use deps::ServerDeps;
pub use rate_limited::{RateLimitedScraper, ScraperExt};
pub use test_dependencies::MockInstagramScraper;
pub use traits::*;
