//! How much of a profile a run is allowed to fetch.

use serde::Serialize;

use super::request::AnalysisParams;

/// Post cap in the fast tier.
pub const FAST_POST_CAP: u32 = 5;

/// Hard ceiling on posts scanned when fetching everything.
pub const FETCH_ALL_POST_CEILING: u32 = 500;

const FAST_LIKER_CEILING: u32 = 5;
const FULL_LIKER_CEILING: u32 = 500;
const FAST_COMMENT_CEILING: u32 = 3;
const FULL_COMMENT_CEILING: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "limit", rename_all = "snake_case")]
pub enum PostLimit {
    Capped(u32),
    Unbounded,
}

impl PostLimit {
    /// Number of posts actually requested from the scraper.
    pub fn ceiling(&self) -> u32 {
        match self {
            PostLimit::Capped(n) => *n,
            PostLimit::Unbounded => FETCH_ALL_POST_CEILING,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FetchScope {
    pub credentialed: bool,
    pub fetch_all: bool,
    pub post_limit: PostLimit,
    /// Likers sampled per post
    pub liker_ceiling: u32,
    /// Comments sampled per post
    pub comment_ceiling: u32,
}

impl FetchScope {
    /// The operator always gets a full, credentialed run regardless of what
    /// the request asked for.
    pub fn resolve(params: &AnalysisParams, operator_username: Option<&str>) -> Self {
        let is_operator = operator_username.is_some_and(|op| op == params.user1);
        let credentialed = params.use_credentials || is_operator;
        let fetch_all = params.fetch_all_posts || is_operator;

        if fetch_all {
            Self {
                credentialed,
                fetch_all,
                post_limit: PostLimit::Unbounded,
                liker_ceiling: FULL_LIKER_CEILING,
                comment_ceiling: FULL_COMMENT_CEILING,
            }
        } else {
            Self {
                credentialed,
                fetch_all,
                post_limit: PostLimit::Capped(params.max_posts.min(FAST_POST_CAP)),
                liker_ceiling: FAST_LIKER_CEILING,
                comment_ceiling: FAST_COMMENT_CEILING,
            }
        }
    }
}
