use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub const DEFAULT_MAX_POSTS: i64 = 100;
pub const DEFAULT_MAX_STORIES: i64 = 50;

/// Upper bound applied to `max_posts` at submission.
pub const MAX_POSTS_LIMIT: u32 = 20;
/// Upper bound applied to `max_stories` at submission.
pub const MAX_STORIES_LIMIT: u32 = 5;

/// Body of `POST /analyze` as sent by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub user1: String,
    #[serde(default)]
    pub user2: String,
    #[serde(default)]
    pub use_credentials: bool,
    #[serde(default = "default_max_posts", deserialize_with = "saturating_count")]
    pub max_posts: i64,
    #[serde(default = "default_max_stories", deserialize_with = "saturating_count")]
    pub max_stories: i64,
    #[serde(default)]
    pub fetch_all_posts: bool,
}

fn default_max_posts() -> i64 {
    DEFAULT_MAX_POSTS
}

fn default_max_stories() -> i64 {
    DEFAULT_MAX_STORIES
}

/// Accept any JSON integer, including ones written as `999.0` or too large
/// for `i64`. Out-of-range values saturate; the caps are clamped afterwards.
fn saturating_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    if number.as_u64().is_some() {
        return Ok(i64::MAX);
    }
    match number.as_f64() {
        // `as` saturates at the i64 bounds
        Some(f) if f.fract() == 0.0 => Ok(f as i64),
        _ => Err(D::Error::custom(format!("expected an integer, got {}", number))),
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Both usernames are required")]
    MissingUsername,
}

/// Validated, clamped parameters. This is what gets stored on the task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub user1: String,
    pub user2: String,
    pub use_credentials: bool,
    pub max_posts: u32,
    pub max_stories: u32,
    pub fetch_all_posts: bool,
}

impl AnalyzeRequest {
    /// Trim usernames, reject empty ones and clamp the numeric caps.
    pub fn validate(self) -> Result<AnalysisParams, ValidationError> {
        let user1 = self.user1.trim();
        let user2 = self.user2.trim();
        if user1.is_empty() || user2.is_empty() {
            return Err(ValidationError::MissingUsername);
        }

        Ok(AnalysisParams {
            user1: user1.to_string(),
            user2: user2.to_string(),
            use_credentials: self.use_credentials,
            max_posts: clamp_cap(self.max_posts, MAX_POSTS_LIMIT),
            max_stories: clamp_cap(self.max_stories, MAX_STORIES_LIMIT),
            fetch_all_posts: self.fetch_all_posts,
        })
    }
}

fn clamp_cap(requested: i64, limit: u32) -> u32 {
    requested.clamp(0, limit as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: serde_json::Value) -> AnalyzeRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn defaults_are_clamped() {
        let params = parse(json!({"user1": "a", "user2": "b"})).validate().unwrap();
        assert_eq!(params.max_posts, 20);
        assert_eq!(params.max_stories, 5);
        assert!(!params.use_credentials);
        assert!(!params.fetch_all_posts);
    }

    #[test]
    fn oversized_caps_are_clamped() {
        let params = parse(json!({"user1": "a", "user2": "b", "max_posts": 999, "max_stories": 999}))
            .validate()
            .unwrap();
        assert_eq!(params.max_posts, 20);
        assert_eq!(params.max_stories, 5);
    }

    #[test]
    fn integral_floats_and_huge_numbers_are_clamped() {
        let params = parse(json!({"user1": "a", "user2": "b", "max_posts": 999.0, "max_stories": 2.0}))
            .validate()
            .unwrap();
        assert_eq!(params.max_posts, 20);
        assert_eq!(params.max_stories, 2);

        let huge: AnalyzeRequest = serde_json::from_str(
            r#"{"user1": "a", "user2": "b", "max_posts": 100000000000000000000, "max_stories": 18446744073709551615}"#,
        )
        .unwrap();
        assert_eq!(huge.max_posts, i64::MAX);
        assert_eq!(huge.max_stories, i64::MAX);
        let params = huge.validate().unwrap();
        assert_eq!((params.max_posts, params.max_stories), (20, 5));
    }

    #[test]
    fn fractional_caps_are_rejected() {
        let result: Result<AnalyzeRequest, _> =
            serde_json::from_value(json!({"user1": "a", "user2": "b", "max_posts": 3.5}));
        assert!(result.is_err());
    }

    #[test]
    fn small_and_negative_caps() {
        let params = parse(json!({"user1": "a", "user2": "b", "max_posts": 3, "max_stories": -4}))
            .validate()
            .unwrap();
        assert_eq!(params.max_posts, 3);
        assert_eq!(params.max_stories, 0);
    }

    #[test]
    fn usernames_are_trimmed() {
        let params = parse(json!({"user1": "  alice ", "user2": "\tbob\n"}))
            .validate()
            .unwrap();
        assert_eq!(params.user1, "alice");
        assert_eq!(params.user2, "bob");
    }

    #[test]
    fn missing_or_blank_usernames_are_rejected() {
        for body in [
            json!({"user2": "b"}),
            json!({"user1": "a"}),
            json!({"user1": "", "user2": "b"}),
            json!({"user1": "a", "user2": "   "}),
        ] {
            assert_eq!(parse(body).validate(), Err(ValidationError::MissingUsername));
        }
    }
}
