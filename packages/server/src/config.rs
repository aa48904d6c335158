use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Prefix used when building `check_status` links
    pub public_base_url: String,
    /// Username that always gets full, credentialed analysis
    pub operator_username: Option<String>,
    pub apify_api_token: String,
    pub apify_operator_token: Option<String>,
    pub apify_likers_actor: Option<String>,
    pub scraper_requests_per_second: u32,
    pub scraper_burst: u32,
    pub max_concurrent_analyses: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let port: u16 = env::var("API_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .context("API_PORT must be a valid number")?;

        Ok(Self {
            host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            public_base_url: non_empty_var("PUBLIC_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}", port)),
            operator_username: non_empty_var("INSTAGRAM_USERNAME"),
            apify_api_token: env::var("APIFY_API_TOKEN").context("APIFY_API_TOKEN must be set")?,
            apify_operator_token: non_empty_var("APIFY_OPERATOR_TOKEN"),
            apify_likers_actor: non_empty_var("APIFY_LIKERS_ACTOR"),
            scraper_requests_per_second: parse_var("SCRAPER_REQUESTS_PER_SECOND", 2)?,
            scraper_burst: parse_var("SCRAPER_BURST", 5)?,
            max_concurrent_analyses: parse_var("MAX_CONCURRENT_ANALYSES", 8)?,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a positive number, falling back to `default` when unset.
fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(raw) = non_empty_var(key) else {
        return Ok(default);
    };
    let value: T = raw
        .parse()
        .map_err(|_| anyhow::anyhow!("{} must be a valid number", key))?;
    if value <= T::default() {
        anyhow::bail!("{} must be greater than zero", key);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Keys are unique per test so parallel tests don't race on the environment.

    #[test]
    fn parse_var_uses_default_when_unset() {
        let value: u32 = parse_var("ANALYZER_TEST_UNSET_KEY", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn parse_var_rejects_zero() {
        env::set_var("ANALYZER_TEST_ZERO_KEY", "0");
        let result: Result<u32> = parse_var("ANALYZER_TEST_ZERO_KEY", 7);
        assert!(result.is_err());
    }

    #[test]
    fn parse_var_rejects_garbage() {
        env::set_var("ANALYZER_TEST_GARBAGE_KEY", "many");
        let result: Result<usize> = parse_var("ANALYZER_TEST_GARBAGE_KEY", 7);
        assert!(result.is_err());
    }

    #[test]
    fn non_empty_var_treats_blank_as_unset() {
        env::set_var("ANALYZER_TEST_BLANK_KEY", "   ");
        assert!(non_empty_var("ANALYZER_TEST_BLANK_KEY").is_none());
    }
}
