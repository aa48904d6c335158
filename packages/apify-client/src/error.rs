use thiserror::Error;

/// Errors returned by the Apify client.
#[derive(Debug, Error)]
pub enum ApifyError {
    /// Transport or body decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the API
    #[error("Apify API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Actor run ended in a terminal non-success state
    #[error("actor run ended with status {0}")]
    RunFailed(String),

    /// Run succeeded but produced no matching item
    #[error("actor run returned no results")]
    EmptyDataset,
}

impl ApifyError {
    /// HTTP status of an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApifyError::Api { status, .. } => Some(*status),
            ApifyError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApifyError>;
