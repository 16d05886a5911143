//! Jira client error types.

use thiserror::Error;

/// Errors that can occur when talking to the Jira REST API.
#[derive(Debug, Error)]
pub enum JiraError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Jira returned an unexpected status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by Jira.
        status: u16,
        /// Response body.
        message: String,
    },

    /// A response body was not the JSON the endpoint returns.
    #[error("parse error: {0}")]
    Parse(String),

    /// Jira returned 429 Too Many Requests.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// The client could not be built or a header value was invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl JiraError {
    /// HTTP status associated with the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Parse(_) | Self::InvalidRequest(_) => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }
}
