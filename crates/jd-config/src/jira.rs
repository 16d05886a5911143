//! Jira connection configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default per-request timeout in seconds.
const fn default_timeout_secs() -> u64 {
    30
}

#[derive(Clone, Deserialize, Serialize)]
pub struct JiraConfig {
    /// Site URL (e.g., `https://example.atlassian.net`).
    #[serde(default)]
    pub url: String,

    /// Account email used for Basic auth.
    #[serde(default)]
    pub email: String,

    /// API token paired with `email`.
    #[serde(default)]
    pub token: String,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            email: String::new(),
            token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraConfig")
            .field("url", &self.url)
            .field("email", &self.email)
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl JiraConfig {
    /// Check if url, email and token are all set.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.email.is_empty() && !self.token.is_empty()
    }

    /// Site URL without trailing slashes.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}
