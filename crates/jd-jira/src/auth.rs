//! Basic-auth header construction.

use base64::Engine as _;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::error::JiraError;

/// `Basic base64(email:token)`.
#[must_use]
pub fn basic_auth_value(email: &str, token: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{email}:{token}"));
    format!("Basic {encoded}")
}

/// Headers carried on every request: JSON in, JSON out, static credential.
pub(crate) fn default_headers(email: &str, token: &str) -> Result<HeaderMap, JiraError> {
    let mut auth = HeaderValue::from_str(&basic_auth_value(email, token))
        .map_err(|e| JiraError::InvalidRequest(format!("authorization header: {e}")))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(AUTHORIZATION, auth);
    Ok(headers)
}
