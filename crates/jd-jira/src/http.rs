//! Shared HTTP response helpers for the Jira client.
//!
//! Centralizes status-code checks (429 rate limiting with `Retry-After`
//! parsing, non-success → [`JiraError::Api`]) and body decoding so endpoint
//! modules stay focused on request construction and response mapping.

use serde::de::DeserializeOwned;

use crate::error::JiraError;

/// Check an HTTP response for common error conditions.
///
/// Returns the response unchanged on any 2xx status. Handles:
/// - **429 Too Many Requests** → [`JiraError::RateLimited`] with
///   `Retry-After` header parsing (falls back to 60 s if absent or
///   unparseable).
/// - **Non-success status** → [`JiraError::Api`] with status code and
///   response body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, JiraError> {
    if resp.status() == 429 {
        let retry_after = parse_retry_after(&resp);
        return Err(JiraError::RateLimited {
            retry_after_secs: retry_after,
        });
    }
    if !resp.status().is_success() {
        return Err(api_error(resp).await);
    }
    Ok(resp)
}

/// Accept only `204 No Content`.
///
/// Issue edits report success exclusively this way; a 200 with a body is
/// treated as a rejection and its body kept for diagnostics.
pub async fn expect_no_content(resp: reqwest::Response) -> Result<(), JiraError> {
    if resp.status() == 204 {
        return Ok(());
    }
    if resp.status() == 429 {
        return Err(JiraError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }
    Err(api_error(resp).await)
}

/// Read the body and decode it as JSON.
///
/// A failure reading the body stays [`JiraError::Http`]; a body that is not
/// the expected JSON becomes [`JiraError::Parse`].
pub async fn decode_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, JiraError> {
    let body = resp.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| JiraError::Parse(e.to_string()))
}

async fn api_error(resp: reqwest::Response) -> JiraError {
    JiraError::Api {
        status: resp.status().as_u16(),
        message: resp.text().await.unwrap_or_default(),
    }
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_response(status: u16, body: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body.to_string())
                .unwrap(),
        )
    }

    fn mock_response_with_retry_after(status: u16, value: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .header("Retry-After", value)
                .body(String::new())
                .unwrap(),
        )
    }

    #[test]
    fn parse_retry_after_from_header() {
        let resp = mock_response_with_retry_after(429, "120");
        assert_eq!(parse_retry_after(&resp), 120);
    }

    #[test]
    fn parse_retry_after_non_numeric() {
        let resp = mock_response_with_retry_after(429, "soon");
        assert_eq!(parse_retry_after(&resp), 60);
    }

    #[tokio::test]
    async fn check_response_rate_limited() {
        let resp = mock_response_with_retry_after(429, "30");
        let err = check_response(resp).await.unwrap_err();
        assert!(matches!(
            err,
            JiraError::RateLimited {
                retry_after_secs: 30
            }
        ));
    }

    #[tokio::test]
    async fn check_response_api_error_keeps_body() {
        let resp = mock_response(401, "Unauthorized");
        let err = check_response(resp).await.unwrap_err();
        match err {
            JiraError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Unauthorized");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn check_response_success() {
        assert!(check_response(mock_response(200, "{}")).await.is_ok());
        assert!(check_response(mock_response(201, "{}")).await.is_ok());
    }

    #[tokio::test]
    async fn no_content_is_the_only_edit_success() {
        assert!(expect_no_content(mock_response(204, "")).await.is_ok());

        let err = expect_no_content(mock_response(200, r#"{"ok":true}"#))
            .await
            .unwrap_err();
        assert!(
            matches!(err, JiraError::Api { status: 200, ref message } if message.contains("ok"))
        );

        let err = expect_no_content(mock_response(400, "field cannot be set"))
            .await
            .unwrap_err();
        assert!(matches!(err, JiraError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let resp = check_response(mock_response(200, "not json")).await.unwrap();
        let err = decode_json::<serde_json::Value>(resp).await.unwrap_err();
        assert!(matches!(err, JiraError::Parse(ref msg) if msg.starts_with("expected ident")));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn truncated_body_is_a_parse_error() {
        let err = decode_json::<serde_json::Value>(mock_response(200, r#"{"issues": ["#))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("parse error: EOF while parsing a list"));
    }

    #[tokio::test]
    async fn well_formed_body_decodes() {
        let value: serde_json::Value = decode_json(mock_response(200, r#"{"ok": true}"#))
            .await
            .unwrap();
        assert_eq!(value["ok"], true);
    }
}
