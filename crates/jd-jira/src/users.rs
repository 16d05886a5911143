//! Current-user lookup, used as the authentication check.

use serde::Deserialize;

use crate::{JiraClient, error::JiraError, http::{check_response, decode_json}};

/// The authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl UserInfo {
    /// Display name, or `unknown user` when Jira omits it.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or("unknown user")
    }
}

impl JiraClient {
    pub(crate) async fn get_myself(&self) -> Result<UserInfo, JiraError> {
        let url = self.endpoint("/rest/api/3/myself");
        let resp = check_response(self.http.get(&url).send().await?).await?;
        decode_json(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_myself_response() {
        let user: UserInfo = serde_json::from_str(
            r#"{"accountId": "5b10a2844c20165700ede21g", "displayName": "Mia Krystof", "active": true}"#,
        )
        .unwrap();
        assert_eq!(user.display_name(), "Mia Krystof");
    }

    #[test]
    fn missing_display_name_falls_back() {
        let user: UserInfo = serde_json::from_str(r#"{"accountId": "x"}"#).unwrap();
        assert_eq!(user.display_name(), "unknown user");
    }
}
