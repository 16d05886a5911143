//! Single-issue field edits.

use jd_core::FieldOption;
use serde_json::{Value, json};

use crate::{JiraClient, error::JiraError, http::expect_no_content};

/// `{"fields": {field_id: {"id": option_id, "value": option_value}}}`.
fn edit_body(field_id: &str, option: &FieldOption) -> Value {
    let mut fields = serde_json::Map::new();
    fields.insert(
        field_id.to_string(),
        json!({ "id": option.id.as_str(), "value": option.value }),
    );
    json!({ "fields": fields })
}

impl JiraClient {
    pub(crate) async fn put_issue_option(
        &self,
        issue_id: &str,
        field_id: &str,
        option: &FieldOption,
    ) -> Result<(), JiraError> {
        let url = self.endpoint(&format!(
            "/rest/api/3/issue/{}",
            urlencoding::encode(issue_id)
        ));
        let body = edit_body(field_id, option);
        tracing::debug!(issue_id, %body, "updating issue");
        expect_no_content(self.http.put(&url).json(&body).send().await?).await
    }
}
