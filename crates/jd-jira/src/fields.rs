//! Field list and select-field options.

use jd_core::{FieldMetadata, FieldOption};
use serde::Deserialize;

use crate::{JiraClient, error::JiraError, http::{check_response, decode_json}};

#[derive(Deserialize)]
struct OptionsResponse {
    #[serde(default)]
    values: Vec<FieldOption>,
}

/// Numeric part of `customfield_N`; the options endpoint takes only that.
fn option_endpoint_id(field_id: &str) -> &str {
    field_id.strip_prefix("customfield_").unwrap_or(field_id)
}

impl JiraClient {
    pub(crate) async fn get_fields(&self) -> Result<Vec<FieldMetadata>, JiraError> {
        let url = self.endpoint("/rest/api/3/field");
        let resp = check_response(self.http.get(&url).send().await?).await?;
        decode_json(resp).await
    }

    pub(crate) async fn get_field_options(
        &self,
        field_id: &str,
    ) -> Result<Vec<FieldOption>, JiraError> {
        let url = self.endpoint(&format!(
            "/rest/api/3/customField/{}/option",
            urlencoding::encode(option_endpoint_id(field_id))
        ));
        let resp = check_response(self.http.get(&url).send().await?).await?;

        let data: OptionsResponse = decode_json(resp).await?;
        tracing::debug!(field_id, count = data.values.len(), "fetched field options");
        Ok(data.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_endpoint_strips_prefix() {
        assert_eq!(option_endpoint_id("customfield_10050"), "10050");
        assert_eq!(option_endpoint_id("10050"), "10050");
    }

    #[test]
    fn parse_options_response() {
        let data: OptionsResponse = serde_json::from_str(
            r#"{
                "maxResults": 50,
                "startAt": 0,
                "total": 2,
                "isLast": true,
                "values": [
                    {"id": "10021", "value": "Platform", "disabled": false},
                    {"id": 10022, "value": "Infra"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(data.values.len(), 2);
        assert_eq!(data.values[0].value, "Platform");
        assert_eq!(data.values[1].id.as_str(), "10022");
    }

    #[test]
    fn parse_field_list() {
        let fields: Vec<FieldMetadata> = serde_json::from_str(
            r#"[
                {"id": "summary", "name": "Summary", "custom": false},
                {"id": "customfield_10050", "name": "LOB", "custom": true, "schema": {"type": "option"}}
            ]"#,
        )
        .unwrap();
        assert_eq!(fields.len(), 2);
        assert!(fields[1].custom);
    }
}
