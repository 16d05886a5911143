//! Issue search.

use jd_core::{CandidateIssue, IssueQuery};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{JiraClient, error::JiraError, http::{check_response, decode_json}};

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<RawIssue>,
}

#[derive(Deserialize)]
struct RawIssue {
    id: String,
    key: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl JiraClient {
    pub(crate) async fn search_issues(
        &self,
        query: &IssueQuery,
        start_at: usize,
        max_results: usize,
    ) -> Result<Vec<CandidateIssue>, JiraError> {
        let url = self.endpoint("/rest/api/3/search");
        let body = serde_json::json!({
            "jql": query.jql(),
            "startAt": start_at,
            "maxResults": max_results,
            "fields": ["issuetype", query.field_id],
        });
        let resp = check_response(self.http.post(&url).json(&body).send().await?).await?;

        let data: SearchResponse = decode_json(resp).await?;
        Ok(data
            .issues
            .into_iter()
            .map(|raw| into_candidate(raw, &query.field_id))
            .collect())
    }
}

fn into_candidate(raw: RawIssue, field_id: &str) -> CandidateIssue {
    let issue_type = raw
        .fields
        .get("issuetype")
        .and_then(|t| t.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string();
    CandidateIssue {
        id: raw.id,
        key: raw.key,
        issue_type,
        current_value: raw.fields.get(field_id).and_then(display_value),
    }
}

/// Human-readable value of a field as Jira renders it in search results.
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map
            .get("value")
            .or_else(|| map.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(display_value).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
    }
}
