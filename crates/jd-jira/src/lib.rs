//! # jd-jira
//!
//! Jira Cloud REST client for jira-defaults.
//!
//! [`JiraApi`] is the provider surface the reconcile engine depends on:
//! issue search, field list and options, single-issue field edits, project
//! lookup, automation rule listing and upserts, and the current-user check.
//! [`JiraClient`] implements it over `reqwest` with a static Basic-auth
//! credential carried on every request.

pub mod auth;
mod automation;
mod error;
mod fields;
mod http;
mod issues;
mod projects;
mod search;
mod users;

pub use error::JiraError;
pub use projects::ProjectDescriptor;
pub use users::UserInfo;

use std::time::Duration;

use async_trait::async_trait;
use jd_config::JiraConfig;
use jd_core::{
    AutomationRulePayload, CandidateIssue, FieldMetadata, FieldOption, IssueQuery, RuleSummary,
};

// ── Provider surface ───────────────────────────────────────────────

/// The Jira capabilities the reconcile engine consumes.
///
/// Every call is one blocking round trip with a single pass/fail outcome;
/// implementations do not retry.
#[async_trait]
pub trait JiraApi: Send + Sync {
    /// The authenticated account.
    async fn current_user(&self) -> Result<UserInfo, JiraError>;

    /// One page of issues matching `query`.
    async fn search(
        &self,
        query: &IssueQuery,
        start_at: usize,
        max_results: usize,
    ) -> Result<Vec<CandidateIssue>, JiraError>;

    /// Every field visible to the account.
    async fn field_list(&self) -> Result<Vec<FieldMetadata>, JiraError>;

    /// Options of a select field.
    async fn field_options(&self, field_id: &str) -> Result<Vec<FieldOption>, JiraError>;

    /// Set `field_id` on one issue. `Ok` only on `204 No Content`.
    async fn update_issue_field(
        &self,
        issue_id: &str,
        field_id: &str,
        option: &FieldOption,
    ) -> Result<(), JiraError>;

    async fn project(&self, project_key: &str) -> Result<ProjectDescriptor, JiraError>;

    async fn list_automation_rules(&self, project_key: &str)
    -> Result<Vec<RuleSummary>, JiraError>;

    async fn create_automation_rule(&self, payload: &AutomationRulePayload)
    -> Result<(), JiraError>;

    async fn update_automation_rule(
        &self,
        rule_id: &str,
        payload: &AutomationRulePayload,
    ) -> Result<(), JiraError>;
}

// ── Client ─────────────────────────────────────────────────────────

/// HTTP client for a single Jira site.
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
}

impl JiraClient {
    /// Build a client for the site and credential in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`JiraError::InvalidRequest`] if the credential cannot be
    /// encoded as a header, or [`JiraError::Http`] if the underlying
    /// `reqwest::Client` fails to build.
    pub fn from_config(config: &JiraConfig) -> Result<Self, JiraError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("jira-defaults/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(auth::default_headers(&config.email, &config.token)?)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a REST path (`path` starts with `/`).
    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl JiraApi for JiraClient {
    async fn current_user(&self) -> Result<UserInfo, JiraError> {
        self.get_myself().await
    }

    async fn search(
        &self,
        query: &IssueQuery,
        start_at: usize,
        max_results: usize,
    ) -> Result<Vec<CandidateIssue>, JiraError> {
        self.search_issues(query, start_at, max_results).await
    }

    async fn field_list(&self) -> Result<Vec<FieldMetadata>, JiraError> {
        self.get_fields().await
    }

    async fn field_options(&self, field_id: &str) -> Result<Vec<FieldOption>, JiraError> {
        self.get_field_options(field_id).await
    }

    async fn update_issue_field(
        &self,
        issue_id: &str,
        field_id: &str,
        option: &FieldOption,
    ) -> Result<(), JiraError> {
        self.put_issue_option(issue_id, field_id, option).await
    }

    async fn project(&self, project_key: &str) -> Result<ProjectDescriptor, JiraError> {
        self.get_project(project_key).await
    }

    async fn list_automation_rules(
        &self,
        project_key: &str,
    ) -> Result<Vec<RuleSummary>, JiraError> {
        self.get_automation_rules(project_key).await
    }

    async fn create_automation_rule(
        &self,
        payload: &AutomationRulePayload,
    ) -> Result<(), JiraError> {
        self.post_automation_rule(payload).await
    }

    async fn update_automation_rule(
        &self,
        rule_id: &str,
        payload: &AutomationRulePayload,
    ) -> Result<(), JiraError> {
        self.put_automation_rule(rule_id, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> JiraConfig {
        JiraConfig {
            url: url.to_string(),
            email: "ops@example.com".to_string(),
            token: "token".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn client_builds_from_config() {
        let client = JiraClient::from_config(&config("https://example.atlassian.net/")).unwrap();
        assert_eq!(client.base_url(), "https://example.atlassian.net");
        assert_eq!(
            client.endpoint("/rest/api/3/field"),
            "https://example.atlassian.net/rest/api/3/field"
        );
    }

    #[tokio::test]
    #[ignore] // requires network and JIRA_DEFAULTS_JIRA__* credentials
    async fn live_current_user() {
        let config = JiraConfig {
            url: std::env::var("JIRA_DEFAULTS_JIRA__URL").unwrap_or_default(),
            email: std::env::var("JIRA_DEFAULTS_JIRA__EMAIL").unwrap_or_default(),
            token: std::env::var("JIRA_DEFAULTS_JIRA__TOKEN").unwrap_or_default(),
            ..Default::default()
        };
        if !config.is_configured() {
            eprintln!("SKIP: Jira credentials not configured");
            return;
        }
        let client = JiraClient::from_config(&config).unwrap();
        let user = client.current_user().await.unwrap();
        println!("authenticated as {}", user.display_name());
    }
}
