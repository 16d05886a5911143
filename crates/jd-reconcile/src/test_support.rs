//! In-memory Jira provider for engine tests.
//!
//! `FakeJira` models a single site: fields and their options, issues per
//! project, project styles, and automation rules. Search evaluates the
//! candidate predicate the way JQL would, paginating by `start_at`. Every
//! call is counted, and failures can be programmed per endpoint.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use jd_core::{
    AutomationRulePayload, CandidateIssue, FieldMetadata, FieldOption, IssueQuery, OptionId,
    RuleSummary,
};
use jd_jira::{JiraApi, JiraError, ProjectDescriptor, UserInfo};

/// Number of calls made to each endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calls {
    pub current_user: usize,
    pub search: usize,
    pub field_list: usize,
    pub field_options: usize,
    pub update_issue: usize,
    pub project: usize,
    pub list_rules: usize,
    pub create_rule: usize,
    pub update_rule: usize,
}

impl Calls {
    /// Calls that change provider state.
    #[must_use]
    pub const fn mutations(&self) -> usize {
        self.update_issue + self.create_rule + self.update_rule
    }
}

#[derive(Debug, Clone)]
struct FakeIssue {
    id: String,
    key: String,
    issue_type: String,
    values: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct FakeRule {
    id: String,
    payload: AutomationRulePayload,
}

#[derive(Debug, Default)]
struct FakeState {
    auth_failure: Option<u16>,
    fields: Vec<FieldMetadata>,
    field_list_fails: bool,
    options: HashMap<String, Vec<FieldOption>>,
    options_fail: bool,
    projects: HashMap<String, ProjectDescriptor>,
    project_lookup_fails: bool,
    issues: Vec<(String, FakeIssue)>,
    search_fails_at: Option<usize>,
    ignore_predicate: bool,
    update_rejections: HashMap<String, (u16, String)>,
    update_transport_failure: bool,
    rules: HashMap<String, Vec<FakeRule>>,
    rules_failure: Option<u16>,
    next_id: u64,
    calls: Calls,
}

impl FakeState {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        (10_000 + self.next_id).to_string()
    }
}

/// In-memory [`JiraApi`].
#[derive(Debug, Default)]
pub struct FakeJira {
    state: Mutex<FakeState>,
}

impl FakeJira {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state(self, f: impl FnOnce(&mut FakeState)) -> Self {
        f(&mut self.state.lock().unwrap_or_else(|e| e.into_inner()));
        self
    }

    fn read<T>(&self, f: impl FnOnce(&FakeState) -> T) -> T {
        f(&self.state.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn write<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        f(&mut self.state.lock().unwrap_or_else(|e| e.into_inner()))
    }

    // ── Builders ───────────────────────────────────────────────────

    /// Register a select field with the given option values.
    #[must_use]
    pub fn with_select_field(self, field_id: &str, name: &str, options: &[&str]) -> Self {
        self.with_state(|s| {
            s.fields.push(FieldMetadata {
                id: field_id.to_string(),
                name: name.to_string(),
                custom: true,
                schema: Some(serde_json::json!({"type": "option"})),
            });
            let opts = options
                .iter()
                .map(|value| FieldOption {
                    id: OptionId::new(s.next_id()),
                    value: (*value).to_string(),
                })
                .collect();
            s.options.insert(field_id.to_string(), opts);
        })
    }

    #[must_use]
    pub fn with_project(self, key: &str, style: &str) -> Self {
        self.with_state(|s| {
            s.projects.insert(
                key.to_string(),
                ProjectDescriptor {
                    key: key.to_string(),
                    project_type_key: "software".to_string(),
                    style: Some(style.to_string()),
                    simplified: None,
                },
            );
        })
    }

    /// Add an issue; `value` is its current value for `field_id`.
    #[must_use]
    pub fn with_issue(
        self,
        project_key: &str,
        key: &str,
        issue_type: &str,
        field_id: &str,
        value: Option<&str>,
    ) -> Self {
        self.with_state(|s| {
            let mut values = HashMap::new();
            if let Some(v) = value {
                values.insert(field_id.to_string(), v.to_string());
            }
            let issue = FakeIssue {
                id: s.next_id(),
                key: key.to_string(),
                issue_type: issue_type.to_string(),
                values,
            };
            s.issues.push((project_key.to_string(), issue));
        })
    }

    /// Add `count` issues `{project_key}-1..=count` with the field unset.
    #[must_use]
    pub fn with_empty_issues(mut self, project_key: &str, count: usize, field_id: &str) -> Self {
        for n in 1..=count {
            let key = format!("{project_key}-{n}");
            self = self.with_issue(project_key, &key, "Task", field_id, None);
        }
        self
    }

    #[must_use]
    pub fn with_rule(self, project_key: &str, name: &str) -> Self {
        self.with_state(|s| {
            let id = s.next_id();
            let payload = AutomationRulePayload::set_field_on_create(project_key, "", "", "");
            s.rules.entry(project_key.to_string()).or_default().push(FakeRule {
                id,
                payload: AutomationRulePayload {
                    name: name.to_string(),
                    ..payload
                },
            });
        })
    }

    // ── Failure programming ────────────────────────────────────────

    #[must_use]
    pub fn failing_auth(self, status: u16) -> Self {
        self.with_state(|s| s.auth_failure = Some(status))
    }

    #[must_use]
    pub fn failing_field_list(self) -> Self {
        self.with_state(|s| s.field_list_fails = true)
    }

    #[must_use]
    pub fn failing_options(self) -> Self {
        self.with_state(|s| s.options_fail = true)
    }

    #[must_use]
    pub fn failing_project_lookup(self) -> Self {
        self.with_state(|s| s.project_lookup_fails = true)
    }

    /// Cut off the body of the search page that starts at `start_at`.
    #[must_use]
    pub fn failing_search_at(self, start_at: usize) -> Self {
        self.with_state(|s| s.search_fails_at = Some(start_at))
    }

    /// Return every issue of the project regardless of the predicate.
    #[must_use]
    pub fn ignoring_search_predicate(self) -> Self {
        self.with_state(|s| s.ignore_predicate = true)
    }

    #[must_use]
    pub fn rejecting_update(self, issue_key: &str, status: u16, body: &str) -> Self {
        self.with_state(|s| {
            s.update_rejections
                .insert(issue_key.to_string(), (status, body.to_string()));
        })
    }

    /// Fail every issue edit with a refused connection.
    #[must_use]
    pub fn failing_update_transport(self) -> Self {
        self.with_state(|s| s.update_transport_failure = true)
    }

    #[must_use]
    pub fn failing_rules(self, status: u16) -> Self {
        self.with_state(|s| s.rules_failure = Some(status))
    }

    /// Stop failing search pages.
    pub fn heal_search(&self) {
        self.write(|s| s.search_fails_at = None);
    }

    // ── Inspection ─────────────────────────────────────────────────

    #[must_use]
    pub fn calls(&self) -> Calls {
        self.read(|s| s.calls)
    }

    pub fn reset_calls(&self) {
        self.write(|s| s.calls = Calls::default());
    }

    /// Current value of `field_id` on the issue with `key`.
    #[must_use]
    pub fn value_of(&self, key: &str, field_id: &str) -> Option<String> {
        self.read(|s| {
            s.issues
                .iter()
                .find(|(_, i)| i.key == key)
                .and_then(|(_, i)| i.values.get(field_id).cloned())
        })
    }

    /// Rules in `project_key` named `name`.
    #[must_use]
    pub fn rules_named(&self, project_key: &str, name: &str) -> Vec<AutomationRulePayload> {
        self.read(|s| {
            s.rules
                .get(project_key)
                .map(|rules| {
                    rules
                        .iter()
                        .filter(|r| r.payload.name == name)
                        .map(|r| r.payload.clone())
                        .collect()
                })
                .unwrap_or_default()
        })
    }
}

/// What the client reports for a search page whose body was cut off.
const TRUNCATED_PAGE: &str = "EOF while parsing a list at line 1 column 12";

/// A real connect failure against a loopback port that was just released.
async fn connection_refused() -> JiraError {
    let addr = match std::net::TcpListener::bind("127.0.0.1:0").and_then(|l| l.local_addr()) {
        Ok(addr) => addr,
        Err(e) => return JiraError::InvalidRequest(e.to_string()),
    };
    let client = match reqwest::Client::builder().no_proxy().build() {
        Ok(client) => client,
        Err(e) => return JiraError::Http(e),
    };
    match client.get(format!("http://{addr}/")).send().await {
        Err(e) => JiraError::Http(e),
        Ok(resp) => api_error(resp.status().as_u16(), "unexpected listener"),
    }
}

fn api_error(status: u16, message: &str) -> JiraError {
    JiraError::Api {
        status,
        message: message.to_string(),
    }
}

#[async_trait]
impl JiraApi for FakeJira {
    async fn current_user(&self) -> Result<UserInfo, JiraError> {
        self.write(|s| {
            s.calls.current_user += 1;
            match s.auth_failure {
                Some(status) => Err(api_error(status, "Unauthorized")),
                None => Ok(UserInfo {
                    account_id: "fake-account".to_string(),
                    display_name: Some("Fake User".to_string()),
                }),
            }
        })
    }

    async fn search(
        &self,
        query: &IssueQuery,
        start_at: usize,
        max_results: usize,
    ) -> Result<Vec<CandidateIssue>, JiraError> {
        self.write(|s| {
            s.calls.search += 1;
            if s.search_fails_at == Some(start_at) {
                return Err(JiraError::Parse(TRUNCATED_PAGE.to_string()));
            }
            let ignore = s.ignore_predicate;
            let matching: Vec<CandidateIssue> = s
                .issues
                .iter()
                .filter(|(project, _)| *project == query.project_key)
                .map(|(_, issue)| CandidateIssue {
                    id: issue.id.clone(),
                    key: issue.key.clone(),
                    issue_type: issue.issue_type.clone(),
                    current_value: issue.values.get(&query.field_id).cloned(),
                })
                .filter(|c| ignore || c.diverges_from(&query.target_value))
                .collect();
            Ok(matching.into_iter().skip(start_at).take(max_results).collect())
        })
    }

    async fn field_list(&self) -> Result<Vec<FieldMetadata>, JiraError> {
        self.write(|s| {
            s.calls.field_list += 1;
            if s.field_list_fails {
                return Err(api_error(500, "Internal Server Error"));
            }
            Ok(s.fields.clone())
        })
    }

    async fn field_options(&self, field_id: &str) -> Result<Vec<FieldOption>, JiraError> {
        self.write(|s| {
            s.calls.field_options += 1;
            if s.options_fail {
                return Err(api_error(503, "Service Unavailable"));
            }
            s.options
                .get(field_id)
                .cloned()
                .ok_or_else(|| api_error(404, "field not found"))
        })
    }

    async fn update_issue_field(
        &self,
        issue_id: &str,
        field_id: &str,
        option: &FieldOption,
    ) -> Result<(), JiraError> {
        let transport_failure = self.write(|s| {
            s.calls.update_issue += 1;
            s.update_transport_failure
        });
        if transport_failure {
            return Err(connection_refused().await);
        }
        self.write(|s| {
            let issue = s
                .issues
                .iter_mut()
                .map(|(_, i)| i)
                .find(|i| i.id == issue_id)
                .ok_or_else(|| api_error(404, "Issue does not exist"))?;
            if let Some((status, body)) = s.update_rejections.get(&issue.key) {
                return Err(api_error(*status, body));
            }
            issue
                .values
                .insert(field_id.to_string(), option.value.clone());
            Ok(())
        })
    }

    async fn project(&self, project_key: &str) -> Result<ProjectDescriptor, JiraError> {
        self.write(|s| {
            s.calls.project += 1;
            if s.project_lookup_fails {
                return Err(api_error(500, "Internal Server Error"));
            }
            s.projects
                .get(project_key)
                .cloned()
                .ok_or_else(|| api_error(404, "No project could be found"))
        })
    }

    async fn list_automation_rules(
        &self,
        project_key: &str,
    ) -> Result<Vec<RuleSummary>, JiraError> {
        self.write(|s| {
            s.calls.list_rules += 1;
            if let Some(status) = s.rules_failure {
                return Err(api_error(status, "rules unavailable"));
            }
            Ok(s.rules
                .get(project_key)
                .map(|rules| {
                    rules
                        .iter()
                        .map(|r| RuleSummary {
                            id: r.id.clone(),
                            name: r.payload.name.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default())
        })
    }

    async fn create_automation_rule(
        &self,
        payload: &AutomationRulePayload,
    ) -> Result<(), JiraError> {
        self.write(|s| {
            s.calls.create_rule += 1;
            let id = s.next_id();
            s.rules
                .entry(payload.project_key.clone())
                .or_default()
                .push(FakeRule {
                    id,
                    payload: payload.clone(),
                });
            Ok(())
        })
    }

    async fn update_automation_rule(
        &self,
        rule_id: &str,
        payload: &AutomationRulePayload,
    ) -> Result<(), JiraError> {
        self.write(|s| {
            s.calls.update_rule += 1;
            let rule = s
                .rules
                .values_mut()
                .flatten()
                .find(|r| r.id == rule_id)
                .ok_or_else(|| api_error(404, "rule not found"))?;
            rule.payload = payload.clone();
            Ok(())
        })
    }
}
