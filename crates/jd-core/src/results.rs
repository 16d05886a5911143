//! Run output: one [`ProjectResult`] per (field, project) pair, folded into a
//! [`RunResult`].

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::enums::ProjectClassification;
use crate::errors::{FailureReason, ProjectError};

/// Key and type of an issue, as reported in results.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IssueRef {
    pub key: String,
    #[serde(rename = "type")]
    pub issue_type: String,
}

/// An issue that reached the target value, or would have in a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedIssue {
    #[serde(flatten)]
    pub issue: IssueRef,
    pub simulated: bool,
}

/// An issue whose update failed, with the captured diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedIssue {
    #[serde(flatten)]
    pub issue: IssueRef,
    pub reason: FailureReason,
}

/// Outcome of one (field, project) pair.
///
/// Built exactly once by the orchestrator through one of the two
/// constructors, so `error` and issue-level accounting never coexist.
/// Deserialization goes through the same constructors and rejects input
/// that breaks either rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProjectResult")]
pub struct ProjectResult {
    issues_found: usize,
    issues_updated: usize,
    automation_rule: bool,
    project_type: ProjectClassification,
    successful_issues: Vec<AppliedIssue>,
    failed_issues: Vec<FailedIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<ProjectError>,
}

#[derive(Deserialize)]
struct RawProjectResult {
    issues_found: usize,
    issues_updated: usize,
    automation_rule: bool,
    project_type: ProjectClassification,
    successful_issues: Vec<AppliedIssue>,
    failed_issues: Vec<FailedIssue>,
    #[serde(default)]
    error: Option<ProjectError>,
}

impl TryFrom<RawProjectResult> for ProjectResult {
    type Error = String;

    fn try_from(raw: RawProjectResult) -> Result<Self, Self::Error> {
        if let Some(error) = raw.error {
            let has_accounting = raw.issues_found > 0
                || raw.issues_updated > 0
                || raw.automation_rule
                || !raw.successful_issues.is_empty()
                || !raw.failed_issues.is_empty();
            if has_accounting {
                return Err(format!(
                    "project result with error `{error}` carries issue accounting"
                ));
            }
            return Ok(Self::screen_error(raw.project_type, error));
        }
        if raw.issues_updated != raw.successful_issues.len() {
            return Err(format!(
                "issues_updated is {} but {} successful issues are listed",
                raw.issues_updated,
                raw.successful_issues.len()
            ));
        }
        Ok(Self::processed(
            raw.project_type,
            raw.issues_found,
            raw.successful_issues,
            raw.failed_issues,
            raw.automation_rule,
        ))
    }
}

impl ProjectResult {
    /// Terminal result for a pair that stopped at the screen check.
    #[must_use]
    pub const fn screen_error(project_type: ProjectClassification, error: ProjectError) -> Self {
        Self {
            issues_found: 0,
            issues_updated: 0,
            automation_rule: false,
            project_type,
            successful_issues: Vec::new(),
            failed_issues: Vec::new(),
            error: Some(error),
        }
    }

    /// Result for a pair that went through discovery, backfill and rule sync.
    ///
    /// `issues_updated` counts simulated updates too.
    #[must_use]
    pub fn processed(
        project_type: ProjectClassification,
        issues_found: usize,
        successful_issues: Vec<AppliedIssue>,
        failed_issues: Vec<FailedIssue>,
        automation_rule: bool,
    ) -> Self {
        Self {
            issues_found,
            issues_updated: successful_issues.len(),
            automation_rule,
            project_type,
            successful_issues,
            failed_issues,
            error: None,
        }
    }

    #[must_use]
    pub const fn issues_found(&self) -> usize {
        self.issues_found
    }

    #[must_use]
    pub const fn issues_updated(&self) -> usize {
        self.issues_updated
    }

    #[must_use]
    pub const fn automation_rule(&self) -> bool {
        self.automation_rule
    }

    #[must_use]
    pub const fn project_type(&self) -> ProjectClassification {
        self.project_type
    }

    #[must_use]
    pub fn successful_issues(&self) -> &[AppliedIssue] {
        &self.successful_issues
    }

    #[must_use]
    pub fn failed_issues(&self) -> &[FailedIssue] {
        &self.failed_issues
    }

    #[must_use]
    pub const fn error(&self) -> Option<ProjectError> {
        self.error
    }

    /// Failed issue keys in lexical order, for operator triage.
    #[must_use]
    pub fn failed_keys_sorted(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .failed_issues
            .iter()
            .map(|f| f.issue.key.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }
}

/// Results for every project of one field, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldResults {
    pub field_name: String,
    pub projects: Vec<(String, ProjectResult)>,
}

/// `field_name → project_key → ProjectResult`, the sole output of a run.
///
/// Iteration and serialization follow configuration declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    fields: Vec<FieldResults>,
}

impl RunResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of a pair. A second insert for the same pair
    /// replaces the first.
    pub fn insert(&mut self, field_name: &str, project_key: &str, result: ProjectResult) {
        let idx = match self.fields.iter().position(|f| f.field_name == field_name) {
            Some(idx) => idx,
            None => {
                self.fields.push(FieldResults {
                    field_name: field_name.to_string(),
                    projects: Vec::new(),
                });
                self.fields.len() - 1
            }
        };
        let projects = &mut self.fields[idx].projects;
        match projects.iter_mut().find(|(key, _)| key == project_key) {
            Some(slot) => slot.1 = result,
            None => projects.push((project_key.to_string(), result)),
        }
    }

    #[must_use]
    pub fn get(&self, field_name: &str, project_key: &str) -> Option<&ProjectResult> {
        self.fields
            .iter()
            .find(|f| f.field_name == field_name)?
            .projects
            .iter()
            .find(|(key, _)| key == project_key)
            .map(|(_, result)| result)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldResults> {
        self.fields.iter()
    }

    /// Every (field, project, result) triple in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &ProjectResult)> {
        self.fields.iter().flat_map(|f| {
            f.projects
                .iter()
                .map(move |(key, result)| (f.field_name.as_str(), key.as_str(), result))
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn total_found(&self) -> usize {
        self.iter().map(|(_, _, r)| r.issues_found()).sum()
    }

    #[must_use]
    pub fn total_updated(&self) -> usize {
        self.iter().map(|(_, _, r)| r.issues_updated()).sum()
    }

    #[must_use]
    pub fn total_failed(&self) -> usize {
        self.iter().map(|(_, _, r)| r.failed_issues().len()).sum()
    }
}

struct ProjectMap<'a>(&'a [(String, ProjectResult)]);

impl Serialize for ProjectMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, result) in self.0 {
            map.serialize_entry(key, result)?;
        }
        map.end()
    }
}

impl Serialize for RunResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.field_name, &ProjectMap(&field.projects))?;
        }
        map.end()
    }
}
