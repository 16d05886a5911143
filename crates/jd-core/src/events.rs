//! Structured events emitted during a reconcile run.
//!
//! The engine reports progress only through these values; sinks decide how
//! to render them (tracing, progress bars, in-memory capture for tests).

use serde::Serialize;

use crate::enums::{ProjectClassification, RuleAction};
use crate::errors::FailureReason;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReconcileEvent {
    AuthVerified {
        display_name: String,
    },
    FieldMetadataLoaded {
        field_id: String,
        name: String,
    },
    FieldMetadataMissing {
        field_id: String,
        reason: Option<String>,
    },
    ProjectClassified {
        project_key: String,
        classification: ProjectClassification,
    },
    ProjectTypeUnavailable {
        project_key: String,
        reason: String,
    },
    FieldStarted {
        field_name: String,
        field_id: String,
    },
    ProjectStarted {
        field_name: String,
        project_key: String,
        target_value: String,
    },
    ScreenCheckFailed {
        field_id: String,
        project_key: String,
        reason: String,
    },
    FieldNotOnScreens {
        field_name: String,
        project_key: String,
    },
    CandidatesFound {
        project_key: String,
        field_id: String,
        count: usize,
    },
    /// A page fetch failed; discovery stopped with what it had.
    DiscoveryTruncated {
        project_key: String,
        start_at: usize,
        fetched: usize,
        reason: String,
    },
    IssueUpdated {
        key: String,
        issue_type: String,
        option_id: String,
    },
    IssueSimulated {
        key: String,
        issue_type: String,
        option_id: String,
    },
    IssueFailed {
        key: String,
        issue_type: String,
        reason: FailureReason,
    },
    /// Failed keys of one project, sorted lexically.
    FailedIssuesReport {
        project_key: String,
        keys: Vec<String>,
    },
    /// `simulated` is set in dry runs, where the rule was only looked up.
    RuleSynced {
        project_key: String,
        rule_name: String,
        action: RuleAction,
        simulated: bool,
    },
    RuleSyncFailed {
        project_key: String,
        rule_name: String,
        reason: String,
        permission_denied: bool,
    },
    ProjectCompleted {
        field_name: String,
        project_key: String,
        issues_found: usize,
        issues_updated: usize,
        automation_rule: bool,
    },
}

impl ReconcileEvent {
    /// Stable snake_case name of the event kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AuthVerified { .. } => "auth_verified",
            Self::FieldMetadataLoaded { .. } => "field_metadata_loaded",
            Self::FieldMetadataMissing { .. } => "field_metadata_missing",
            Self::ProjectClassified { .. } => "project_classified",
            Self::ProjectTypeUnavailable { .. } => "project_type_unavailable",
            Self::FieldStarted { .. } => "field_started",
            Self::ProjectStarted { .. } => "project_started",
            Self::ScreenCheckFailed { .. } => "screen_check_failed",
            Self::FieldNotOnScreens { .. } => "field_not_on_screens",
            Self::CandidatesFound { .. } => "candidates_found",
            Self::DiscoveryTruncated { .. } => "discovery_truncated",
            Self::IssueUpdated { .. } => "issue_updated",
            Self::IssueSimulated { .. } => "issue_simulated",
            Self::IssueFailed { .. } => "issue_failed",
            Self::FailedIssuesReport { .. } => "failed_issues_report",
            Self::RuleSynced { .. } => "rule_synced",
            Self::RuleSyncFailed { .. } => "rule_sync_failed",
            Self::ProjectCompleted { .. } => "project_completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_serde_tag() {
        let events = [
            ReconcileEvent::CandidatesFound {
                project_key: "ABC".into(),
                field_id: "customfield_1".into(),
                count: 3,
            },
            ReconcileEvent::RuleSynced {
                project_key: "ABC".into(),
                rule_name: "Set LOB for ABC".into(),
                action: RuleAction::Created,
                simulated: false,
            },
            ReconcileEvent::FailedIssuesReport {
                project_key: "ABC".into(),
                keys: vec!["ABC-1".into()],
            },
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["event"], event.kind());
        }
    }
}
