//! Event sinks: where the engine's structured events go.

use std::sync::Mutex;

use jd_core::ReconcileEvent;

/// Receiver of reconcile events.
///
/// Injected into the engine; the engine never logs free text itself.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &ReconcileEvent);
}

/// Renders each event as a structured `tracing` record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    #[allow(clippy::too_many_lines)]
    fn emit(&self, event: &ReconcileEvent) {
        let kind = event.kind();
        match event {
            ReconcileEvent::AuthVerified { display_name } => {
                tracing::info!(event = kind, display_name, "successfully authenticated");
            }
            ReconcileEvent::FieldMetadataLoaded { field_id, name } => {
                tracing::info!(event = kind, field_id, name, "field metadata loaded");
            }
            ReconcileEvent::FieldMetadataMissing { field_id, reason } => {
                tracing::warn!(
                    event = kind,
                    field_id,
                    reason = reason.as_deref(),
                    "could not fetch field metadata"
                );
            }
            ReconcileEvent::ProjectClassified {
                project_key,
                classification,
            } => {
                tracing::info!(event = kind, project_key, %classification, "project classified");
            }
            ReconcileEvent::ProjectTypeUnavailable {
                project_key,
                reason,
            } => {
                tracing::warn!(
                    event = kind,
                    project_key,
                    reason,
                    "project type unavailable; treating as undetermined"
                );
            }
            ReconcileEvent::FieldStarted {
                field_name,
                field_id,
            } => {
                tracing::info!(event = kind, field_name, field_id, "processing field");
            }
            ReconcileEvent::ProjectStarted {
                field_name,
                project_key,
                target_value,
            } => {
                tracing::info!(
                    event = kind,
                    field_name,
                    project_key,
                    target_value,
                    "processing project"
                );
            }
            ReconcileEvent::ScreenCheckFailed {
                field_id,
                project_key,
                reason,
            } => {
                tracing::error!(
                    event = kind,
                    field_id,
                    project_key,
                    reason,
                    "failed to check screen configuration"
                );
            }
            ReconcileEvent::FieldNotOnScreens {
                field_name,
                project_key,
            } => {
                tracing::error!(
                    event = kind,
                    field_name,
                    project_key,
                    "field not found in project screens"
                );
            }
            ReconcileEvent::CandidatesFound {
                project_key,
                field_id,
                count,
            } => {
                tracing::info!(
                    event = kind,
                    project_key,
                    field_id,
                    count,
                    "found issues to update"
                );
            }
            ReconcileEvent::DiscoveryTruncated {
                project_key,
                start_at,
                fetched,
                reason,
            } => {
                tracing::error!(
                    event = kind,
                    project_key,
                    start_at,
                    fetched,
                    reason,
                    "error finding issues; continuing with partial results"
                );
            }
            ReconcileEvent::IssueUpdated {
                key,
                issue_type,
                option_id,
            } => {
                tracing::info!(event = kind, key, issue_type, option_id, "issue updated");
            }
            ReconcileEvent::IssueSimulated {
                key,
                issue_type,
                option_id,
            } => {
                tracing::info!(
                    event = kind,
                    key,
                    issue_type,
                    option_id,
                    "dry run: would update issue"
                );
            }
            ReconcileEvent::IssueFailed {
                key,
                issue_type,
                reason,
            } => {
                tracing::error!(event = kind, key, issue_type, %reason, "failed to update issue");
            }
            ReconcileEvent::FailedIssuesReport { project_key, keys } => {
                tracing::warn!(
                    event = kind,
                    project_key,
                    count = keys.len(),
                    keys = %keys.join(", "),
                    "failed issues"
                );
            }
            ReconcileEvent::RuleSynced {
                project_key,
                rule_name,
                action,
                simulated,
            } => {
                tracing::info!(
                    event = kind,
                    project_key,
                    rule_name,
                    %action,
                    simulated,
                    "automation rule synced"
                );
            }
            ReconcileEvent::RuleSyncFailed {
                project_key,
                rule_name,
                reason,
                permission_denied,
            } => {
                tracing::error!(
                    event = kind,
                    project_key,
                    rule_name,
                    reason,
                    "failed to configure automation rule"
                );
                if *permission_denied {
                    tracing::error!(
                        event = kind,
                        project_key,
                        "make sure you have automation permissions for this project"
                    );
                }
            }
            ReconcileEvent::ProjectCompleted {
                field_name,
                project_key,
                issues_found,
                issues_updated,
                automation_rule,
            } => {
                tracing::info!(
                    event = kind,
                    field_name,
                    project_key,
                    issues_found,
                    issues_updated,
                    automation_rule = if *automation_rule { "created" } else { "failed" },
                    "project {project_key} completed: {issues_updated}/{issues_found} issues updated"
                );
            }
        }
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ReconcileEvent>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<ReconcileEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Event kinds in emission order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(ReconcileEvent::kind)
            .collect()
    }

    #[must_use]
    pub fn count(&self, kind: &str) -> usize {
        self.kinds().into_iter().filter(|k| *k == kind).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &ReconcileEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}

/// Forwards every event to each inner sink, in order.
#[derive(Default)]
pub struct FanoutSink<'a> {
    sinks: Vec<&'a dyn EventSink>,
}

impl<'a> FanoutSink<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    #[must_use]
    pub fn with(mut self, sink: &'a dyn EventSink) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl EventSink for FanoutSink<'_> {
    fn emit(&self, event: &ReconcileEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.emit(&ReconcileEvent::AuthVerified {
            display_name: "a".into(),
        });
        sink.emit(&ReconcileEvent::FieldStarted {
            field_name: "LOB".into(),
            field_id: "customfield_1".into(),
        });
        assert_eq!(sink.kinds(), vec!["auth_verified", "field_started"]);
        assert_eq!(sink.count("field_started"), 1);
    }

    #[test]
    fn fanout_reaches_every_sink() {
        let a = RecordingSink::new();
        let b = RecordingSink::new();
        let fanout = FanoutSink::new().with(&a).with(&b);
        fanout.emit(&ReconcileEvent::AuthVerified {
            display_name: "x".into(),
        });
        assert_eq!(a.events().len(), 1);
        assert_eq!(b.events().len(), 1);
    }

    #[test]
    fn tracing_sink_accepts_every_kind() {
        let sink = TracingSink;
        sink.emit(&ReconcileEvent::RuleSyncFailed {
            project_key: "ABC".into(),
            rule_name: "Set LOB for ABC".into(),
            reason: "403".into(),
            permission_denied: true,
        });
        sink.emit(&ReconcileEvent::ProjectCompleted {
            field_name: "LOB".into(),
            project_key: "ABC".into(),
            issues_found: 3,
            issues_updated: 3,
            automation_rule: true,
        });
    }
}
