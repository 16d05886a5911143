//! Create-or-update of the per-project automation rule.
//!
//! The rule name `Set {field_name} for {project_key}` is the only identity a
//! rule has across runs: the first listed rule with that name is updated,
//! otherwise a new one is created.

use jd_core::{AutomationRulePayload, ReconcileEvent, RuleAction, rule_name};
use jd_jira::{JiraApi, JiraError};

use crate::sink::EventSink;

/// What a rule sync is asked to install.
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec<'a> {
    pub project_key: &'a str,
    pub field_id: &'a str,
    pub field_name: &'a str,
    pub target_value: &'a str,
}

impl RuleSpec<'_> {
    #[must_use]
    pub fn name(&self) -> String {
        rule_name(self.field_name, self.project_key)
    }

    #[must_use]
    pub fn payload(&self) -> AutomationRulePayload {
        AutomationRulePayload::set_field_on_create(
            self.project_key,
            self.field_id,
            self.field_name,
            self.target_value,
        )
    }
}

/// Sync the rule and report through `sink`. Returns `true` on success.
///
/// In a dry run the existing rules are still listed, so the reported action
/// is the one a live run would take, but nothing is created or updated.
pub async fn sync_rule<A: JiraApi + ?Sized>(
    api: &A,
    sink: &dyn EventSink,
    spec: &RuleSpec<'_>,
    dry_run: bool,
) -> bool {
    match try_sync_rule(api, spec, dry_run).await {
        Ok(action) => {
            sink.emit(&ReconcileEvent::RuleSynced {
                project_key: spec.project_key.to_string(),
                rule_name: spec.name(),
                action,
                simulated: dry_run,
            });
            true
        }
        Err(error) => {
            sink.emit(&ReconcileEvent::RuleSyncFailed {
                project_key: spec.project_key.to_string(),
                rule_name: spec.name(),
                reason: error.to_string(),
                permission_denied: error.is_forbidden(),
            });
            false
        }
    }
}

/// Sync the rule, surfacing the provider error.
///
/// # Errors
///
/// Returns the [`JiraError`] of the listing, create, or update call.
pub async fn try_sync_rule<A: JiraApi + ?Sized>(
    api: &A,
    spec: &RuleSpec<'_>,
    dry_run: bool,
) -> Result<RuleAction, JiraError> {
    let name = spec.name();
    let existing = api
        .list_automation_rules(spec.project_key)
        .await?
        .into_iter()
        .find(|rule| rule.name == name);

    let payload = spec.payload();
    match existing {
        Some(rule) => {
            if !dry_run {
                api.update_automation_rule(&rule.id, &payload).await?;
            }
            Ok(RuleAction::Updated)
        }
        None => {
            if !dry_run {
                api.create_automation_rule(&payload).await?;
            }
            Ok(RuleAction::Created)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;
    use crate::test_support::FakeJira;

    const SPEC: RuleSpec<'static> = RuleSpec {
        project_key: "ABC",
        field_id: "customfield_10050",
        field_name: "LOB",
        target_value: "Platform",
    };

    #[tokio::test]
    async fn creates_then_updates() {
        let api = FakeJira::new();
        let sink = RecordingSink::new();

        assert!(sync_rule(&api, &sink, &SPEC, false).await);
        assert!(sync_rule(&api, &sink, &SPEC, false).await);

        let rules = api.rules_named("ABC", "Set LOB for ABC");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].target_value(), Some("Platform"));
        assert_eq!(api.calls().create_rule, 1);
        assert_eq!(api.calls().update_rule, 1);

        let actions: Vec<RuleAction> = sink
            .events()
            .into_iter()
            .filter_map(|e| match e {
                ReconcileEvent::RuleSynced { action, .. } => Some(action),
                _ => None,
            })
            .collect();
        assert_eq!(actions, vec![RuleAction::Created, RuleAction::Updated]);
    }

    #[tokio::test]
    async fn update_replaces_target_of_existing_rule() {
        let api = FakeJira::new().with_rule("ABC", "Set LOB for ABC");
        let sink = RecordingSink::new();

        assert!(sync_rule(&api, &sink, &SPEC, false).await);
        let rules = api.rules_named("ABC", "Set LOB for ABC");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].target_value(), Some("Platform"));
    }

    #[tokio::test]
    async fn dry_run_only_lists() {
        let api = FakeJira::new().with_rule("ABC", "Set LOB for ABC");
        assert_eq!(
            try_sync_rule(&api, &SPEC, true).await.unwrap(),
            RuleAction::Updated
        );
        assert_eq!(api.calls().list_rules, 1);
        assert_eq!(api.calls().mutations(), 0);
    }

    #[tokio::test]
    async fn forbidden_is_flagged() {
        let api = FakeJira::new().failing_rules(403);
        let sink = RecordingSink::new();

        assert!(!sync_rule(&api, &sink, &SPEC, false).await);
        match &sink.events()[0] {
            ReconcileEvent::RuleSyncFailed {
                permission_denied,
                rule_name,
                ..
            } => {
                assert!(*permission_denied);
                assert_eq!(rule_name, "Set LOB for ABC");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
