//! Automation rule naming and payload.
//!
//! The rule name is the only idempotency key: a project rule with this name is
//! "the" rule for the (field, project) pair.

use serde::{Deserialize, Serialize};

use crate::entities::string_or_number;

/// Deterministic rule name for a field in a project.
#[must_use]
pub fn rule_name(field_name: &str, project_key: &str) -> String {
    format!("Set {field_name} for {project_key}")
}

/// A rule as listed by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
}

/// Create/update body: on issue creation in the project, set the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationRulePayload {
    pub name: String,
    pub project_key: String,
    pub trigger: RuleTrigger,
    pub actions: Vec<RuleActionSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTrigger {
    pub component: String,
    pub conditions: Vec<ConditionGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionGroup {
    pub operator: String,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleActionSpec {
    pub component: String,
    pub parameters: FieldUpdateParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldUpdateParameters {
    pub field: String,
    pub value: String,
}

impl AutomationRulePayload {
    /// Rule setting `field_id` to `value` on every issue created in
    /// `project_key`.
    #[must_use]
    pub fn set_field_on_create(
        project_key: &str,
        field_id: &str,
        field_name: &str,
        value: &str,
    ) -> Self {
        Self {
            name: rule_name(field_name, project_key),
            project_key: project_key.to_string(),
            trigger: RuleTrigger {
                component: "ISSUE_CREATED".to_string(),
                conditions: vec![ConditionGroup {
                    operator: "AND".to_string(),
                    conditions: vec![Condition {
                        field: "project".to_string(),
                        operator: "EQUALS".to_string(),
                        value: project_key.to_string(),
                    }],
                }],
            },
            actions: vec![RuleActionSpec {
                component: "FIELD_UPDATE".to_string(),
                parameters: FieldUpdateParameters {
                    field: field_id.to_string(),
                    value: value.to_string(),
                },
            }],
        }
    }

    /// Target value carried by the single field-update action.
    #[must_use]
    pub fn target_value(&self) -> Option<&str> {
        self.actions.first().map(|a| a.parameters.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LOB_FIELD: &str = "customfield_10050";

    #[test]
    fn rule_name_format() {
        assert_eq!(rule_name("LOB", "ABC"), "Set LOB for ABC");
    }

    #[test]
    fn payload_shape() {
        let payload =
            AutomationRulePayload::set_field_on_create("ABC", LOB_FIELD, "LOB", "Platform");
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "name": "Set LOB for ABC",
                "projectKey": "ABC",
                "trigger": {
                    "component": "ISSUE_CREATED",
                    "conditions": [{
                        "operator": "AND",
                        "conditions": [{
                            "field": "project",
                            "operator": "EQUALS",
                            "value": "ABC"
                        }]
                    }]
                },
                "actions": [{
                    "component": "FIELD_UPDATE",
                    "parameters": {"field": "customfield_10050", "value": "Platform"}
                }]
            })
        );
        assert_eq!(payload.target_value(), Some("Platform"));
    }

    #[test]
    fn rule_summary_accepts_numeric_ids() {
        let rules: Vec<RuleSummary> =
            serde_json::from_str(r#"[{"id": 7, "name": "a"}, {"id": "8", "name": "b"}]"#).unwrap();
        assert_eq!(rules[0].id, "7");
        assert_eq!(rules[1].id, "8");
    }
}
