//! Candidate query predicate.

/// "Issues in `project_key` whose `field_id` is empty or differs from
/// `target_value`".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    pub project_key: String,
    pub field_id: String,
    pub target_value: String,
}

impl IssueQuery {
    #[must_use]
    pub fn new(project_key: &str, field_id: &str, target_value: &str) -> Self {
        Self {
            project_key: project_key.to_string(),
            field_id: field_id.to_string(),
            target_value: target_value.to_string(),
        }
    }

    /// JQL clause name for the field: `cf[N]` for `customfield_N`, the raw id
    /// otherwise.
    #[must_use]
    pub fn field_clause(&self) -> String {
        self.field_id
            .strip_prefix("customfield_")
            .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
            .map_or_else(|| self.field_id.clone(), |n| format!("cf[{n}]"))
    }

    /// Render the predicate as JQL.
    #[must_use]
    pub fn jql(&self) -> String {
        let field = self.field_clause();
        format!(
            "project = \"{}\" AND ({field} is EMPTY OR {field} != \"{}\")",
            escape(&self.project_key),
            escape(&self.target_value),
        )
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn custom_field_uses_cf_clause() {
        let q = IssueQuery::new("ABC", "customfield_10050", "Platform");
        assert_eq!(
            q.jql(),
            r#"project = "ABC" AND (cf[10050] is EMPTY OR cf[10050] != "Platform")"#
        );
    }

    #[test]
    fn system_field_is_used_verbatim() {
        let q = IssueQuery::new("ABC", "priority", "High");
        assert_eq!(q.field_clause(), "priority");
    }

    #[test]
    fn malformed_custom_id_is_used_verbatim() {
        let q = IssueQuery::new("ABC", "customfield_abc", "x");
        assert_eq!(q.field_clause(), "customfield_abc");
    }

    #[test]
    fn quotes_are_escaped() {
        let q = IssueQuery::new("ABC", "customfield_1", r#"Say "hi" \o/"#);
        assert!(q.jql().ends_with(r#"!= "Say \"hi\" \\o/")"#));
    }
}
