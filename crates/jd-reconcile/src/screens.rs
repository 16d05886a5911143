//! Screen-eligibility check for a (field, project) pair.

use jd_core::{FieldTarget, ReconcileEvent, ScreenCheck};
use jd_jira::JiraApi;

use crate::sink::EventSink;

/// Whether `target`'s field is exposed to `project_key`.
///
/// The field must appear in the field list visible to the account. A failed
/// lookup is `Indeterminate`, never `Absent`.
pub async fn check_screen<A: JiraApi + ?Sized>(
    api: &A,
    sink: &dyn EventSink,
    target: &FieldTarget,
    project_key: &str,
) -> ScreenCheck {
    match api.field_list().await {
        Ok(fields) if fields.iter().any(|f| f.id == target.field_id) => ScreenCheck::Present,
        Ok(_) => {
            sink.emit(&ReconcileEvent::FieldNotOnScreens {
                field_name: target.field_name.clone(),
                project_key: project_key.to_string(),
            });
            ScreenCheck::Absent
        }
        Err(error) => {
            sink.emit(&ReconcileEvent::ScreenCheckFailed {
                field_id: target.field_id.clone(),
                project_key: project_key.to_string(),
                reason: error.to_string(),
            });
            ScreenCheck::Indeterminate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;
    use crate::test_support::FakeJira;

    fn target() -> FieldTarget {
        FieldTarget {
            field_id: "customfield_10050".into(),
            field_name: "LOB".into(),
            projects: Vec::new(),
        }
    }

    #[tokio::test]
    async fn present_when_listed() {
        let api = FakeJira::new().with_select_field("customfield_10050", "LOB", &[]);
        let sink = RecordingSink::new();
        assert_eq!(
            check_screen(&api, &sink, &target(), "ABC").await,
            ScreenCheck::Present
        );
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn absent_when_not_listed() {
        let api = FakeJira::new().with_select_field("customfield_99999", "Other", &[]);
        let sink = RecordingSink::new();
        assert_eq!(
            check_screen(&api, &sink, &target(), "ABC").await,
            ScreenCheck::Absent
        );
        assert_eq!(sink.kinds(), vec!["field_not_on_screens"]);
    }

    #[tokio::test]
    async fn indeterminate_on_failure() {
        let api = FakeJira::new().failing_field_list();
        let sink = RecordingSink::new();
        assert_eq!(
            check_screen(&api, &sink, &target(), "ABC").await,
            ScreenCheck::Indeterminate
        );
        assert_eq!(sink.kinds(), vec!["screen_check_failed"]);
    }
}
