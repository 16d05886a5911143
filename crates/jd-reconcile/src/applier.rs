//! Per-issue mutation, or its simulation in a dry run.

use jd_core::{CandidateIssue, FailureReason, Outcome, ReconcileEvent};
use jd_jira::{JiraApi, JiraError};

use crate::options::OptionResolver;
use crate::sink::EventSink;

/// Move one issue to `target` and classify the result.
///
/// The option is resolved first; a missing option fails the issue without a
/// mutation. A dry run stops after resolution. Otherwise exactly one update
/// request is sent and only a no-content acknowledgment counts as applied.
pub async fn apply<A: JiraApi + ?Sized>(
    api: &A,
    sink: &dyn EventSink,
    resolver: &mut OptionResolver,
    issue: &CandidateIssue,
    field_id: &str,
    target: &str,
    dry_run: bool,
) -> Outcome {
    let outcome = match resolver.resolve(api, field_id, target).await {
        Err(reason) => Outcome::Failed(reason),
        Ok(option) if dry_run => {
            sink.emit(&ReconcileEvent::IssueSimulated {
                key: issue.key.clone(),
                issue_type: issue.issue_type.clone(),
                option_id: option.id.as_str().to_string(),
            });
            Outcome::Simulated
        }
        Ok(option) => match api.update_issue_field(&issue.id, field_id, &option).await {
            Ok(()) => {
                sink.emit(&ReconcileEvent::IssueUpdated {
                    key: issue.key.clone(),
                    issue_type: issue.issue_type.clone(),
                    option_id: option.id.as_str().to_string(),
                });
                Outcome::Applied
            }
            Err(error) => Outcome::Failed(failure_reason(error)),
        },
    };

    if let Outcome::Failed(reason) = &outcome {
        sink.emit(&ReconcileEvent::IssueFailed {
            key: issue.key.clone(),
            issue_type: issue.issue_type.clone(),
            reason: reason.clone(),
        });
    }
    outcome
}

/// Classify a rejected or interrupted update request.
#[must_use]
pub fn failure_reason(error: JiraError) -> FailureReason {
    match error {
        JiraError::Api { status, message } => FailureReason::UpdateRejected {
            status,
            body: message,
        },
        JiraError::RateLimited { .. } => FailureReason::UpdateRejected {
            status: 429,
            body: error.to_string(),
        },
        JiraError::Http(_) | JiraError::Parse(_) | JiraError::InvalidRequest(_) => {
            FailureReason::Transport {
                message: error.to_string(),
            }
        }
    }
}
