use std::fmt::Write as _;
use std::path::Path;

use jd_core::{ProjectResult, RunResult};

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render the run result in the requested format.
pub fn render(
    results: &RunResult,
    format: OutputFormat,
    dry_run: bool,
    log_file: Option<&Path>,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(results)?),
        OutputFormat::Table => Ok(render_run_table(results, dry_run)),
        OutputFormat::Summary => Ok(render_summary(results, dry_run, log_file)),
    }
}

/// Print the run result to stdout.
pub fn output(
    results: &RunResult,
    format: OutputFormat,
    dry_run: bool,
    log_file: Option<&Path>,
) -> anyhow::Result<()> {
    let rendered = render(results, format, dry_run, log_file)?;
    println!("{rendered}");
    Ok(())
}

/// Human summary: per field and project, issues found and updated, rule
/// status, screen error if any, and the failed keys in lexical order.
#[must_use]
pub fn render_summary(results: &RunResult, dry_run: bool, log_file: Option<&Path>) -> String {
    let mut out = String::new();
    let title = if dry_run {
        "Update Summary (dry run):"
    } else {
        "Update Summary:"
    };
    let _ = writeln!(out, "\n{title}");
    let _ = writeln!(out, "{}", "=".repeat(50));

    for field in results.fields() {
        let _ = writeln!(out, "\nField: {}", field.field_name);
        for (project_key, result) in &field.projects {
            write_project(&mut out, project_key, result);
        }
    }

    if results.is_empty() {
        let _ = writeln!(out, "\nNo fields were processed.");
    }
    if let Some(path) = log_file {
        let _ = writeln!(
            out,
            "\nCheck the log file for detailed information: {}",
            path.display()
        );
    }
    out.trim_end().to_string()
}

fn write_project(out: &mut String, project_key: &str, result: &ProjectResult) {
    let _ = writeln!(out, "\n  Project: {project_key}");
    let _ = writeln!(out, "  Issues found without value: {}", result.issues_found());
    let _ = writeln!(out, "  Issues successfully updated: {}", result.issues_updated());
    let _ = writeln!(
        out,
        "  Automation rule: {}",
        if result.automation_rule() { '✓' } else { '✗' }
    );
    if let Some(error) = result.error() {
        let _ = writeln!(out, "  Error: {error}");
    }
    let failed = result.failed_keys_sorted();
    if !failed.is_empty() {
        let _ = writeln!(out, "  Failed issues ({}): {}", failed.len(), failed.join(", "));
    }
}

/// One row per (field, project) pair.
#[must_use]
pub fn render_run_table(results: &RunResult, dry_run: bool) -> String {
    if results.is_empty() {
        return String::from("(no rows)");
    }

    let prefs = ui::prefs();
    let options = table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    };
    let headers = [
        "field", "project", "type", "found", "updated", "failed", "rule", "error",
    ];
    let rows = results
        .iter()
        .map(|(field, project, result)| {
            let rule = match (result.error(), result.automation_rule(), dry_run) {
                (Some(_), ..) => "-",
                (None, true, true) => "dry-run",
                (None, true, false) => "ok",
                (None, false, _) => "failed",
            };
            let error = match result.error() {
                Some(jd_core::ProjectError::ScreenConfigMissing) => "missing",
                Some(jd_core::ProjectError::ScreenConfigUnknown) => "unknown",
                None => "-",
            };
            vec![
                field.to_string(),
                project.to_string(),
                result.project_type().to_string(),
                result.issues_found().to_string(),
                result.issues_updated().to_string(),
                result.failed_issues().len().to_string(),
                rule.to_string(),
                error.to_string(),
            ]
        })
        .collect::<Vec<_>>();

    table::render_table(&headers, &rows, options)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use jd_core::{
        AppliedIssue, FailedIssue, FailureReason, IssueRef, ProjectClassification, ProjectError,
        ProjectResult, RunResult,
    };
    use pretty_assertions::assert_eq;

    use super::{render, render_summary};
    use crate::cli::OutputFormat;

    fn issue(key: &str) -> IssueRef {
        IssueRef {
            key: key.into(),
            issue_type: "Task".into(),
        }
    }

    fn sample() -> RunResult {
        let mut results = RunResult::new();
        results.insert(
            "LOB",
            "ABC",
            ProjectResult::processed(
                ProjectClassification::NextGen,
                3,
                vec![AppliedIssue {
                    issue: issue("ABC-1"),
                    simulated: false,
                }],
                vec![
                    FailedIssue {
                        issue: issue("ABC-9"),
                        reason: FailureReason::Transport {
                            message: "timeout".into(),
                        },
                    },
                    FailedIssue {
                        issue: issue("ABC-10"),
                        reason: FailureReason::Transport {
                            message: "timeout".into(),
                        },
                    },
                ],
                true,
            ),
        );
        results.insert(
            "LOB",
            "DEF",
            ProjectResult::screen_error(
                ProjectClassification::CompanyManaged,
                ProjectError::ScreenConfigMissing,
            ),
        );
        results
    }

    #[test]
    fn summary_lists_projects_in_order() {
        let log_file = Path::new("logs/jira_update_20260101.log");
        let out = render_summary(&sample(), false, Some(log_file));
        let expected = "
Update Summary:
==================================================

Field: LOB

  Project: ABC
  Issues found without value: 3
  Issues successfully updated: 1
  Automation rule: ✓
  Failed issues (2): ABC-10, ABC-9

  Project: DEF
  Issues found without value: 0
  Issues successfully updated: 0
  Automation rule: ✗
  Error: Field not configured in project screens

Check the log file for detailed information: logs/jira_update_20260101.log";
        assert_eq!(out, expected);
    }

    #[test]
    fn summary_marks_dry_run() {
        let out = render_summary(&sample(), true, None);
        assert!(out.contains("Update Summary (dry run):"));
        assert!(!out.contains("Check the log file"));
    }

    #[test]
    fn json_keeps_declaration_order() {
        let out = render(&sample(), OutputFormat::Json, false, None).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["LOB"]["ABC"]["issues_found"], 3);
        assert_eq!(parsed["LOB"]["DEF"]["error"], "screen_config_missing");
        assert!(out.find("\"ABC\"").unwrap() < out.find("\"DEF\"").unwrap());
    }

    #[test]
    fn table_has_a_row_per_pair() {
        let out = render(&sample(), OutputFormat::Table, false, None).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("field"));
        assert!(lines[2].contains("next-gen"));
        assert!(lines[3].contains("missing"));
    }

    #[tokio::test]
    async fn summary_of_a_dry_run_against_fake_site() {
        use jd_config::JdConfig;
        use jd_core::{FieldTarget, ProjectTarget};
        use jd_reconcile::RecordingSink;
        use jd_reconcile::test_support::FakeJira;

        let field_id = "customfield_10050";
        let api = FakeJira::new()
            .with_select_field(field_id, "LOB", &["Platform"])
            .with_project("ABC", "classic")
            .with_empty_issues("ABC", 2, field_id);
        let config = JdConfig {
            fields: vec![FieldTarget {
                field_id: field_id.into(),
                field_name: "LOB".into(),
                projects: vec![ProjectTarget {
                    key: "ABC".into(),
                    value: "Platform".into(),
                }],
            }],
            ..Default::default()
        };

        let results = jd_reconcile::reconcile(&api, &config, true, &RecordingSink::new())
            .await
            .unwrap();
        let out = render_summary(&results, true, None);

        assert!(out.contains("Issues found without value: 2"));
        assert!(out.contains("Issues successfully updated: 2"));
        assert!(out.contains("Automation rule: ✓"));
        assert_eq!(api.calls().mutations(), 0);
    }
}
