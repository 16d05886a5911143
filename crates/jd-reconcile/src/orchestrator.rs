//! Drives discovery, backfill and rule sync for every (field, project) pair.
//!
//! Pairs run strictly in declaration order, one request outstanding at a
//! time. Per-issue and per-project failures are folded into the run result;
//! only the authentication check can fail the run.

use jd_config::JdConfig;
use jd_core::{
    AppliedIssue, FailedIssue, FieldTarget, IssueQuery, IssueRef, Outcome, ProjectClassification,
    ProjectError, ProjectResult, ProjectTarget, ReconcileEvent, RunResult, ScreenCheck,
};
use jd_jira::JiraApi;

use crate::applier::apply;
use crate::error::ReconcileError;
use crate::finder::find_candidates;
use crate::metadata::MetadataCache;
use crate::options::{OptionCachePolicy, OptionResolver};
use crate::rules::{RuleSpec, sync_rule};
use crate::screens::check_screen;
use crate::sink::EventSink;

const DEFAULT_PAGE_SIZE: usize = 100;

/// Run every field target in `config` against `api`.
///
/// # Errors
///
/// Returns [`ReconcileError::Auth`] if the identity check fails; nothing is
/// read or written past that point.
pub async fn reconcile<A: JiraApi + ?Sized>(
    api: &A,
    config: &JdConfig,
    dry_run: bool,
    sink: &dyn EventSink,
) -> Result<RunResult, ReconcileError> {
    Reconciler::new(api, sink)
        .dry_run(dry_run)
        .page_size(config.reconcile.page_size)
        .option_cache(OptionCachePolicy::from_config(config.reconcile.cache_options))
        .run(&config.fields)
        .await
}

/// Reconcile engine bound to one provider and one event sink.
pub struct Reconciler<'a, A: JiraApi + ?Sized> {
    api: &'a A,
    sink: &'a dyn EventSink,
    dry_run: bool,
    page_size: usize,
    option_cache: OptionCachePolicy,
}

impl<'a, A: JiraApi + ?Sized> Reconciler<'a, A> {
    #[must_use]
    pub fn new(api: &'a A, sink: &'a dyn EventSink) -> Self {
        Self {
            api,
            sink,
            dry_run: false,
            page_size: DEFAULT_PAGE_SIZE,
            option_cache: OptionCachePolicy::PerCall,
        }
    }

    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub const fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub const fn option_cache(mut self, policy: OptionCachePolicy) -> Self {
        self.option_cache = policy;
        self
    }

    /// Authenticate, prime metadata, then process every pair.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Auth`] if the identity check fails.
    pub async fn run(&self, targets: &[FieldTarget]) -> Result<RunResult, ReconcileError> {
        let user = self
            .api
            .current_user()
            .await
            .map_err(|source| ReconcileError::Auth { source })?;
        self.sink.emit(&ReconcileEvent::AuthVerified {
            display_name: user.display_name().to_string(),
        });

        let mut metadata = MetadataCache::new();
        metadata.prime(self.api, self.sink, targets).await;

        let mut resolver = OptionResolver::new(self.option_cache);
        let mut results = RunResult::new();

        for target in targets {
            self.sink.emit(&ReconcileEvent::FieldStarted {
                field_name: target.field_name.clone(),
                field_id: target.field_id.clone(),
            });
            for project in &target.projects {
                let project_type = metadata
                    .project_type(self.api, self.sink, &project.key)
                    .await;
                let result = self
                    .process_project(target, project, project_type, &mut resolver)
                    .await;
                results.insert(&target.field_name, &project.key, result);
            }
        }

        Ok(results)
    }

    async fn process_project(
        &self,
        target: &FieldTarget,
        project: &ProjectTarget,
        project_type: ProjectClassification,
        resolver: &mut OptionResolver,
    ) -> ProjectResult {
        self.sink.emit(&ReconcileEvent::ProjectStarted {
            field_name: target.field_name.clone(),
            project_key: project.key.clone(),
            target_value: project.value.clone(),
        });

        match check_screen(self.api, self.sink, target, &project.key).await {
            ScreenCheck::Present => {}
            ScreenCheck::Absent => {
                return ProjectResult::screen_error(project_type, ProjectError::ScreenConfigMissing);
            }
            ScreenCheck::Indeterminate => {
                return ProjectResult::screen_error(project_type, ProjectError::ScreenConfigUnknown);
            }
        }

        resolver.reset();
        let query = IssueQuery::new(&project.key, &target.field_id, &project.value);
        let candidates = find_candidates(self.api, self.sink, &query, self.page_size).await;
        self.sink.emit(&ReconcileEvent::CandidatesFound {
            project_key: project.key.clone(),
            field_id: target.field_id.clone(),
            count: candidates.len(),
        });

        let mut successful = Vec::new();
        let mut failed = Vec::new();
        for issue in &candidates {
            let outcome = apply(
                self.api,
                self.sink,
                resolver,
                issue,
                &target.field_id,
                &project.value,
                self.dry_run,
            )
            .await;
            let issue_ref = IssueRef {
                key: issue.key.clone(),
                issue_type: issue.issue_type.clone(),
            };
            match outcome {
                Outcome::Applied => successful.push(AppliedIssue {
                    issue: issue_ref,
                    simulated: false,
                }),
                Outcome::Simulated => successful.push(AppliedIssue {
                    issue: issue_ref,
                    simulated: true,
                }),
                Outcome::Failed(reason) => failed.push(FailedIssue {
                    issue: issue_ref,
                    reason,
                }),
            }
        }

        if !failed.is_empty() {
            let mut keys: Vec<String> = failed.iter().map(|f| f.issue.key.clone()).collect();
            keys.sort();
            self.sink.emit(&ReconcileEvent::FailedIssuesReport {
                project_key: project.key.clone(),
                keys,
            });
        }

        // Installed even when every backfill update failed.
        let spec = RuleSpec {
            project_key: &project.key,
            field_id: &target.field_id,
            field_name: &target.field_name,
            target_value: &project.value,
        };
        let automation_rule = sync_rule(self.api, self.sink, &spec, self.dry_run).await;

        let result = ProjectResult::processed(
            project_type,
            candidates.len(),
            successful,
            failed,
            automation_rule,
        );
        self.sink.emit(&ReconcileEvent::ProjectCompleted {
            field_name: target.field_name.clone(),
            project_key: project.key.clone(),
            issues_found: result.issues_found(),
            issues_updated: result.issues_updated(),
            automation_rule,
        });
        result
    }
}
