//! # jd-reconcile
//!
//! Field reconciliation engine for jira-defaults.
//!
//! For every configured (field, project) pair the engine checks that the
//! field is on the project's screens, discovers issues whose value diverges
//! from the target, resolves the target to an option id and applies it one
//! issue at a time, then creates or updates an automation rule so issues
//! created later receive the same default.
//!
//! The engine is generic over [`jd_jira::JiraApi`] and reports progress only
//! through [`ReconcileEvent`](jd_core::ReconcileEvent)s sent to an
//! [`EventSink`]. Its output is a [`RunResult`](jd_core::RunResult).
//!
//! ```ignore
//! let client = JiraClient::from_config(&config.jira)?;
//! let results = jd_reconcile::reconcile(&client, &config, dry_run, &TracingSink).await?;
//! ```

pub mod applier;
pub mod error;
pub mod finder;
pub mod metadata;
pub mod options;
pub mod orchestrator;
pub mod rules;
pub mod screens;
pub mod sink;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::ReconcileError;
pub use metadata::MetadataCache;
pub use options::{OptionCachePolicy, OptionResolver};
pub use orchestrator::{Reconciler, reconcile};
pub use rules::RuleSpec;
pub use sink::{EventSink, FanoutSink, RecordingSink, TracingSink};
