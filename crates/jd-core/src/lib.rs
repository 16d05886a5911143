//! # jd-core
//!
//! Core types shared across the jira-defaults crates.
//!
//! This crate has no I/O. It provides:
//! - Field targets, field metadata, candidate issues and option descriptors
//! - Project classification and per-issue outcome enums
//! - Per-issue and per-project failure taxonomy
//! - `ProjectResult` / `RunResult`, the output of a reconcile run
//! - Structured reconcile events consumed by event sinks
//! - The candidate query predicate and the automation rule payload

pub mod automation;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod events;
pub mod query;
pub mod results;

pub use automation::{AutomationRulePayload, RuleSummary, rule_name};
pub use entities::{
    CandidateIssue, FieldMetadata, FieldOption, FieldTarget, OptionId, ProjectTarget,
};
pub use enums::{Outcome, ProjectClassification, RuleAction, ScreenCheck};
pub use errors::{FailureReason, ProjectError};
pub use events::ReconcileEvent;
pub use query::IssueQuery;
pub use results::{AppliedIssue, FailedIssue, FieldResults, IssueRef, ProjectResult, RunResult};
