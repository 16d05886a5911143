//! Per-issue and per-project failure taxonomy.
//!
//! These are carried as data on run results rather than propagated: a failed
//! issue or project never interrupts sibling work. Run-fatal errors
//! (authentication) live in `jd-reconcile`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a single issue could not be moved to the target value.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// No option of the field has exactly this display value, or the option
    /// list could not be fetched.
    #[error("value '{value}' not found in available options")]
    OptionNotFound { value: String },

    /// The provider answered the mutation with something other than 204.
    #[error("update rejected ({status}): {body}")]
    UpdateRejected { status: u16, body: String },

    /// The mutation request did not complete.
    #[error("transport error: {message}")]
    Transport { message: String },
}

/// Terminal error for a (field, project) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectError {
    /// The screen-configuration lookup failed.
    #[error("Failed to check screen configuration")]
    ScreenConfigUnknown,

    /// The field is not exposed on the project's screens.
    #[error("Field not configured in project screens")]
    ScreenConfigMissing,
}
