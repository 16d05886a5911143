//! Classification and outcome enums.
//!
//! All enums serialize in `kebab-case` or `snake_case` matching how they are
//! reported in run output.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::FailureReason;

// ---------------------------------------------------------------------------
// ProjectClassification
// ---------------------------------------------------------------------------

/// How a project is managed on the provider side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectClassification {
    NextGen,
    CompanyManaged,
    #[default]
    Undetermined,
}

impl ProjectClassification {
    /// Classify a provider-reported project type/style string.
    ///
    /// Unknown strings classify as [`Self::Undetermined`].
    #[must_use]
    pub fn from_project_type(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "next-gen" | "nextgen" | "team-managed" | "simplified" => Self::NextGen,
            "classic" | "company-managed" => Self::CompanyManaged,
            _ => Self::Undetermined,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NextGen => "next-gen",
            Self::CompanyManaged => "company-managed",
            Self::Undetermined => "undetermined",
        }
    }
}

impl fmt::Display for ProjectClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ScreenCheck
// ---------------------------------------------------------------------------

/// Result of the screen-eligibility lookup for a (field, project) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenCheck {
    Present,
    Absent,
    /// The lookup itself failed.
    Indeterminate,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of applying the target value to one issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Dry run: the mutation endpoint was not contacted.
    Simulated,
    Failed(FailureReason),
}

impl Outcome {
    /// Applied and simulated outcomes both count as success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Applied | Self::Simulated)
    }
}

// ---------------------------------------------------------------------------
// RuleAction
// ---------------------------------------------------------------------------

/// What the rule synchronizer did with the project's automation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    Created,
    Updated,
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Updated => "updated",
        })
    }
}
