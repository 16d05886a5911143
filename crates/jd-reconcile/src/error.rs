//! Run-fatal errors.
//!
//! Everything per-issue or per-project is absorbed into the run result;
//! only what is listed here stops a run.

use jd_jira::JiraError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The credential was rejected or the identity check could not complete.
    #[error("authentication failed: {source}")]
    Auth {
        #[source]
        source: JiraError,
    },
}

impl ReconcileError {
    /// Operator hint for the failure, if one applies.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Auth { source } if source.is_unauthorized() => {
                Some("Invalid credentials. Please check your email and API token.")
            }
            Self::Auth { source } if source.is_forbidden() => {
                Some("You don't have sufficient permissions.")
            }
            Self::Auth { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(status: u16) -> ReconcileError {
        ReconcileError::Auth {
            source: JiraError::Api {
                status,
                message: String::new(),
            },
        }
    }

    #[test]
    fn hints_by_status() {
        assert!(auth(401).hint().unwrap().contains("API token"));
        assert!(auth(403).hint().unwrap().contains("permissions"));
        assert!(auth(500).hint().is_none());
    }
}
