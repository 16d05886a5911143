//! Reconcile engine tuning.

use serde::{Deserialize, Serialize};

/// Search page size; the provider caps this at 100.
const fn default_page_size() -> usize {
    100
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReconcileConfig {
    /// Reuse a field's option list for the rest of a project's backfill
    /// instead of fetching it once per issue.
    #[serde(default)]
    pub cache_options: bool,

    /// Issues requested per search page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            cache_options: false,
            page_size: default_page_size(),
        }
    }
}
