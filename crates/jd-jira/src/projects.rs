//! Project lookup.

use jd_core::ProjectClassification;
use serde::Deserialize;

use crate::{JiraClient, error::JiraError, http::{check_response, decode_json}};

/// Subset of `GET /rest/api/3/project/{key}` used for classification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub project_type_key: String,
    /// `classic` or `next-gen` on Jira Cloud.
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub simplified: Option<bool>,
}

impl ProjectDescriptor {
    /// The provider string the classification is derived from: `style`
    /// when reported, else the `simplified` flag, else `projectTypeKey`.
    #[must_use]
    pub fn type_string(&self) -> &str {
        if let Some(style) = self.style.as_deref() {
            return style;
        }
        match self.simplified {
            Some(true) => "next-gen",
            Some(false) => "classic",
            None => &self.project_type_key,
        }
    }

    #[must_use]
    pub fn classification(&self) -> ProjectClassification {
        ProjectClassification::from_project_type(self.type_string())
    }
}

impl JiraClient {
    pub(crate) async fn get_project(
        &self,
        project_key: &str,
    ) -> Result<ProjectDescriptor, JiraError> {
        let url = self.endpoint(&format!(
            "/rest/api/3/project/{}",
            urlencoding::encode(project_key)
        ));
        let resp = check_response(self.http.get(&url).send().await?).await?;
        decode_json(resp).await
    }
}
