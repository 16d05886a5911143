//! Domain entities: what the run is asked to do and what the provider reports.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Desired value of one custom field, scoped per project.
///
/// Declared by configuration and immutable for the run. `projects` keeps
/// declaration order, which is also the processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTarget {
    #[serde(rename = "id")]
    pub field_id: String,
    #[serde(rename = "name")]
    pub field_name: String,
    #[serde(default)]
    pub projects: Vec<ProjectTarget>,
}

impl FieldTarget {
    /// Desired value for `project_key`, if the project is declared.
    #[must_use]
    pub fn value_for(&self, project_key: &str) -> Option<&str> {
        self.projects
            .iter()
            .find(|p| p.key == project_key)
            .map(|p| p.value.as_str())
    }
}

/// One `project_key → desired_value` binding of a [`FieldTarget`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTarget {
    pub key: String,
    pub value: String,
}

/// Provider-reported descriptor of a field, as returned by the field list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

/// An issue whose field value diverges from the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateIssue {
    pub id: String,
    pub key: String,
    pub issue_type: String,
    /// `None` when the field is unset on the issue.
    pub current_value: Option<String>,
}

impl CandidateIssue {
    /// True if the issue still needs to move to `target`.
    #[must_use]
    pub fn diverges_from(&self, target: &str) -> bool {
        self.current_value.as_deref() != Some(target)
    }
}

/// Provider-internal identifier of a select option.
///
/// Jira reports option ids as either JSON numbers or strings depending on the
/// endpoint; both are normalised to a string here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OptionId(String);

impl OptionId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for OptionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        string_or_number(deserializer).map(Self)
    }
}

/// Jira ids arrive as JSON strings or numbers; read either as a string.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// A selectable option of a single-select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub id: OptionId,
    pub value: String,
}
