//! # jd-config
//!
//! Layered configuration loading for jira-defaults using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`JIRA_DEFAULTS_*` prefix, `__` as separator)
//! 2. The TOML file named on the command line
//! 3. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `JIRA_DEFAULTS_JIRA__TOKEN` -> `jira.token`,
//! `JIRA_DEFAULTS_RECONCILE__CACHE_OPTIONS` -> `reconcile.cache_options`, etc.
//!
//! # File Layout
//!
//! ```toml
//! [jira]
//! url = "https://example.atlassian.net"
//! email = "ops@example.com"
//! token = "api-token"
//!
//! [[fields]]
//! name = "LOB"
//! id = "customfield_10050"
//! projects = [
//!   { key = "ABC", value = "Platform" },
//! ]
//! ```
//!
//! Fields and projects are arrays so their declaration order, which is the
//! processing order, survives loading.

mod error;
mod jira;
mod reconcile;

pub use error::ConfigError;
pub use jira::JiraConfig;
pub use reconcile::ReconcileConfig;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use jd_core::FieldTarget;
use serde::{Deserialize, Serialize};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "JIRA_DEFAULTS_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JdConfig {
    #[serde(default)]
    pub jira: JiraConfig,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    #[serde(default)]
    pub fields: Vec<FieldTarget>,
}

impl JdConfig {
    /// Load and validate configuration from `path` plus environment overrides.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileNotFound`] if `path` does not exist, a
    /// figment error if extraction fails, or a validation error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let config: Self = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// Loads `.env` from the config file's directory, falling back to the
    /// current directory, before building the figment.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv(path: &Path) -> Result<Self, ConfigError> {
        Self::load_dotenv_near(path);
        Self::load(path)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can extract without validation or add providers.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Check required connection values and the field declarations.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] for missing required values and
    /// [`ConfigError::InvalidValue`] for malformed field declarations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("jira.url", &self.jira.url),
            ("jira.email", &self.jira.email),
            ("jira.token", &self.jira.token),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::NotConfigured { key: key.to_string() });
            }
        }

        if self.fields.is_empty() {
            return Err(ConfigError::NotConfigured {
                key: "fields".to_string(),
            });
        }

        if self.reconcile.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reconcile.page_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let mut names = HashSet::new();
        for field in &self.fields {
            if field.field_name.trim().is_empty() {
                return Err(invalid("fields.name", "must not be empty"));
            }
            if field.field_id.trim().is_empty() {
                return Err(invalid(
                    &format!("fields.{}.id", field.field_name),
                    "must not be empty",
                ));
            }
            if !names.insert(field.field_name.as_str()) {
                return Err(invalid(
                    &format!("fields.{}", field.field_name),
                    "declared more than once",
                ));
            }
            if field.projects.is_empty() {
                return Err(invalid(
                    &format!("fields.{}.projects", field.field_name),
                    "at least one project is required",
                ));
            }

            let mut keys = HashSet::new();
            for project in &field.projects {
                if project.key.trim().is_empty() {
                    return Err(invalid(
                        &format!("fields.{}.projects.key", field.field_name),
                        "must not be empty",
                    ));
                }
                if !keys.insert(project.key.as_str()) {
                    return Err(invalid(
                        &format!("fields.{}.projects.{}", field.field_name, project.key),
                        "declared more than once",
                    ));
                }
            }
        }

        Ok(())
    }

    /// Load `.env` next to the config file, else from the current directory.
    /// Silently does nothing if no `.env` is found.
    fn load_dotenv_near(path: &Path) {
        let candidate = path
            .parent()
            .map_or_else(|| PathBuf::from(".env"), |dir| dir.join(".env"));
        if candidate.exists() {
            let _ = dotenvy::from_path(&candidate);
            return;
        }
        let _ = dotenvy::dotenv();
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jd_core::ProjectTarget;

    fn valid() -> JdConfig {
        JdConfig {
            jira: JiraConfig {
                url: "https://example.atlassian.net".into(),
                email: "ops@example.com".into(),
                token: "t".into(),
                ..Default::default()
            },
            reconcile: ReconcileConfig::default(),
            fields: vec![FieldTarget {
                field_id: "customfield_10050".into(),
                field_name: "LOB".into(),
                projects: vec![ProjectTarget {
                    key: "ABC".into(),
                    value: "Platform".into(),
                }],
            }],
        }
    }

    #[test]
    fn default_config_is_not_valid() {
        let err = JdConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::NotConfigured { key } if key == "jira.url"));
    }

    #[test]
    fn valid_config_passes() {
        valid().validate().expect("valid config");
    }

    #[test]
    fn missing_token_is_reported_by_key() {
        let mut config = valid();
        config.jira.token = "  ".into();
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "Missing required configuration: jira.token");
    }

    #[test]
    fn empty_fields_rejected() {
        let mut config = valid();
        config.fields.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotConfigured { key }) if key == "fields"
        ));
    }

    #[test]
    fn duplicate_project_rejected() {
        let mut config = valid();
        config.fields[0].projects.push(ProjectTarget {
            key: "ABC".into(),
            value: "Infra".into(),
        });
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn duplicate_field_name_rejected() {
        let mut config = valid();
        let dup = config.fields[0].clone();
        config.fields.push(dup);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn zero_page_size_rejected() {
        let mut config = valid();
        config.reconcile.page_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = JdConfig::load(Path::new("/nonexistent/jira-defaults.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
