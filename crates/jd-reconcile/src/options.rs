//! Resolution of a human-readable target value to a field option id.

use std::collections::HashMap;

use jd_core::{FailureReason, FieldOption};
use jd_jira::JiraApi;

/// How long a fetched option list is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionCachePolicy {
    /// Fetch the option list on every resolution.
    #[default]
    PerCall,
    /// Reuse a successfully fetched list until [`OptionResolver::reset`],
    /// which the orchestrator calls at the start of each project.
    PerProject,
}

impl OptionCachePolicy {
    #[must_use]
    pub const fn from_config(cache_options: bool) -> Self {
        if cache_options {
            Self::PerProject
        } else {
            Self::PerCall
        }
    }
}

#[derive(Debug, Default)]
pub struct OptionResolver {
    policy: OptionCachePolicy,
    cache: HashMap<String, Vec<FieldOption>>,
}

impl OptionResolver {
    #[must_use]
    pub fn new(policy: OptionCachePolicy) -> Self {
        Self {
            policy,
            cache: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn policy(&self) -> OptionCachePolicy {
        self.policy
    }

    /// Drop every cached option list.
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    /// The option of `field_id` whose value is exactly `target`.
    ///
    /// # Errors
    ///
    /// [`FailureReason::OptionNotFound`] when no option matches, and also
    /// when the option list could not be fetched.
    pub async fn resolve<A: JiraApi + ?Sized>(
        &mut self,
        api: &A,
        field_id: &str,
        target: &str,
    ) -> Result<FieldOption, FailureReason> {
        let not_found = || FailureReason::OptionNotFound {
            value: target.to_string(),
        };

        if self.policy == OptionCachePolicy::PerProject {
            if let Some(options) = self.cache.get(field_id) {
                return match_option(options, target).cloned().ok_or_else(not_found);
            }
        }

        let options = match api.field_options(field_id).await {
            Ok(options) => options,
            Err(error) => {
                tracing::debug!(field_id, %error, "option list unavailable");
                return Err(not_found());
            }
        };
        let resolved = match_option(&options, target).cloned().ok_or_else(not_found);
        if self.policy == OptionCachePolicy::PerProject {
            self.cache.insert(field_id.to_string(), options);
        }
        resolved
    }
}

/// Case-sensitive exact match on the option's display value.
#[must_use]
pub fn match_option<'a>(options: &'a [FieldOption], target: &str) -> Option<&'a FieldOption> {
    options.iter().find(|o| o.value == target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeJira;
    use jd_core::OptionId;
    use rstest::rstest;

    const LOB: &str = "customfield_10050";

    fn option(id: &str, value: &str) -> FieldOption {
        FieldOption {
            id: OptionId::new(id),
            value: value.into(),
        }
    }

    #[rstest]
    #[case("Platform", Some("1"))]
    #[case("Infra", Some("2"))]
    #[case("platform", None)]
    #[case("Platform ", None)]
    #[case("", None)]
    fn match_is_exact(#[case] target: &str, #[case] expected: Option<&str>) {
        let options = [option("1", "Platform"), option("2", "Infra")];
        assert_eq!(
            match_option(&options, target).map(|o| o.id.as_str()),
            expected
        );
    }

    #[tokio::test]
    async fn per_call_fetches_every_time() {
        let api = FakeJira::new().with_select_field(LOB, "LOB", &["Platform"]);
        let mut resolver = OptionResolver::new(OptionCachePolicy::PerCall);

        for _ in 0..3 {
            let opt = resolver.resolve(&api, LOB, "Platform").await.unwrap();
            assert_eq!(opt.value, "Platform");
        }
        assert_eq!(api.calls().field_options, 3);
    }

    #[tokio::test]
    async fn per_project_fetches_once_until_reset() {
        let api = FakeJira::new().with_select_field(LOB, "LOB", &["Platform"]);
        let mut resolver = OptionResolver::new(OptionCachePolicy::PerProject);

        resolver.resolve(&api, LOB, "Platform").await.unwrap();
        resolver.resolve(&api, LOB, "Platform").await.unwrap();
        assert!(resolver.resolve(&api, LOB, "Missing").await.is_err());
        assert_eq!(api.calls().field_options, 1);

        resolver.reset();
        resolver.resolve(&api, LOB, "Platform").await.unwrap();
        assert_eq!(api.calls().field_options, 2);
    }

    #[tokio::test]
    async fn fetch_failure_is_not_found_and_not_cached() {
        let api = FakeJira::new().failing_options();
        let mut resolver = OptionResolver::new(OptionCachePolicy::PerProject);

        let err = resolver.resolve(&api, LOB, "Platform").await.unwrap_err();
        assert_eq!(
            err,
            FailureReason::OptionNotFound {
                value: "Platform".into()
            }
        );
        resolver.resolve(&api, LOB, "Platform").await.unwrap_err();
        assert_eq!(api.calls().field_options, 2);
    }
}
