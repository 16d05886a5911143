use std::path::Path;

use anyhow::Context;
use jd_config::{ENV_PREFIX, JdConfig};

/// Load `.env`, then the config file with environment overrides.
pub fn load_config(path: &Path) -> anyhow::Result<JdConfig> {
    let loaded = JdConfig::load_with_dotenv(path);
    if loaded.is_err() {
        for warning in collect_env_warnings(std::env::vars()) {
            tracing::warn!("{warning}");
        }
    }
    loaded.with_context(|| format!("failed to load configuration from {}", path.display()))
}

/// Warn about `JIRA_DEFAULTS_*` keys that use a single underscore between
/// section and key, which figment silently ignores.
fn collect_env_warnings<I>(env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut warnings = Vec::new();
    for (key, _) in env {
        let Some(rest) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        for section in ["JIRA", "RECONCILE"] {
            let single = format!("{section}_");
            let double = format!("{section}__");
            if rest.starts_with(&single) && !rest.starts_with(&double) {
                let suggested = format!("{ENV_PREFIX}{double}{}", &rest[single.len()..]);
                warnings.push(format!(
                    "{key} is ignored. Use double underscores (example: {suggested})."
                ));
            }
        }
    }
    warnings.sort();
    warnings
}
