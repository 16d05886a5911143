use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use chrono::NaiveDate;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::GlobalFlags;
use crate::progress::BarAwareStderr;

/// Overrides the level chosen by `--quiet` / `--verbose`.
pub const LOG_ENV: &str = "JIRA_DEFAULTS_LOG";

/// Install the console subscriber and, unless disabled, the daily log file.
///
/// Console lines go through [`BarAwareStderr`] so they do not tear an active
/// progress bar.
///
/// Returns the log file path when file logging is on.
pub fn init_tracing(flags: &GlobalFlags) -> anyhow::Result<Option<PathBuf>> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level(flags.quiet, flags.verbose)));

    let (file_layer, path) = match &flags.log_dir {
        Some(dir) => {
            let path = log_file_path(dir, chrono::Local::now().date_naive());
            let file = open_log_file(&path)?;
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false);
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(|| BarAwareStderr)
                .with_target(false),
        )
        .with(file_layer)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(path)
}

const fn default_level(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}

/// `{dir}/jira_update_YYYYMMDD.log`
#[must_use]
pub fn log_file_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("jira_update_{}.log", date.format("%Y%m%d")))
}

fn open_log_file(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}
