use std::path::PathBuf;

use clap::ValueEnum;

/// How the run result is printed to stdout.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Per field and project: issues found, updated, rule status.
    Summary,
    Json,
    Table,
}

/// Progress bar display mode.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ProgressMode {
    Auto,
    On,
    Off,
}

/// Flags shared by the bootstrap, logging and output layers.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub dry_run: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub progress: ProgressMode,
    /// Directory for the daily log file, `None` when file logging is off.
    pub log_dir: Option<PathBuf>,
}
