use std::path::PathBuf;

use clap::Parser;

pub mod global;

pub use global::{GlobalFlags, OutputFormat, ProgressMode};

/// Top-level CLI parser for the `jira-defaults` binary.
#[derive(Debug, Parser)]
#[command(
    name = "jira-defaults",
    version,
    about = "Backfill custom field defaults across Jira projects and keep an automation rule in sync"
)]
pub struct Cli {
    /// Path to the TOML configuration file
    pub config: PathBuf,

    /// Compute and report changes without applying them
    #[arg(long)]
    pub dry_run: bool,

    /// Output format: summary, json, table
    #[arg(short, long, default_value = "summary")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory for the daily log file
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// Log to the console only
    #[arg(long)]
    pub no_log_file: bool,

    /// Progress bar: auto, on, off
    #[arg(long, default_value = "auto")]
    pub progress: ProgressMode,
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            dry_run: self.dry_run,
            quiet: self.quiet,
            verbose: self.verbose,
            progress: self.progress,
            log_dir: (!self.no_log_file).then(|| self.log_dir.clone()),
        }
    }
}
