use std::io::{self, Write};
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};
use jd_core::ReconcileEvent;
use jd_reconcile::EventSink;

use crate::ui;

pub struct Progress {
    bar: Option<ProgressBar>,
}

/// The bar currently drawn on stderr, if any.
static ACTIVE_BAR: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn set_active_bar(bar: Option<ProgressBar>) {
    *ACTIVE_BAR.lock().unwrap_or_else(|e| e.into_inner()) = bar;
}

fn active_bar() -> Option<ProgressBar> {
    ACTIVE_BAR.lock().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Stderr writer for the console log layer.
///
/// Each write hides the active bar, writes, and redraws it, so log lines
/// never land in the middle of a bar.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarAwareStderr;

impl Write for BarAwareStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let write_all = || io::stderr().write_all(buf).map(|()| buf.len());
        match active_bar() {
            Some(bar) => bar.suspend(write_all),
            None => write_all(),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

fn terminal_columns() -> Option<usize> {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
}

fn bar_template() -> &'static str {
    match terminal_columns() {
        Some(cols) if cols >= 110 => "{bar:40.cyan/blue} {pos}/{len} {msg}",
        Some(cols) if cols >= 80 => "{wide_bar:.cyan/blue} {pos}/{len} {msg}",
        _ => "{wide_bar:.cyan/blue} {percent}% {msg}",
    }
}

impl Progress {
    #[must_use]
    pub fn bar(total: u64, message: &str) -> Self {
        if !ui::prefs().progress {
            return Self { bar: None };
        }

        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template(bar_template())
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message(message.to_string());
        Self::shown(bar)
    }

    fn shown(bar: ProgressBar) -> Self {
        set_active_bar(Some(bar.clone()));
        Self { bar: Some(bar) }
    }

    pub fn inc(&self, delta: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(delta);
        }
    }

    pub fn finish_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
            set_active_bar(None);
        }
    }
}

/// Drives one bar per project backfill from reconcile events.
#[derive(Default)]
pub struct ProgressSink {
    current: Mutex<Option<Progress>>,
}

impl ProgressSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for ProgressSink {
    fn emit(&self, event: &ReconcileEvent) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        match event {
            ReconcileEvent::CandidatesFound {
                project_key, count, ..
            } if *count > 0 => {
                let total = u64::try_from(*count).unwrap_or(u64::MAX);
                *current = Some(Progress::bar(total, project_key));
            }
            ReconcileEvent::IssueUpdated { .. }
            | ReconcileEvent::IssueSimulated { .. }
            | ReconcileEvent::IssueFailed { .. } => {
                if let Some(progress) = current.as_ref() {
                    progress.inc(1);
                }
            }
            ReconcileEvent::ProjectCompleted { .. } => {
                if let Some(progress) = current.take() {
                    progress.finish_clear();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_lives_for_one_project() {
        let sink = ProgressSink::new();
        sink.emit(&ReconcileEvent::CandidatesFound {
            project_key: "ABC".into(),
            field_id: "customfield_1".into(),
            count: 2,
        });
        assert!(sink.current.lock().unwrap().is_some());

        sink.emit(&ReconcileEvent::ProjectCompleted {
            field_name: "LOB".into(),
            project_key: "ABC".into(),
            issues_found: 2,
            issues_updated: 2,
            automation_rule: true,
        });
        assert!(sink.current.lock().unwrap().is_none());
    }

    #[test]
    fn empty_projects_get_no_bar() {
        let sink = ProgressSink::new();
        sink.emit(&ReconcileEvent::CandidatesFound {
            project_key: "ABC".into(),
            field_id: "customfield_1".into(),
            count: 0,
        });
        assert!(sink.current.lock().unwrap().is_none());
    }

    #[test]
    fn log_lines_suspend_the_active_bar() {
        let progress = Progress::shown(ProgressBar::hidden());
        assert!(active_bar().is_some());

        let mut writer = BarAwareStderr;
        assert_eq!(writer.write(b"").unwrap(), 0);
        writer.flush().unwrap();

        progress.finish_clear();
        assert!(active_bar().is_none());
        assert_eq!(BarAwareStderr.write(b"").unwrap(), 0);
    }
}
