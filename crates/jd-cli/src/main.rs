use anyhow::Context;
use clap::Parser;
use jd_jira::JiraClient;
use jd_reconcile::{FanoutSink, TracingSink};

mod bootstrap;
mod cli;
mod logging;
mod output;
mod progress;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("jira-defaults error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let flags = cli.global_flags();
    let log_file = logging::init_tracing(&flags)?;
    ui::init(&flags);

    let config = bootstrap::load_config(&cli.config)?;
    let client = JiraClient::from_config(&config.jira).context("failed to build Jira client")?;

    if flags.dry_run {
        tracing::info!("dry run: no issues or automation rules will be changed");
    }

    let tracing_sink = TracingSink;
    let progress_sink = progress::ProgressSink::new();
    let sink = FanoutSink::new().with(&tracing_sink).with(&progress_sink);

    let results = match jd_reconcile::reconcile(&client, &config, flags.dry_run, &sink).await {
        Ok(results) => results,
        Err(error) => {
            let hint = error.hint();
            let error = anyhow::Error::from(error);
            return Err(match hint {
                Some(hint) => error.context(hint),
                None => error,
            });
        }
    };

    tracing::info!(
        found = results.total_found(),
        updated = results.total_updated(),
        failed = results.total_failed(),
        "run complete"
    );
    output::output(&results, flags.format, flags.dry_run, log_file.as_deref())
}
