//! fpds-task-orders - fetch FPDS task orders for every IDV in the contractor list
//!
//! Configuration comes from the environment (see [`Config::from_env`]).
//! Progress goes to stdout; diagnostics go to stderr through `tracing`.

use anyhow::{Context, Result};
use clap::Parser;
use fpds_task_orders::batch::load_contractors;
use fpds_task_orders::{BatchRunner, CheckpointStore, Config, FpdsClient, Reporter};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "fpds-task-orders")]
#[command(about = "Fetch task orders under each IDV from the FPDS ATOM feed")]
#[command(version)]
struct Args {
    /// Continue a previous run from its output or progress file
    #[arg(long)]
    resume: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let mut reporter = Reporter::stdout();
    reporter.loading(&config.paths.input_file)?;
    let contractors = load_contractors(&config.paths.input_file)
        .await
        .with_context(|| {
            format!(
                "Failed to read contractors from {}",
                config.paths.input_file.display()
            )
        })?;
    reporter.loaded(contractors.len(), config.batch.request_delay)?;

    let checkpoint = if args.resume {
        CheckpointStore::resume(&config.paths.output_file, &config.paths.progress_file)
            .await
            .context("Failed to load resume state")?
    } else {
        CheckpointStore::fresh(&config.paths.progress_file)
    };
    reporter.resumed(&checkpoint)?;

    let client = FpdsClient::new(config.feed.clone(), config.retry.clone())
        .context("Failed to build feed client")?;

    info!(
        feed = %config.feed.base_url,
        resume = args.resume,
        "Starting task order fetch"
    );

    let mut runner = BatchRunner::new(client, &config, checkpoint, reporter);
    runner
        .run(&contractors)
        .await
        .context("Batch run aborted")?;

    Ok(())
}
