//! Mempool Fee Estimator Server - HTTP API for fee-per-cost estimation

use anyhow::{Context, Result};
use clap::Parser;
use mempool_fee_estimator::{FeeEstimator, FeeLedger};
use mempool_fee_estimator_server::{
    cli::{Cli, DEFAULT_LOG_FILTER},
    config::AppConfig,
    server::{create_app, run_server},
    service::FeeTracker,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing to stderr; --log-filter wins over RUST_LOG
    let filter = match &cli.log_filter {
        Some(filter) => tracing_subscriber::EnvFilter::try_new(filter)
            .with_context(|| format!("Invalid log filter: {filter}"))?,
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();

    info!("Mempool Fee Estimator Server starting...");

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        None => AppConfig::load().context("Failed to load configuration")?,
    };
    cli.apply(&mut config);

    if cli.print_config {
        print!("{}", config.to_yaml().context("Failed to render configuration")?);
        return Ok(());
    }

    info!("Configuration loaded:");
    info!("  Server: {}:{}", config.server.host, config.server.port);
    info!(
        "  Estimator: percentile {}, window {}x target, {}s per block",
        config.estimator.percentile,
        config.estimator.smoothing_multiplier,
        config.estimator.seconds_per_block
    );
    info!(
        "  Ledger: keeping {} blocks, pruning every {}s",
        config.ledger.retention_blocks, config.ledger.prune_interval_secs
    );

    // Initialize fee estimator and ledger
    let fee_estimator =
        FeeEstimator::with_config(config.estimator.clone()).context("Invalid estimator configuration")?;
    let ledger = FeeLedger::with_config(config.ledger.to_ledger_config())
        .context("Invalid ledger configuration")?;

    let tracker = Arc::new(FeeTracker::new(fee_estimator, ledger, cli.start_height));

    // Spawn periodic pruning task
    let tracker_pruning = tracker.clone();
    let retention_blocks = config.ledger.retention_blocks;
    let prune_interval_secs = config.ledger.prune_interval_secs;
    tokio::spawn(async move {
        tracker_pruning
            .run_pruning(retention_blocks, prune_interval_secs)
            .await;
    });

    // Create and run HTTP server
    let app = create_app(tracker);

    run_server(app, config.server.host, config.server.port)
        .await
        .context("Failed to run HTTP server")?;

    info!("Mempool Fee Estimator Server shut down");

    Ok(())
}
