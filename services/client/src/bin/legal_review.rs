//! services/client/src/bin/legal_review.rs

use clap::Parser;
use client_lib::{
    adapters::HttpGateway,
    cli::{self, Cli},
    config::Config,
    error::AppError,
};
use legal_review_core::{
    MutationCoordinator, ProgressConfig, RandomIncrements, UploadProgressEstimator,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!(base_url = %config.api_base_url, "Configuration loaded.");

    // --- 2. Initialize the Backend Adapter ---
    let gateway = Arc::new(HttpGateway::new(
        config.api_base_url.clone(),
        config.request_timeout,
    )?);

    // --- 3. Build the Coordinator ---
    let progress = UploadProgressEstimator::new(
        ProgressConfig {
            tick: config.progress_tick,
            hold: config.progress_hold,
            ..ProgressConfig::default()
        },
        RandomIncrements::new(),
    );
    let coordinator = Arc::new(MutationCoordinator::with_progress(gateway, progress));

    // --- 4. Run the Command ---
    let result = cli::run(cli.command, coordinator.clone()).await;
    coordinator.shutdown();
    result
}
