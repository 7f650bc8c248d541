// src/main.rs

use clap::Parser;
use siftline::config::{load_pipeline_config, Args, PipelineConfig};
use siftline::error::Result;
use siftline::runner::{execute_run, log_run_summary};
use siftline::utils::setup_prometheus_metrics;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")); // Default to info if RUST_LOG is not set
    // The guard flushes buffered log lines when main returns.
    let _guard = match &args.log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            fmt::Subscriber::builder()
                .with_env_filter(filter)
                .json()
                .with_writer(writer)
                .init();
            Some(guard)
        }
        None => {
            fmt::Subscriber::builder().with_env_filter(filter).init();
            None
        }
    };

    // --- Optional: Start Metrics Endpoint ---
    setup_prometheus_metrics(args.metrics_port).await?;

    info!("Pipeline starting.");
    let config = match &args.pipeline_config {
        Some(path) => {
            info!("Loading pipeline configuration from: {}", path.display());
            load_pipeline_config(path)?
        }
        None => {
            info!("No configuration file given; using the built-in junior chain.");
            PipelineConfig::default_chain()
        }
    };

    if args.validate_config {
        info!("Configuration is valid. Exiting (--validate-config).");
        return Ok(());
    }

    let summary = execute_run(&config, &args).await?;
    log_run_summary(&summary);

    Ok(())
}
