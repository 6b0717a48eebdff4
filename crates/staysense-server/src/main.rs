//! StaySense
//!
//! `staysense serve` answers `/analyze` requests from a trained model
//! directory. `staysense train` builds that directory from a review corpus.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use staysense_pipeline::{read_reviews_jsonl, TrainingConfig, TrainingPipeline};
use staysense_server::cli::{Cli, Commands};
use staysense_server::config::{ServeOverrides, ServerConfig};
use staysense_server::state::{build_normalizer, AppState};
use staysense_server::create_router;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            artifacts,
            oracle_url,
            listen,
            port,
            verbose,
        } => {
            init_tracing(verbose);
            let overrides = ServeOverrides {
                artifacts,
                oracle_url,
                listen,
                port,
            };
            serve(&config, &overrides).await
        }

        Commands::Train {
            corpus,
            output,
            training_config,
            tables,
            verbose,
        } => {
            init_tracing(verbose);
            train(&corpus, &output, training_config.as_deref(), tables.as_deref()).await
        }
    }
}

async fn serve(config_path: &str, overrides: &ServeOverrides) -> Result<()> {
    info!("Starting StaySense server");

    let config = ServerConfig::load(config_path, overrides)?;
    info!("Artifacts: {}", config.artifacts_dir.display());

    let metrics_handle = init_metrics()?;

    // Refuses to start on any artifact problem
    let state = AppState::from_config(&config, metrics_handle)?;

    let addr: SocketAddr = format!("{}:{}", config.listen, config.port).parse()?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn train(
    corpus: &Path,
    output: &Path,
    config_path: Option<&Path>,
    tables: Option<&Path>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => TrainingConfig::from_file(path)?,
        None => TrainingConfig::default(),
    };
    let normalizer = Arc::new(build_normalizer(tables)?);
    let records = read_reviews_jsonl(corpus)?;

    let pipeline = TrainingPipeline::new(config, normalizer);
    let outcome = pipeline.run(&records).await?;
    pipeline.persist(&outcome.artifacts, output)?;

    let report = &outcome.report;
    info!(
        "Training complete: test accuracy {:.4}, precision {:.4}, recall {:.4}, f1 {:.4}",
        report.test_accuracy, report.test_precision, report.test_recall, report.test_f1
    );
    info!(
        "Best threshold {:.3} (validation f1 {:.4}), artifacts in {}",
        report.best_threshold,
        report.best_f1_score,
        output.display()
    );
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("staysense=debug,staysense_pipeline=debug,staysense_server=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("staysense=info,staysense_pipeline=info,staysense_server=info")
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "staysense_requests_total",
        "Total number of analyze requests received"
    );
    metrics::describe_counter!(
        "staysense_predictions_total",
        "Total number of predictions by sentiment"
    );
    metrics::describe_histogram!(
        "staysense_prediction_latency_us",
        metrics::Unit::Microseconds,
        "End-to-end prediction latency in microseconds"
    );
    metrics::describe_counter!("staysense_errors_total", "Total number of errors by kind");

    info!("Metrics exporter initialized");
    Ok(handle)
}
