//! Shared application state

use crate::config::{OracleConfig, ServerConfig};
use anyhow::Context;
use metrics_exporter_prometheus::PrometheusHandle;
use staysense_core::Error;
use staysense_pipeline::artifacts::NORMALIZER_FILE;
use staysense_pipeline::{
    ModelArtifacts, NormalizerTables, Normalizer, NounLemmatizer, RemoteOracle, ScoringOracle,
    SentimentEngine,
};
use std::sync::Arc;
use tracing::info;

/// State handed to every request handler
#[derive(Clone)]
pub struct AppState {
    /// Immutable after startup
    pub engine: Arc<SentimentEngine>,

    /// Renders the Prometheus exposition for `/metrics`
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    pub fn new(engine: Arc<SentimentEngine>, metrics_handle: PrometheusHandle) -> Self {
        Self {
            engine,
            metrics_handle,
        }
    }

    /// Load artifacts and build the engine; any failure aborts startup
    pub fn from_config(config: &ServerConfig, metrics_handle: PrometheusHandle) -> anyhow::Result<Self> {
        let artifacts = ModelArtifacts::load(&config.artifacts_dir)
            .with_context(|| format!("loading artifacts from {}", config.artifacts_dir.display()))?;

        // Serving must tokenize exactly as training did
        if let Some(path) = config.tables.as_deref() {
            let configured = NormalizerTables::from_file(path)
                .with_context(|| format!("loading normalizer tables from {}", path.display()))?;
            if configured != artifacts.tables {
                return Err(Error::artifact(
                    config.artifacts_dir.join(NORMALIZER_FILE),
                    format!(
                        "tables in {} differ from the tables the model was trained with",
                        path.display()
                    ),
                )
                .into());
            }
        }
        let normalizer = Arc::new(artifacts.normalizer()?);

        let oracle: Arc<dyn ScoringOracle> = match &config.oracle {
            OracleConfig::NaiveBayes => Arc::new(artifacts.require_oracle()?.clone()),
            OracleConfig::Remote { url } => Arc::new(RemoteOracle::new(url.clone())),
        };
        info!("Scoring with {} oracle", oracle.name());

        let engine = SentimentEngine::from_artifacts(normalizer, &artifacts, oracle)?;
        info!(
            "Engine ready (sequence length {}, threshold {:.3})",
            engine.sequence_length(),
            engine.threshold()
        );

        Ok(Self::new(Arc::new(engine), metrics_handle))
    }
}

/// Built-in English tables unless a replacement file is given
pub fn build_normalizer(tables: Option<&std::path::Path>) -> anyhow::Result<Normalizer> {
    let tables = match tables {
        Some(path) => NormalizerTables::from_file(path)
            .with_context(|| format!("loading normalizer tables from {}", path.display()))?,
        None => NormalizerTables::english(),
    };
    Ok(Normalizer::new(&tables, Arc::new(NounLemmatizer))?)
}
