//! Error types for StaySense

use std::path::PathBuf;

/// Result type alias using StaySense's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for StaySense operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Vocabulary fitting was given no documents
    #[error("cannot fit a vocabulary on an empty corpus")]
    EmptyCorpus,

    /// The scoring oracle failed or produced an unusable value
    #[error("scoring failure: {0}")]
    ScoringFailure(String),

    /// A persisted artifact is missing or malformed
    #[error("failed to load artifact {}: {reason}", path.display())]
    ArtifactLoad { path: PathBuf, reason: String },

    /// Threshold calibration received invalid input
    #[error("calibration error: {0}")]
    Calibration(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new scoring failure
    pub fn scoring(msg: impl Into<String>) -> Self {
        Self::ScoringFailure(msg.into())
    }

    /// Create a new artifact load error
    pub fn artifact(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ArtifactLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new calibration error
    pub fn calibration(msg: impl Into<String>) -> Self {
        Self::Calibration(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Short machine-readable kind, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyCorpus => "empty_corpus",
            Self::ScoringFailure(_) => "scoring_failure",
            Self::ArtifactLoad { .. } => "artifact_load",
            Self::Calibration(_) => "calibration",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) => "internal",
        }
    }
}
