//! Persisted model artifacts
//!
//! A model directory holds one JSON file per artifact:
//! - `vocabulary.json`: token ids plus the OOV and pad ids
//! - `sequence_length.json`: the fixed encoding length
//! - `calibration.json`: the chosen threshold and its metrics table
//! - `metrics.json`: held-out evaluation report (optional)
//! - `oracle.json`: naive Bayes parameters (optional)
//! - `normalizer.json`: the lexical tables used to normalize the corpus
//!
//! Loading is all-or-nothing: a missing or malformed required file fails the
//! whole load so a service never starts half-initialized.

use crate::calibrator::CalibrationResult;
use crate::evaluation::EvaluationReport;
use crate::lemmatizer::NounLemmatizer;
use crate::naive_bayes::NaiveBayesOracle;
use crate::normalizer::Normalizer;
use crate::tables::NormalizerTables;
use crate::vectorizer::{Vectorizer, Vocabulary, MAX_SEQUENCE_LENGTH};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use staysense_core::{Error, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub const VOCABULARY_FILE: &str = "vocabulary.json";
pub const SEQUENCE_LENGTH_FILE: &str = "sequence_length.json";
pub const CALIBRATION_FILE: &str = "calibration.json";
pub const METRICS_FILE: &str = "metrics.json";
pub const ORACLE_FILE: &str = "oracle.json";
pub const NORMALIZER_FILE: &str = "normalizer.json";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SequenceLengthFile {
    sequence_length: usize,
}

/// Everything serving needs from a training run
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub vocabulary: Vocabulary,
    pub sequence_length: usize,
    pub calibration: CalibrationResult,
    pub report: Option<EvaluationReport>,
    pub oracle: Option<NaiveBayesOracle>,
    pub tables: NormalizerTables,
}

impl ModelArtifacts {
    /// Vectorizer equivalent to the one used at training time
    pub fn vectorizer(&self) -> Vectorizer {
        Vectorizer::new(self.vocabulary.clone(), self.sequence_length)
    }

    /// Normalizer that reproduces the training token streams
    pub fn normalizer(&self) -> Result<Normalizer> {
        Normalizer::new(&self.tables, Arc::new(NounLemmatizer))
    }

    /// Calibrated decision threshold
    pub fn threshold(&self) -> f32 {
        self.calibration.threshold
    }

    /// The persisted naive Bayes oracle, or an artifact error if none was saved
    pub fn require_oracle(&self) -> Result<&NaiveBayesOracle> {
        self.oracle
            .as_ref()
            .ok_or_else(|| Error::artifact(ORACLE_FILE, "no oracle was saved with these artifacts"))
    }

    /// Write every artifact into `dir`, creating it if needed
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        write_json(&dir.join(VOCABULARY_FILE), &self.vocabulary)?;
        write_json(
            &dir.join(SEQUENCE_LENGTH_FILE),
            &SequenceLengthFile {
                sequence_length: self.sequence_length,
            },
        )?;
        write_json(&dir.join(CALIBRATION_FILE), &self.calibration)?;
        write_json(&dir.join(NORMALIZER_FILE), &self.tables)?;
        if let Some(report) = &self.report {
            write_json(&dir.join(METRICS_FILE), report)?;
        }
        if let Some(oracle) = &self.oracle {
            write_json(&dir.join(ORACLE_FILE), oracle)?;
        }

        info!("Saved model artifacts to {}", dir.display());
        Ok(())
    }

    /// Load and validate artifacts from `dir`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();

        let vocab_path = dir.join(VOCABULARY_FILE);
        let mut vocabulary: Vocabulary = read_json(&vocab_path)?;
        vocabulary.rebuild_index();
        vocabulary
            .validate()
            .map_err(|reason| Error::artifact(&vocab_path, reason))?;

        let length_path = dir.join(SEQUENCE_LENGTH_FILE);
        let SequenceLengthFile { sequence_length } = read_json(&length_path)?;
        if sequence_length == 0 || sequence_length > MAX_SEQUENCE_LENGTH {
            return Err(Error::artifact(
                &length_path,
                format!("sequence length {sequence_length} is outside 1..={MAX_SEQUENCE_LENGTH}"),
            ));
        }

        let calibration_path = dir.join(CALIBRATION_FILE);
        let calibration: CalibrationResult = read_json(&calibration_path)?;
        let threshold = calibration.threshold;
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(Error::artifact(
                &calibration_path,
                format!("threshold {threshold} is outside (0, 1)"),
            ));
        }

        let tables_path = dir.join(NORMALIZER_FILE);
        let tables: NormalizerTables = read_json(&tables_path)?;
        Normalizer::new(&tables, Arc::new(NounLemmatizer))
            .map_err(|e| Error::artifact(&tables_path, e.to_string()))?;

        let report = read_optional_json::<EvaluationReport>(&dir.join(METRICS_FILE))?;

        let oracle_path = dir.join(ORACLE_FILE);
        let oracle = read_optional_json::<NaiveBayesOracle>(&oracle_path)?;
        if let Some(oracle) = &oracle {
            oracle
                .validate()
                .map_err(|reason| Error::artifact(&oracle_path, reason))?;
            if oracle.id_space() != vocabulary.id_space() {
                return Err(Error::artifact(
                    &oracle_path,
                    format!(
                        "oracle covers {} ids but the vocabulary emits {}",
                        oracle.id_space(),
                        vocabulary.id_space()
                    ),
                ));
            }
            if oracle.pad_id() != vocabulary.pad_id() {
                return Err(Error::artifact(
                    &oracle_path,
                    format!(
                        "oracle skips id {} as padding but the vocabulary pads with {}",
                        oracle.pad_id(),
                        vocabulary.pad_id()
                    ),
                ));
            }
        }

        info!(
            "Loaded model artifacts from {} ({} tokens, length {}, threshold {:.3})",
            dir.display(),
            vocabulary.len(),
            sequence_length,
            threshold
        );

        Ok(Self {
            vocabulary,
            sequence_length,
            calibration,
            report,
            oracle,
            tables,
        })
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::artifact(path, e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| Error::artifact(path, e.to_string()))
}

fn read_optional_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if path.exists() {
        read_json(path).map(Some)
    } else {
        Ok(None)
    }
}
