//! Offline training pipeline
//!
//! Each stage takes its inputs explicitly and returns its outputs, so stages
//! can be run and inspected one at a time:
//!
//! ```text
//! prepare -> fit -> split -> train_oracle -> calibrate -> evaluate -> persist
//! ```
//!
//! `run` chains them with the configured seeds and yields identical artifacts
//! for identical input.

use crate::artifacts::ModelArtifacts;
use crate::calibrator::{calibrate, CalibrationResult, ThresholdGrid};
use crate::evaluation::EvaluationReport;
use crate::naive_bayes::NaiveBayesOracle;
use crate::normalizer::{NormalizedTokens, Normalizer};
use crate::oracle::ScoringOracle;
use crate::sampler::{balance, label_from_rating};
use crate::split::stratified_split;
use crate::vectorizer::{EncodedSequence, Vectorizer, VectorizerConfig};
use serde::{Deserialize, Serialize};
use staysense_core::{Error, LabeledReview, RawReview, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Training settings, loadable from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Seed for class balancing
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Seed for both stratified splits
    #[serde(default = "default_split_seed")]
    pub split_seed: u64,

    /// Share of balanced data used for training; the rest is the test split
    #[serde(default = "default_train_fraction")]
    pub train_fraction: f64,

    /// Share of the training split used to fit the oracle; the rest validates
    #[serde(default = "default_fit_fraction")]
    pub fit_fraction: f64,

    #[serde(default)]
    pub vectorizer: VectorizerConfig,

    #[serde(default)]
    pub grid: ThresholdGrid,

    /// Naive Bayes additive smoothing
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            split_seed: default_split_seed(),
            train_fraction: default_train_fraction(),
            fit_fraction: default_fit_fraction(),
            vectorizer: VectorizerConfig::default(),
            grid: ThresholdGrid::default(),
            alpha: default_alpha(),
        }
    }
}

fn default_seed() -> u64 {
    42
}

fn default_split_seed() -> u64 {
    100
}

fn default_train_fraction() -> f64 {
    0.70
}

fn default_fit_fraction() -> f64 {
    0.80
}

fn default_alpha() -> f64 {
    1.0
}

impl TrainingConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::config(format!("invalid training config: {e}")))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }
}

/// Normalized documents with binary labels (1 = positive)
#[derive(Debug, Clone, Default)]
pub struct PreparedCorpus {
    pub documents: Vec<NormalizedTokens>,
    pub labels: Vec<u8>,
}

impl PreparedCorpus {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Fixed-length sequences with binary labels
#[derive(Debug, Clone, Default)]
pub struct EncodedCorpus {
    pub sequences: Vec<EncodedSequence>,
    pub labels: Vec<u8>,
}

impl EncodedCorpus {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn from_pairs(pairs: Vec<(EncodedSequence, u8)>) -> Self {
        let (sequences, labels) = pairs.into_iter().unzip();
        Self { sequences, labels }
    }
}

/// Disjoint fit / validation / test partitions
#[derive(Debug, Clone)]
pub struct DataSplits {
    pub train: EncodedCorpus,
    pub validation: EncodedCorpus,
    pub test: EncodedCorpus,
}

/// Everything a training run produced
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifacts: ModelArtifacts,
    pub report: EvaluationReport,
}

pub struct TrainingPipeline {
    config: TrainingConfig,
    normalizer: Arc<Normalizer>,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig, normalizer: Arc<Normalizer>) -> Self {
        Self { config, normalizer }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Label by rating, drop ambiguous reviews, balance classes and normalize
    pub fn prepare(&self, records: &[RawReview]) -> Result<PreparedCorpus> {
        let labeled: Vec<LabeledReview> = records
            .iter()
            .filter_map(|record| {
                label_from_rating(record.rating).map(|label| LabeledReview::new(&record.review, label))
            })
            .collect();
        let dropped = records.len() - labeled.len();
        if dropped > 0 {
            info!("Dropped {} neutral reviews", dropped);
        }

        let balanced = balance(&labeled, |review| review.label.is_positive(), self.config.seed);
        if balanced.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        info!(
            "Balanced corpus to {} reviews per class",
            balanced.len() / 2
        );

        let mut corpus = PreparedCorpus::default();
        for review in &balanced {
            corpus.documents.push(self.normalizer.normalize(&review.text));
            corpus.labels.push(review.label.as_binary());
        }
        let empty = corpus.documents.iter().filter(|doc| doc.is_empty()).count();
        if empty > 0 {
            warn!("{} reviews normalized to no tokens", empty);
        }

        Ok(corpus)
    }

    /// Fit the vectorizer on the prepared corpus and encode every document
    pub fn fit(&self, corpus: &PreparedCorpus) -> Result<(Vectorizer, EncodedCorpus)> {
        let vectorizer = Vectorizer::fit(&corpus.documents, &self.config.vectorizer)?;
        info!(
            "Fitted vocabulary of {} tokens",
            vectorizer.vocabulary().len()
        );

        let encoded = EncodedCorpus {
            sequences: vectorizer.encode_all(&corpus.documents),
            labels: corpus.labels.clone(),
        };
        Ok((vectorizer, encoded))
    }

    /// Stratified test split, then a stratified validation split of the rest
    pub fn split(&self, encoded: EncodedCorpus) -> Result<DataSplits> {
        let pairs: Vec<(EncodedSequence, u8)> =
            encoded.sequences.into_iter().zip(encoded.labels).collect();

        let outer = stratified_split(
            pairs,
            |(_, label)| *label == 1,
            self.config.train_fraction,
            self.config.split_seed,
        )?;
        let inner = stratified_split(
            outer.train,
            |(_, label)| *label == 1,
            self.config.fit_fraction,
            self.config.split_seed,
        )?;

        let splits = DataSplits {
            train: EncodedCorpus::from_pairs(inner.train),
            validation: EncodedCorpus::from_pairs(inner.holdout),
            test: EncodedCorpus::from_pairs(outer.holdout),
        };
        info!(
            "Split into {} train / {} validation / {} test",
            splits.train.len(),
            splits.validation.len(),
            splits.test.len()
        );
        Ok(splits)
    }

    pub fn train_oracle(
        &self,
        train: &EncodedCorpus,
        vectorizer: &Vectorizer,
    ) -> Result<NaiveBayesOracle> {
        let vocabulary = vectorizer.vocabulary();
        NaiveBayesOracle::train(
            &train.sequences,
            &train.labels,
            vocabulary.id_space(),
            vocabulary.pad_id(),
            self.config.alpha,
        )
    }

    /// Choose the F1-maximizing threshold on validation probabilities
    pub fn calibrate(&self, probabilities: &[f32], labels: &[u8]) -> Result<CalibrationResult> {
        calibrate(probabilities, labels, &self.config.grid)
    }

    /// Score the test split at the calibrated threshold
    pub fn evaluate(
        &self,
        probabilities: &[f32],
        splits: &DataSplits,
        calibration: &CalibrationResult,
    ) -> EvaluationReport {
        let report = EvaluationReport::from_test_scores(
            probabilities,
            &splits.test.labels,
            calibration.threshold,
            calibration.f1,
        )
        .with_sizes(splits.train.len(), splits.validation.len());
        info!(
            "Test accuracy {:.4}, f1 {:.4} at threshold {:.3}",
            report.test_accuracy, report.test_f1, report.best_threshold
        );
        report
    }

    pub fn persist(&self, artifacts: &ModelArtifacts, dir: impl AsRef<Path>) -> Result<()> {
        artifacts.save(dir)
    }

    /// Run every stage except `persist`
    pub async fn run(&self, records: &[RawReview]) -> Result<TrainingOutcome> {
        let prepared = self.prepare(records)?;
        let (vectorizer, encoded) = self.fit(&prepared)?;
        let splits = self.split(encoded)?;
        let oracle = self.train_oracle(&splits.train, &vectorizer)?;

        let validation_probabilities = score_all(&oracle, &splits.validation.sequences).await?;
        let calibration = self.calibrate(&validation_probabilities, &splits.validation.labels)?;

        let test_probabilities = score_all(&oracle, &splits.test.sequences).await?;
        let report = self.evaluate(&test_probabilities, &splits, &calibration);

        let artifacts = ModelArtifacts {
            vocabulary: vectorizer.vocabulary().clone(),
            sequence_length: vectorizer.length(),
            calibration,
            report: Some(report.clone()),
            oracle: Some(oracle),
            tables: self.normalizer.tables().clone(),
        };
        Ok(TrainingOutcome { artifacts, report })
    }
}

/// Score a batch of sequences in order
pub async fn score_all(
    oracle: &dyn ScoringOracle,
    sequences: &[EncodedSequence],
) -> Result<Vec<f32>> {
    let mut probabilities = Vec::with_capacity(sequences.len());
    for sequence in sequences {
        probabilities.push(oracle.score(sequence).await?);
    }
    Ok(probabilities)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &[&str] = &["great", "clean", "friendly", "spacious", "lovely", "helpful"];
    const BAD: &[&str] = &["dirty", "rude", "noisy", "awful", "smelly", "broken"];

    fn corpus() -> Vec<RawReview> {
        let mut records = Vec::new();
        for i in 0..60 {
            records.push(RawReview {
                review: format!("{} room and {} staff", GOOD[i % 6], GOOD[(i + 1) % 6]),
                rating: 4 + (i % 2) as u8,
            });
        }
        for i in 0..40 {
            records.push(RawReview {
                review: format!("{} room and {} staff", BAD[i % 6], BAD[(i + 2) % 6]),
                rating: 1 + (i % 2) as u8,
            });
        }
        for _ in 0..10 {
            records.push(RawReview {
                review: "it was a hotel".to_string(),
                rating: 3,
            });
        }
        records
    }

    fn pipeline() -> TrainingPipeline {
        TrainingPipeline::new(
            TrainingConfig::default(),
            Arc::new(Normalizer::english().unwrap()),
        )
    }

    #[test]
    fn test_config_defaults_from_yaml() {
        let config = TrainingConfig::from_yaml("alpha: 0.5\n").unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.split_seed, 100);
        assert!((config.train_fraction - 0.70).abs() < 1e-12);
        assert!((config.fit_fraction - 0.80).abs() < 1e-12);
        assert_eq!(config.vectorizer.max_vocab, 20_000);
        assert_eq!(config.grid.steps, 81);
        assert!((config.alpha - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_prepare_balances_and_drops_neutral() {
        let prepared = pipeline().prepare(&corpus()).unwrap();
        assert_eq!(prepared.len(), 80);
        let positives = prepared.labels.iter().filter(|&&l| l == 1).count();
        assert_eq!(positives, 40);
        assert!(prepared.documents.iter().all(|doc| !doc.contains("and")));
    }

    #[test]
    fn test_prepare_single_class_is_empty_corpus() {
        let records = vec![RawReview {
            review: "great".to_string(),
            rating: 5,
        }];
        let err = pipeline().prepare(&records).unwrap_err();
        assert!(matches!(err, Error::EmptyCorpus));
    }

    #[test]
    fn test_split_sizes() {
        let pipeline = pipeline();
        let prepared = pipeline.prepare(&corpus()).unwrap();
        let (_, encoded) = pipeline.fit(&prepared).unwrap();
        let splits = pipeline.split(encoded).unwrap();

        // 40 per class: 28 train per class, then 22 fit / 6 validation
        assert_eq!(splits.test.len(), 24);
        assert_eq!(splits.validation.len(), 12);
        assert_eq!(splits.train.len(), 44);
    }

    #[tokio::test]
    async fn test_run_separable_corpus() {
        let outcome = pipeline().run(&corpus()).await.unwrap();
        assert!((outcome.report.test_f1 - 1.0).abs() < 1e-6);
        assert!((outcome.report.test_accuracy - 1.0).abs() < 1e-6);
        assert!(outcome.artifacts.oracle.is_some());
        assert_eq!(outcome.artifacts.calibration.table.len(), 81);
    }

    #[tokio::test]
    async fn test_run_is_deterministic() {
        let first = pipeline().run(&corpus()).await.unwrap();
        let second = pipeline().run(&corpus()).await.unwrap();
        assert_eq!(first.artifacts.vocabulary, second.artifacts.vocabulary);
        assert_eq!(first.artifacts.sequence_length, second.artifacts.sequence_length);
        assert_eq!(first.report, second.report);
    }
}
