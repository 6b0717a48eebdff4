//! Serving-time decision engine
//!
//! Combines the normalizer, the fitted vectorizer, a scoring oracle and the
//! calibrated threshold. All state is read-only after construction, so one
//! engine is shared behind an `Arc` by every request.

use crate::artifacts::ModelArtifacts;
use crate::normalizer::Normalizer;
use crate::oracle::ScoringOracle;
use crate::vectorizer::Vectorizer;
use staysense_core::{Error, PredictionResult, Result, SentimentLabel};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Label and winning-class confidence for a probability.
///
/// Positive iff `probability > threshold`; confidence is the probability
/// mass of the chosen label.
pub fn decide(probability: f32, threshold: f32) -> (SentimentLabel, f32) {
    if probability > threshold {
        (SentimentLabel::Positive, probability)
    } else {
        (SentimentLabel::Negative, 1.0 - probability)
    }
}

pub struct SentimentEngine {
    normalizer: Arc<Normalizer>,
    vectorizer: Vectorizer,
    oracle: Arc<dyn ScoringOracle>,
    threshold: f32,
}

impl SentimentEngine {
    pub fn new(
        normalizer: Arc<Normalizer>,
        vectorizer: Vectorizer,
        oracle: Arc<dyn ScoringOracle>,
        threshold: f32,
    ) -> Result<Self> {
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(Error::config(format!(
                "decision threshold must be in (0, 1), got {threshold}"
            )));
        }

        Ok(Self {
            normalizer,
            vectorizer,
            oracle,
            threshold,
        })
    }

    /// Build from loaded artifacts with the calibrated threshold
    pub fn from_artifacts(
        normalizer: Arc<Normalizer>,
        artifacts: &ModelArtifacts,
        oracle: Arc<dyn ScoringOracle>,
    ) -> Result<Self> {
        Self::new(
            normalizer,
            artifacts.vectorizer(),
            oracle,
            artifacts.threshold(),
        )
    }

    /// Classify one review.
    ///
    /// Empty or unusual text is scored normally. Oracle errors and
    /// probabilities outside `[0, 1]` surface as `ScoringFailure`.
    pub async fn predict(&self, text: &str) -> Result<PredictionResult> {
        let start = Instant::now();

        let tokens = self.normalizer.normalize(text);
        let sequence = self.vectorizer.encode(&tokens);

        let probability = self.oracle.score(&sequence).await.map_err(|e| match e {
            Error::ScoringFailure(_) => e,
            other => Error::scoring(format!("{} oracle failed: {other}", self.oracle.name())),
        })?;
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(Error::scoring(format!(
                "{} oracle returned invalid probability {probability}",
                self.oracle.name()
            )));
        }

        let (label, confidence) = decide(probability, self.threshold);
        debug!(
            tokens = tokens.len(),
            probability,
            label = label.as_str(),
            latency_us = start.elapsed().as_micros() as u64,
            "Prediction complete"
        );

        Ok(PredictionResult {
            label,
            probability,
            confidence,
            threshold: self.threshold,
            normalized_text: tokens.to_text(),
        })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn sequence_length(&self) -> usize {
        self.vectorizer.length()
    }

    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::NormalizedTokens;
    use crate::vectorizer::{EncodedSequence, Vocabulary};
    use async_trait::async_trait;

    struct FixedOracle(f32);

    #[async_trait]
    impl ScoringOracle for FixedOracle {
        async fn score(&self, _sequence: &EncodedSequence) -> Result<f32> {
            Ok(self.0)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct BrokenOracle;

    #[async_trait]
    impl ScoringOracle for BrokenOracle {
        async fn score(&self, _sequence: &EncodedSequence) -> Result<f32> {
            Err(Error::internal("model not loaded"))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    fn engine(oracle: Arc<dyn ScoringOracle>, threshold: f32) -> SentimentEngine {
        let corpus: Vec<NormalizedTokens> = vec![vec!["great".to_string()].into()];
        let vectorizer = Vectorizer::new(Vocabulary::fit(&corpus, 10).unwrap(), 8);
        SentimentEngine::new(
            Arc::new(Normalizer::english().unwrap()),
            vectorizer,
            oracle,
            threshold,
        )
        .unwrap()
    }

    #[test]
    fn test_decide_confidence_is_winning_mass() {
        assert_eq!(decide(0.8, 0.5), (SentimentLabel::Positive, 0.8));
        let (label, confidence) = decide(0.3, 0.5);
        assert_eq!(label, SentimentLabel::Negative);
        assert!((confidence - 0.7).abs() < 1e-6);
        // At the threshold itself the decision is negative
        assert_eq!(decide(0.5, 0.5).0, SentimentLabel::Negative);
    }

    #[tokio::test]
    async fn test_predict_positive() {
        let engine = engine(Arc::new(FixedOracle(0.91)), 0.42);
        let result = engine.predict("Great stay 😊").await.unwrap();
        assert_eq!(result.label, SentimentLabel::Positive);
        assert!((result.confidence - 0.91).abs() < 1e-6);
        assert_eq!(result.normalized_text, "great stay happy");
        assert!((result.threshold - 0.42).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_predict_uses_calibrated_threshold() {
        let engine = engine(Arc::new(FixedOracle(0.45)), 0.42);
        let result = engine.predict("fine").await.unwrap();
        assert_eq!(result.label, SentimentLabel::Positive);

        let engine = self::engine(Arc::new(FixedOracle(0.45)), 0.6);
        let result = engine.predict("fine").await.unwrap();
        assert_eq!(result.label, SentimentLabel::Negative);
        assert!((result.confidence - 0.55).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_empty_text_is_scored() {
        let engine = engine(Arc::new(FixedOracle(0.2)), 0.5);
        let result = engine.predict("").await.unwrap();
        assert_eq!(result.label, SentimentLabel::Negative);
        assert!(result.normalized_text.is_empty());
    }

    #[tokio::test]
    async fn test_oracle_error_surfaces_as_scoring_failure() {
        let engine = engine(Arc::new(BrokenOracle), 0.5);
        let err = engine.predict("anything").await.unwrap_err();
        assert!(matches!(err, Error::ScoringFailure(_)));
    }

    #[tokio::test]
    async fn test_non_finite_probability_rejected() {
        for bad in [f32::NAN, f32::INFINITY, -0.1, 1.5] {
            let engine = engine(Arc::new(FixedOracle(bad)), 0.5);
            let err = engine.predict("room").await.unwrap_err();
            assert!(matches!(err, Error::ScoringFailure(_)), "{bad} accepted");
        }
    }

    #[test]
    fn test_threshold_must_be_open_unit() {
        let corpus: Vec<NormalizedTokens> = vec![vec!["x".to_string()].into()];
        let vectorizer = Vectorizer::new(Vocabulary::fit(&corpus, 10).unwrap(), 4);
        let result = SentimentEngine::new(
            Arc::new(Normalizer::english().unwrap()),
            vectorizer,
            Arc::new(FixedOracle(0.5)),
            1.0,
        );
        assert!(result.is_err());
    }
}
