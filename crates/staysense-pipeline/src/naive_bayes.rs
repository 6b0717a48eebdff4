//! Multinomial naive Bayes oracle over vocabulary ids
//!
//! A compact, fully deterministic model that can be trained from the encoded
//! training split and persisted as JSON. Padding ids carry no evidence; the
//! OOV id is an ordinary feature.

use crate::oracle::ScoringOracle;
use crate::vectorizer::EncodedSequence;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use staysense_core::{Error, Result};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesOracle {
    #[serde(default = "default_name")]
    name: String,

    /// Additive smoothing used at training time
    alpha: f64,

    /// ln P(positive) - ln P(negative)
    log_prior_ratio: f64,

    /// Per id: ln P(id | positive) - ln P(id | negative)
    log_likelihood_ratio: Vec<f64>,

    /// Id that carries no evidence
    pad_id: u32,
}

fn default_name() -> String {
    "naive-bayes".to_string()
}

impl NaiveBayesOracle {
    /// Train on encoded sequences and binary labels (1 = positive).
    ///
    /// `id_space` is one past the largest id the vectorizer can emit.
    pub fn train(
        sequences: &[EncodedSequence],
        labels: &[u8],
        id_space: usize,
        pad_id: u32,
        alpha: f64,
    ) -> Result<Self> {
        if sequences.is_empty() || sequences.len() != labels.len() {
            return Err(Error::config(format!(
                "naive bayes needs matching non-empty inputs, got {} sequences and {} labels",
                sequences.len(),
                labels.len()
            )));
        }
        if alpha <= 0.0 {
            return Err(Error::config(format!("smoothing alpha must be positive, got {alpha}")));
        }

        let mut docs = [0usize; 2];
        let mut counts = [vec![0u64; id_space], vec![0u64; id_space]];
        for (sequence, &label) in sequences.iter().zip(labels) {
            let class = usize::from(label == 1);
            docs[class] += 1;
            for &id in sequence.ids() {
                if id != pad_id && (id as usize) < id_space {
                    counts[class][id as usize] += 1;
                }
            }
        }
        if docs[0] == 0 || docs[1] == 0 {
            return Err(Error::config("naive bayes needs examples of both classes"));
        }

        let totals = [
            counts[0].iter().sum::<u64>() as f64,
            counts[1].iter().sum::<u64>() as f64,
        ];
        let features = id_space as f64;
        let log_likelihood_ratio = (0..id_space)
            .map(|id| {
                let positive = (counts[1][id] as f64 + alpha) / (totals[1] + alpha * features);
                let negative = (counts[0][id] as f64 + alpha) / (totals[0] + alpha * features);
                positive.ln() - negative.ln()
            })
            .collect();
        let log_prior_ratio = (docs[1] as f64).ln() - (docs[0] as f64).ln();

        info!(
            "Trained naive bayes oracle on {} positive / {} negative sequences",
            docs[1], docs[0]
        );

        Ok(Self {
            name: default_name(),
            alpha,
            log_prior_ratio,
            log_likelihood_ratio,
            pad_id,
        })
    }

    /// Positive-class log odds for a sequence
    pub fn log_odds(&self, sequence: &EncodedSequence) -> f64 {
        sequence
            .ids()
            .iter()
            .filter(|&&id| id != self.pad_id)
            .filter_map(|&id| self.log_likelihood_ratio.get(id as usize))
            .sum::<f64>()
            + self.log_prior_ratio
    }

    pub fn id_space(&self) -> usize {
        self.log_likelihood_ratio.len()
    }

    /// Id skipped as padding
    pub fn pad_id(&self) -> u32 {
        self.pad_id
    }

    /// Check the persisted parameters are usable
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.log_prior_ratio.is_finite() {
            return Err("prior ratio is not finite".to_string());
        }
        if self.log_likelihood_ratio.iter().any(|w| !w.is_finite()) {
            return Err("likelihood table contains non-finite weights".to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl ScoringOracle for NaiveBayesOracle {
    async fn score(&self, sequence: &EncodedSequence) -> Result<f32> {
        let log_odds = self.log_odds(sequence);
        Ok((1.0 / (1.0 + (-log_odds).exp())) as f32)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAD: u32 = 1;

    fn seq(ids: &[u32]) -> EncodedSequence {
        ids.to_vec().into()
    }

    fn trained() -> NaiveBayesOracle {
        // id 2 = "great", id 3 = "dirty", id 4 = "room"
        let sequences = vec![
            seq(&[2, 4, PAD]),
            seq(&[2, 2, 4]),
            seq(&[3, 4, PAD]),
            seq(&[3, 3, PAD]),
        ];
        NaiveBayesOracle::train(&sequences, &[1, 1, 0, 0], 5, PAD, 1.0).unwrap()
    }

    #[tokio::test]
    async fn test_scores_follow_evidence() {
        let oracle = trained();
        let positive = oracle.score(&seq(&[2, PAD, PAD])).await.unwrap();
        let negative = oracle.score(&seq(&[3, PAD, PAD])).await.unwrap();
        assert!(positive > 0.5, "got {positive}");
        assert!(negative < 0.5, "got {negative}");
    }

    #[tokio::test]
    async fn test_all_pad_scores_prior() {
        let oracle = trained();
        let p = oracle.score(&seq(&[PAD, PAD, PAD])).await.unwrap();
        assert!((p - 0.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_out_of_range_ids_ignored() {
        let oracle = trained();
        let p = oracle.score(&seq(&[99, PAD, PAD])).await.unwrap();
        assert!((p - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_requires_both_classes() {
        let err = NaiveBayesOracle::train(&[seq(&[2])], &[1], 3, PAD, 1.0).unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_serde_round_trip() {
        let oracle = trained();
        let json = serde_json::to_string(&oracle).unwrap();
        let restored: NaiveBayesOracle = serde_json::from_str(&json).unwrap();
        assert!(restored.validate().is_ok());
        let sample = seq(&[2, 3, 4]);
        assert!((restored.log_odds(&sample) - oracle.log_odds(&sample)).abs() < 1e-9);
        assert_eq!(restored.id_space(), 5);
    }
}
