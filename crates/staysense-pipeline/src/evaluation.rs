//! Binary classification metrics and the persisted evaluation report

use serde::{Deserialize, Serialize};

/// Counts of a binary classifier's outcomes (1 = positive)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    /// Tally paired labels and predictions; extra entries on either side are ignored
    pub fn from_predictions(labels: &[u8], predictions: &[u8]) -> Self {
        let mut matrix = Self::default();
        for (&label, &predicted) in labels.iter().zip(predictions) {
            match (label == 1, predicted == 1) {
                (true, true) => matrix.true_positive += 1,
                (false, true) => matrix.false_positive += 1,
                (false, false) => matrix.true_negative += 1,
                (true, false) => matrix.false_negative += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    /// Zero when nothing was predicted positive
    pub fn precision(&self) -> f32 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    /// Zero when there are no positive labels
    pub fn recall(&self) -> f32 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    pub fn f1(&self) -> f32 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    pub fn accuracy(&self) -> f32 {
        ratio(self.true_positive + self.true_negative, self.total())
    }
}

fn ratio(numerator: usize, denominator: usize) -> f32 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f32 / denominator as f32
    }
}

/// Held-out test metrics written next to the model artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub test_accuracy: f32,
    pub test_precision: f32,
    pub test_recall: f32,
    pub test_f1: f32,
    pub best_threshold: f32,
    pub best_f1_score: f32,
    pub confusion_matrix: ConfusionMatrix,
    pub train_size: usize,
    pub validation_size: usize,
    pub test_size: usize,
}

impl EvaluationReport {
    /// Score test probabilities against the calibrated threshold
    pub fn from_test_scores(
        probabilities: &[f32],
        labels: &[u8],
        threshold: f32,
        best_validation_f1: f32,
    ) -> Self {
        let predictions: Vec<u8> = probabilities
            .iter()
            .map(|&p| u8::from(p > threshold))
            .collect();
        let matrix = ConfusionMatrix::from_predictions(labels, &predictions);

        Self {
            test_accuracy: matrix.accuracy(),
            test_precision: matrix.precision(),
            test_recall: matrix.recall(),
            test_f1: matrix.f1(),
            best_threshold: threshold,
            best_f1_score: best_validation_f1,
            confusion_matrix: matrix,
            train_size: 0,
            validation_size: 0,
            test_size: labels.len(),
        }
    }

    pub fn with_sizes(mut self, train: usize, validation: usize) -> Self {
        self.train_size = train;
        self.validation_size = validation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confusion_matrix_counts() {
        let matrix = ConfusionMatrix::from_predictions(&[1, 1, 0, 0, 1], &[1, 0, 1, 0, 1]);
        assert_eq!(matrix.true_positive, 2);
        assert_eq!(matrix.false_negative, 1);
        assert_eq!(matrix.false_positive, 1);
        assert_eq!(matrix.true_negative, 1);
        assert!((matrix.precision() - 2.0 / 3.0).abs() < 1e-6);
        assert!((matrix.recall() - 2.0 / 3.0).abs() < 1e-6);
        assert!((matrix.accuracy() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_zero_division_is_zero() {
        let matrix = ConfusionMatrix::from_predictions(&[0, 0], &[0, 0]);
        assert_eq!(matrix.precision(), 0.0);
        assert_eq!(matrix.recall(), 0.0);
        assert_eq!(matrix.f1(), 0.0);
        assert_eq!(matrix.accuracy(), 1.0);
    }

    #[test]
    fn test_report_from_scores() {
        let report = EvaluationReport::from_test_scores(&[0.8, 0.2, 0.6], &[1, 0, 0], 0.5, 0.9)
            .with_sizes(10, 4);
        assert_eq!(report.confusion_matrix.false_positive, 1);
        assert_eq!(report.test_size, 3);
        assert_eq!(report.train_size, 10);
        assert!((report.test_recall - 1.0).abs() < 1e-6);
    }
}
