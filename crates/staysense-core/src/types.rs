//! Core types for StaySense

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary sentiment of a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
}

impl SentimentLabel {
    /// Label for a binary class flag (`true` is positive)
    pub fn from_positive(positive: bool) -> Self {
        if positive {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    /// Numeric class used by the calibrator and evaluation (1 = positive)
    pub fn as_binary(&self) -> u8 {
        match self {
            Self::Positive => 1,
            Self::Negative => 0,
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Positive)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A review as it arrives in a training corpus, before labeling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReview {
    /// Free review text
    #[serde(default)]
    pub review: String,

    /// Star rating, 1 to 5
    pub rating: u8,
}

/// A review with its binary sentiment label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledReview {
    pub text: String,
    pub label: SentimentLabel,
}

impl LabeledReview {
    pub fn new(text: impl Into<String>, label: SentimentLabel) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// Outcome of a single inference call
///
/// `confidence` is always the probability mass assigned to the chosen label:
/// `probability` for positive decisions and `1 - probability` for negative ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Decided label
    pub label: SentimentLabel,

    /// Raw oracle probability of the positive class
    pub probability: f32,

    /// Probability of the decided label
    pub confidence: f32,

    /// Calibrated threshold the decision was made against
    pub threshold: f32,

    /// Normalized tokens joined by single spaces
    pub normalized_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_serializes_uppercase() {
        let json = serde_json::to_string(&SentimentLabel::Positive).unwrap();
        assert_eq!(json, "\"POSITIVE\"");
        let label: SentimentLabel = serde_json::from_str("\"NEGATIVE\"").unwrap();
        assert_eq!(label, SentimentLabel::Negative);
    }

    #[test]
    fn test_label_binary_mapping() {
        assert_eq!(SentimentLabel::from_positive(true).as_binary(), 1);
        assert_eq!(SentimentLabel::from_positive(false).as_binary(), 0);
        assert_eq!(SentimentLabel::Negative.to_string(), "NEGATIVE");
    }

    #[test]
    fn test_raw_review_missing_text_defaults_empty() {
        let review: RawReview = serde_json::from_str(r#"{"rating": 5}"#).unwrap();
        assert!(review.review.is_empty());
        assert_eq!(review.rating, 5);
    }
}
