//! StaySense Core
//!
//! Core types and utilities shared across StaySense components.
//!
//! This crate provides:
//! - Error types and result handling for training and serving
//! - Sentiment labels and the per-request prediction result
//! - Labeled review records consumed by the training pipeline

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{LabeledReview, PredictionResult, RawReview, SentimentLabel};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{LabeledReview, PredictionResult, RawReview, SentimentLabel};
}
