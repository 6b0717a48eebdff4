//! StaySense Pipeline
//!
//! Training and inference for hotel review sentiment.
//!
//! Both paths share the same front half:
//! - Lexical normalization (emoji, contractions, URLs, stopwords, lemmas)
//! - Vocabulary ids with a fixed, padded sequence length
//!
//! Training adds balanced sampling, stratified splits, oracle fitting and
//! threshold calibration. Serving loads the persisted artifacts into a
//! [`SentimentEngine`] that scores one review at a time.

pub mod artifacts;
pub mod calibrator;
pub mod corpus;
pub mod engine;
pub mod evaluation;
pub mod lemmatizer;
pub mod naive_bayes;
pub mod normalizer;
pub mod oracle;
pub mod remote;
pub mod sampler;
pub mod split;
pub mod tables;
pub mod training;
pub mod vectorizer;

pub use artifacts::ModelArtifacts;
pub use calibrator::{calibrate, CalibrationResult, ThresholdGrid, ThresholdMetrics};
pub use corpus::read_reviews_jsonl;
pub use engine::{decide, SentimentEngine};
pub use evaluation::{ConfusionMatrix, EvaluationReport};
pub use lemmatizer::{IdentityLemmatizer, Lemmatizer, NounLemmatizer};
pub use naive_bayes::NaiveBayesOracle;
pub use normalizer::{NormalizedTokens, Normalizer};
pub use oracle::ScoringOracle;
pub use remote::RemoteOracle;
pub use sampler::{balance, label_from_rating};
pub use split::{stratified_split, Split};
pub use tables::NormalizerTables;
pub use training::{TrainingConfig, TrainingOutcome, TrainingPipeline};
pub use vectorizer::{
    EncodedSequence, Vectorizer, VectorizerConfig, Vocabulary, FIRST_TOKEN_ID, OOV_ID, PAD_ID,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::artifacts::ModelArtifacts;
    pub use crate::engine::SentimentEngine;
    pub use crate::normalizer::{NormalizedTokens, Normalizer};
    pub use crate::oracle::ScoringOracle;
    pub use crate::training::{TrainingConfig, TrainingPipeline};
    pub use crate::vectorizer::{EncodedSequence, Vectorizer};
}
