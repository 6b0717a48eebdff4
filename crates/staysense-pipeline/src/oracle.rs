//! Scoring oracle trait

use crate::vectorizer::EncodedSequence;
use async_trait::async_trait;
use staysense_core::Result;

/// Maps an encoded review to the probability that it is positive.
///
/// Implementations must be deterministic for a fixed model artifact. Callers
/// treat `score` as potentially slow and never hold a lock across it.
#[async_trait]
pub trait ScoringOracle: Send + Sync {
    /// Probability of the positive class, expected in `[0, 1]`
    async fn score(&self, sequence: &EncodedSequence) -> Result<f32>;

    /// Get the oracle name
    fn name(&self) -> &str;
}
