//! Class-balanced, reproducible sampling for training data

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use staysense_core::SentimentLabel;
use tracing::info;

/// Map a 1-5 star rating to a sentiment label.
///
/// Ratings of 4 and 5 are positive, 1 and 2 negative; 3 is ambiguous and
/// dropped from training.
pub fn label_from_rating(rating: u8) -> Option<SentimentLabel> {
    match rating {
        r if r >= 4 => Some(SentimentLabel::Positive),
        r if r <= 2 => Some(SentimentLabel::Negative),
        _ => None,
    }
}

/// Downsample the majority class to the minority size and shuffle.
///
/// Both classes are drawn without replacement with a `StdRng` seeded by
/// `seed`, positives are placed before negatives, and the concatenation is
/// shuffled with the same generator. The result always holds exactly
/// `min(positives, negatives)` records of each class.
pub fn balance<T, F>(records: &[T], label_of: F, seed: u64) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> bool,
{
    let (positives, negatives): (Vec<&T>, Vec<&T>) =
        records.iter().partition(|record| label_of(record));
    let per_class = positives.len().min(negatives.len());

    let mut rng = StdRng::seed_from_u64(seed);
    let mut balanced: Vec<T> = Vec::with_capacity(per_class * 2);
    balanced.extend(
        positives
            .choose_multiple(&mut rng, per_class)
            .map(|record| (*record).clone()),
    );
    balanced.extend(
        negatives
            .choose_multiple(&mut rng, per_class)
            .map(|record| (*record).clone()),
    );
    balanced.shuffle(&mut rng);

    info!(
        "Balanced {} positive / {} negative records to {} per class",
        positives.len(),
        negatives.len(),
        per_class
    );

    balanced
}
