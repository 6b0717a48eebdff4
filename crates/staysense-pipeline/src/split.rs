//! Stratified train/holdout splitting

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use staysense_core::{Error, Result};

/// Two disjoint partitions of a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Split<T> {
    pub train: Vec<T>,
    pub holdout: Vec<T>,
}

/// Split records so both sides keep the class ratio.
///
/// Each class is shuffled with a generator seeded by `seed`; the first
/// `round(n * train_fraction)` records of each class go to `train`. Both
/// sides are shuffled again before returning.
pub fn stratified_split<T, F>(
    records: Vec<T>,
    label_of: F,
    train_fraction: f64,
    seed: u64,
) -> Result<Split<T>>
where
    F: Fn(&T) -> bool,
{
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(Error::config(format!(
            "train fraction must be in (0, 1), got {train_fraction}"
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let (mut positives, mut negatives): (Vec<T>, Vec<T>) =
        records.into_iter().partition(|record| label_of(record));

    let mut train = Vec::new();
    let mut holdout = Vec::new();
    for class in [&mut positives, &mut negatives] {
        class.shuffle(&mut rng);
        let cut = (class.len() as f64 * train_fraction).round() as usize;
        let rest = class.split_off(cut.min(class.len()));
        train.append(class);
        holdout.extend(rest);
    }

    train.shuffle(&mut rng);
    holdout.shuffle(&mut rng);
    Ok(Split { train, holdout })
}
