//! Training corpus input
//!
//! Reviews are read from JSON Lines, one `{"review": "...", "rating": 4}`
//! object per line. Blank lines are skipped. A missing `review` field reads
//! as empty text.

use staysense_core::{Error, RawReview, Result};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::info;

/// Read a JSON Lines corpus from disk
pub fn read_reviews_jsonl(path: impl AsRef<Path>) -> Result<Vec<RawReview>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let reviews = parse_reviews(file)?;
    info!("Read {} reviews from {}", reviews.len(), path.display());
    Ok(reviews)
}

/// Parse JSON Lines from any reader
pub fn parse_reviews<R: Read>(reader: R) -> Result<Vec<RawReview>> {
    let mut reviews = Vec::new();
    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let review: RawReview = serde_json::from_str(line)
            .map_err(|e| Error::config(format!("corpus line {}: {e}", index + 1)))?;
        reviews.push(review);
    }
    Ok(reviews)
}
