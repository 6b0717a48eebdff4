//! Frequency-ranked vocabulary and fixed-length sequence encoding

use crate::normalizer::NormalizedTokens;
use serde::{Deserialize, Serialize};
use staysense_core::{Error, Result};
use std::collections::HashMap;
use tracing::{debug, info};

/// Reserved id for tokens outside the fitted vocabulary
pub const OOV_ID: u32 = 0;

/// Reserved id used to right-pad short sequences
pub const PAD_ID: u32 = 1;

/// First id handed to a real token
pub const FIRST_TOKEN_ID: u32 = 2;

/// Largest sequence length a vectorizer may be configured or loaded with
pub const MAX_SEQUENCE_LENGTH: usize = 4096;

/// Token-to-id mapping fitted once on a training corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Tokens in id order; `tokens[i]` has id `FIRST_TOKEN_ID + i`
    tokens: Vec<String>,

    /// Out-of-vocabulary id
    oov_id: u32,

    /// Padding id
    pad_id: u32,

    #[serde(skip)]
    index: HashMap<String, u32>,
}

impl Vocabulary {
    /// Fit on a corpus, keeping the `max_vocab` most frequent tokens.
    ///
    /// Ids follow descending frequency; equal counts keep first-seen order.
    pub fn fit(corpus: &[NormalizedTokens], max_vocab: usize) -> Result<Self> {
        if corpus.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        let mut seen = 0usize;
        for doc in corpus {
            for token in doc.iter() {
                let entry = counts.entry(token).or_insert_with(|| {
                    seen += 1;
                    (0, seen)
                });
                entry.0 += 1;
            }
        }

        let mut ranked: Vec<(&str, usize, usize)> = counts
            .into_iter()
            .map(|(token, (count, first))| (token, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        let distinct = ranked.len();
        let tokens: Vec<String> = ranked
            .into_iter()
            .take(max_vocab)
            .map(|(token, _, _)| token.to_string())
            .collect();

        info!(
            "Fitted vocabulary: {} of {} distinct tokens kept",
            tokens.len(),
            distinct
        );

        Ok(Self::from_tokens(tokens))
    }

    /// Rebuild from tokens already in id order
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        let mut vocab = Self {
            tokens,
            oov_id: OOV_ID,
            pad_id: PAD_ID,
            index: HashMap::new(),
        };
        vocab.rebuild_index();
        vocab
    }

    /// Restore the lookup index after deserialization
    pub(crate) fn rebuild_index(&mut self) {
        self.index = self
            .tokens
            .iter()
            .enumerate()
            .map(|(i, token)| (token.clone(), FIRST_TOKEN_ID + i as u32))
            .collect();
    }

    /// Id of a token, or the OOV id when unseen
    pub fn id_of(&self, token: &str) -> u32 {
        self.index.get(token).copied().unwrap_or(self.oov_id)
    }

    /// Token for an id, if it names a real token
    pub fn token_of(&self, id: u32) -> Option<&str> {
        id.checked_sub(FIRST_TOKEN_ID)
            .and_then(|i| self.tokens.get(i as usize))
            .map(String::as_str)
    }

    /// Number of real tokens (reserved ids excluded)
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// One past the largest id this vocabulary can emit
    pub fn id_space(&self) -> usize {
        FIRST_TOKEN_ID as usize + self.tokens.len()
    }

    pub fn oov_id(&self) -> u32 {
        self.oov_id
    }

    pub fn pad_id(&self) -> u32 {
        self.pad_id
    }

    /// Check internal consistency after loading from disk
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.oov_id == self.pad_id {
            return Err(format!("oov id and pad id are both {}", self.oov_id));
        }
        if self.oov_id >= FIRST_TOKEN_ID || self.pad_id >= FIRST_TOKEN_ID {
            return Err("reserved ids overlap token ids".to_string());
        }
        if self.index.len() != self.tokens.len() {
            return Err("vocabulary contains duplicate tokens".to_string());
        }
        Ok(())
    }
}

/// Fixed-length id sequence fed to the scoring oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedSequence(Vec<u32>);

impl EncodedSequence {
    pub fn ids(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<u32> {
        self.0
    }
}

impl From<Vec<u32>> for EncodedSequence {
    fn from(ids: Vec<u32>) -> Self {
        Self(ids)
    }
}

/// Encode tokens to exactly `length` ids: truncate trailing tokens, right-pad.
pub fn encode(tokens: &NormalizedTokens, vocab: &Vocabulary, length: usize) -> EncodedSequence {
    let mut ids: Vec<u32> = tokens
        .iter()
        .take(length)
        .map(|token| vocab.id_of(token))
        .collect();
    ids.resize(length, vocab.pad_id());
    EncodedSequence(ids)
}

/// `min(hard_cap, floor(percentile of token counts))`, never below 1
pub fn sequence_length(corpus: &[NormalizedTokens], percentile: f64, hard_cap: usize) -> usize {
    let mut lengths: Vec<usize> = corpus.iter().map(NormalizedTokens::len).collect();
    lengths.sort_unstable();

    let observed = interpolated_percentile(&lengths, percentile).floor() as usize;
    let length = observed.min(hard_cap).max(1);
    debug!(observed, hard_cap, length, "Computed sequence length");
    length
}

/// Linearly interpolated percentile over sorted values
fn interpolated_percentile(sorted: &[usize], percentile: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0] as f64,
        n => {
            let rank = (percentile.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] as f64 + (sorted[upper] as f64 - sorted[lower] as f64) * weight
        }
    }
}

/// Vectorizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Keep at most this many real tokens
    #[serde(default = "default_max_vocab")]
    pub max_vocab: usize,

    /// Upper bound on the encoded sequence length
    #[serde(default = "default_hard_cap")]
    pub hard_cap: usize,

    /// Percentile of observed lengths used for the sequence length
    #[serde(default = "default_percentile")]
    pub percentile: f64,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_vocab: default_max_vocab(),
            hard_cap: default_hard_cap(),
            percentile: default_percentile(),
        }
    }
}

fn default_max_vocab() -> usize {
    20_000
}

fn default_hard_cap() -> usize {
    300
}

fn default_percentile() -> f64 {
    95.0
}

/// Fitted vocabulary plus the sequence length it encodes to
#[derive(Debug, Clone, PartialEq)]
pub struct Vectorizer {
    vocabulary: Vocabulary,
    length: usize,
}

impl Vectorizer {
    pub fn new(vocabulary: Vocabulary, length: usize) -> Self {
        Self { vocabulary, length }
    }

    /// Fit vocabulary and sequence length on the same corpus
    pub fn fit(corpus: &[NormalizedTokens], config: &VectorizerConfig) -> Result<Self> {
        if config.hard_cap == 0 || config.hard_cap > MAX_SEQUENCE_LENGTH {
            return Err(Error::config(format!(
                "hard cap must be in 1..={MAX_SEQUENCE_LENGTH}, got {}",
                config.hard_cap
            )));
        }
        let vocabulary = Vocabulary::fit(corpus, config.max_vocab)?;
        let length = sequence_length(corpus, config.percentile, config.hard_cap);
        info!("Sequence length fixed at {}", length);
        Ok(Self { vocabulary, length })
    }

    pub fn encode(&self, tokens: &NormalizedTokens) -> EncodedSequence {
        encode(tokens, &self.vocabulary, self.length)
    }

    pub fn encode_all(&self, corpus: &[NormalizedTokens]) -> Vec<EncodedSequence> {
        corpus.iter().map(|tokens| self.encode(tokens)).collect()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(words: &[&str]) -> NormalizedTokens {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_fit_orders_by_frequency_then_first_seen() {
        let corpus = vec![doc(&["clean", "room", "staff"]), doc(&["staff", "room", "view"])];
        let vocab = Vocabulary::fit(&corpus, 10).unwrap();

        // room and staff both appear twice; room was seen first
        assert_eq!(vocab.id_of("room"), FIRST_TOKEN_ID);
        assert_eq!(vocab.id_of("staff"), FIRST_TOKEN_ID + 1);
        assert_eq!(vocab.id_of("clean"), FIRST_TOKEN_ID + 2);
        assert_eq!(vocab.id_of("view"), FIRST_TOKEN_ID + 3);
        assert_eq!(vocab.token_of(FIRST_TOKEN_ID), Some("room"));
        assert_eq!(vocab.token_of(OOV_ID), None);
    }

    #[test]
    fn test_fit_caps_vocabulary() {
        let corpus = vec![doc(&["a1", "a1", "a1", "b2", "b2", "c3"])];
        let vocab = Vocabulary::fit(&corpus, 2).unwrap();
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.id_of("c3"), OOV_ID);
        assert_eq!(vocab.id_space(), 4);
    }

    #[test]
    fn test_fit_empty_corpus_fails() {
        let err = Vocabulary::fit(&[], 100).unwrap_err();
        assert!(matches!(err, Error::EmptyCorpus));
    }

    #[test]
    fn test_unseen_token_encodes_to_oov() {
        let vocab = Vocabulary::fit(&[doc(&["pool"])], 10).unwrap();
        let seq = encode(&doc(&["pool", "jacuzzi"]), &vocab, 3);
        assert_eq!(seq.ids(), &[FIRST_TOKEN_ID, OOV_ID, PAD_ID]);
    }

    #[test]
    fn test_encode_lengths() {
        let vocab = Vocabulary::fit(&[doc(&["x", "y", "z"])], 10).unwrap();
        for n in 0..6 {
            let tokens: NormalizedTokens = (0..n).map(|i| format!("t{i}")).collect();
            assert_eq!(encode(&tokens, &vocab, 4).len(), 4);
        }
    }

    #[test]
    fn test_encode_truncates_trailing() {
        let vocab = Vocabulary::fit(&[doc(&["x", "y", "z"])], 10).unwrap();
        let seq = encode(&doc(&["z", "y", "x"]), &vocab, 2);
        assert_eq!(seq.ids(), &[vocab.id_of("z"), vocab.id_of("y")]);
    }

    #[test]
    fn test_empty_tokens_encode_all_pad() {
        let vocab = Vocabulary::fit(&[doc(&["x"])], 10).unwrap();
        let seq = encode(&NormalizedTokens::default(), &vocab, 5);
        assert!(seq.ids().iter().all(|&id| id == PAD_ID));
    }

    #[test]
    fn test_sequence_length_percentile_and_cap() {
        let corpus: Vec<NormalizedTokens> = (1..=20)
            .map(|n| (0..n).map(|i| format!("w{i}")).collect())
            .collect();
        // lengths 1..=20: p95 rank 18.05 -> 19.05 -> floor 19
        assert_eq!(sequence_length(&corpus, 95.0, 300), 19);
        assert_eq!(sequence_length(&corpus, 95.0, 10), 10);
    }

    #[test]
    fn test_sequence_length_never_zero() {
        let corpus = vec![NormalizedTokens::default(), NormalizedTokens::default()];
        assert_eq!(sequence_length(&corpus, 95.0, 300), 1);
    }

    #[test]
    fn test_vocabulary_serde_rebuilds_index() {
        let vocab = Vocabulary::fit(&[doc(&["quiet", "room"])], 10).unwrap();
        let json = serde_json::to_string(&vocab).unwrap();
        let mut restored: Vocabulary = serde_json::from_str(&json).unwrap();
        restored.rebuild_index();
        assert_eq!(restored, vocab);
        assert!(restored.validate().is_ok());
    }

    #[test]
    fn test_fit_rejects_unbounded_hard_cap() {
        let config = VectorizerConfig {
            hard_cap: MAX_SEQUENCE_LENGTH + 1,
            ..Default::default()
        };
        let err = Vectorizer::fit(&[doc(&["bed"])], &config).unwrap_err();
        assert_eq!(err.kind(), "config");
    }
}
