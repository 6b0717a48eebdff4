//! Fixed lexical tables used by the normalizer
//!
//! The tables are plain data. A `Normalizer` takes its own copy at
//! construction, so alternative locales can be swapped in from YAML without
//! touching process-wide state.

use serde::{Deserialize, Serialize};
use staysense_core::{Error, Result};
use std::path::Path;

/// English stopword list (the NLTK corpus list)
pub const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

/// Words that flip polarity and survive stopword removal
pub const ENGLISH_NEGATIONS: &[&str] = &[
    "no", "not", "never", "nor", "none", "nothing", "nowhere", "cannot", "n't", "couldn't",
    "wouldn't", "shouldn't", "haven't", "hasn't", "hadn't", "don't", "doesn't", "didn't",
    "isn't", "aren't", "wasn't", "weren't", "won't",
];

/// Contraction expansions, matched leftmost-longest
pub const ENGLISH_CONTRACTIONS: &[(&str, &str)] = &[
    ("n't", " not"),
    ("don't", "do not"),
    ("didn't", "did not"),
    ("isn't", "is not"),
    ("can't", "can not"),
    ("won't", "will not"),
    ("it's", "it is"),
    ("i'm", "i am"),
    ("they're", "they are"),
    ("we're", "we are"),
    ("you're", "you are"),
    ("i've", "i have"),
    ("i'd", "i would"),
    ("i'll", "i will"),
    ("that's", "that is"),
    ("there's", "there is"),
    ("wasn't", "was not"),
    ("weren't", "were not"),
    ("haven't", "have not"),
    ("hasn't", "has not"),
    ("hadn't", "had not"),
    ("doesn't", "does not"),
    ("couldn't", "could not"),
    ("wouldn't", "would not"),
    ("shouldn't", "should not"),
];

/// Emoji glyphs and the padded sentiment word each one becomes
pub const EMOJI_WORDS: &[(&str, &str)] = &[
    ("😞", " sad "),
    ("😢", " sad "),
    ("😭", " sad "),
    ("😔", " sad "),
    ("😡", " angry "),
    ("😠", " angry "),
    ("🤬", " angry "),
    ("🙂", " happy "),
    ("😊", " happy "),
    ("😄", " happy "),
    ("😃", " happy "),
    ("😁", " happy "),
    ("😍", " love "),
    ("❤️", " love "),
    ("❤", " love "),
    ("💕", " love "),
    ("🤢", " disgust "),
    ("🤮", " disgust "),
    ("😷", " sick "),
    ("😴", " tired "),
    ("😫", " tired "),
    ("😩", " tired "),
];

/// Immutable lexical tables injected into a [`Normalizer`](crate::Normalizer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerTables {
    /// Emoji glyph to padded replacement word
    pub emoji: Vec<(String, String)>,

    /// Contraction to expansion
    pub contractions: Vec<(String, String)>,

    /// Generic stopwords
    pub stopwords: Vec<String>,

    /// Negation words exempt from stopword removal
    pub negations: Vec<String>,
}

impl NormalizerTables {
    /// Default English tables
    pub fn english() -> Self {
        Self {
            emoji: to_pairs(EMOJI_WORDS),
            contractions: to_pairs(ENGLISH_CONTRACTIONS),
            stopwords: to_owned(ENGLISH_STOPWORDS),
            negations: to_owned(ENGLISH_NEGATIONS),
        }
    }

    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("invalid normalizer tables: {e}")))
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Stopwords that are actually dropped: the stopword list minus negations
    pub fn effective_stopwords(&self) -> impl Iterator<Item = &str> {
        self.stopwords
            .iter()
            .map(String::as_str)
            .filter(move |word| !self.negations.iter().any(|n| n == word))
    }
}

impl Default for NormalizerTables {
    fn default() -> Self {
        Self::english()
    }
}

fn to_pairs(table: &[(&str, &str)]) -> Vec<(String, String)> {
    table
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn to_owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}
