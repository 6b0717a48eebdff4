//! Lexical normalization shared by training and serving
//!
//! Raw review text becomes a lowercase token stream in a fixed order:
//! emoji words, contraction expansion, URL/digit/punctuation stripping,
//! whitespace split, negation-aware stopword removal, lemmatization.
//! The order matters: contractions must be expanded before punctuation
//! stripping destroys the apostrophes, and emoji must be mapped before the
//! non-word pass erases them.

use crate::lemmatizer::{Lemmatizer, NounLemmatizer};
use crate::tables::NormalizerTables;
use aho_corasick::{AhoCorasick, MatchKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use staysense_core::{Error, Result};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Ordered, normalized tokens derived from one piece of text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTokens(Vec<String>);

impl NormalizedTokens {
    pub fn new(tokens: Vec<String>) -> Self {
        Self(tokens)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Tokens joined by single spaces
    pub fn to_text(&self) -> String {
        self.0.join(" ")
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t == token)
    }
}

impl From<Vec<String>> for NormalizedTokens {
    fn from(tokens: Vec<String>) -> Self {
        Self(tokens)
    }
}

impl FromIterator<String> for NormalizedTokens {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Literal substring replacement over a fixed table, leftmost-longest
struct TableReplacer {
    matcher: AhoCorasick,
    replacements: Vec<String>,
}

impl TableReplacer {
    fn new(table: &[(String, String)], what: &str) -> Result<Self> {
        let (patterns, replacements): (Vec<_>, Vec<_>) = table.iter().cloned().unzip();
        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .map_err(|e| Error::config(format!("Failed to build {what} matcher: {e}")))?;

        Ok(Self {
            matcher,
            replacements,
        })
    }

    fn apply(&self, text: &str) -> String {
        self.matcher.replace_all(text, &self.replacements)
    }
}

/// Text normalizer with injected tables and lemmatizer
pub struct Normalizer {
    emoji: TableReplacer,
    contractions: TableReplacer,
    stopwords: HashSet<String>,
    url: Regex,
    digits: Regex,
    non_word: Regex,
    lemmatizer: Arc<dyn Lemmatizer>,
    tables: NormalizerTables,
}

impl Normalizer {
    /// Build a normalizer from explicit tables and a lemmatizer
    pub fn new(tables: &NormalizerTables, lemmatizer: Arc<dyn Lemmatizer>) -> Result<Self> {
        let stopwords = tables.effective_stopwords().map(str::to_string).collect();

        Ok(Self {
            emoji: TableReplacer::new(&tables.emoji, "emoji")?,
            contractions: TableReplacer::new(&tables.contractions, "contraction")?,
            stopwords,
            url: compile(r"http\S+")?,
            digits: compile(r"\d+")?,
            non_word: compile(r"[^\w\s]")?,
            lemmatizer,
            tables: tables.clone(),
        })
    }

    /// English tables with the noun lemmatizer
    pub fn english() -> Result<Self> {
        Self::new(&NormalizerTables::english(), Arc::new(NounLemmatizer))
    }

    /// Normalize anything with a textual representation
    pub fn normalize_value<T: fmt::Display + ?Sized>(&self, value: &T) -> NormalizedTokens {
        self.normalize(&value.to_string())
    }

    /// Normalize raw text into tokens. Empty input yields no tokens.
    pub fn normalize(&self, text: &str) -> NormalizedTokens {
        let text = self.expand(text);
        let text = self.url.replace_all(&text, "");
        let text = self.digits.replace_all(&text, " ");
        let text = self.non_word.replace_all(&text, " ");

        text.split_whitespace()
            .filter(|word| !self.stopwords.contains(*word))
            .map(|word| self.lemmatizer.lemmatize(word))
            .collect()
    }

    /// Lowercase, then substitute emoji and expand contractions
    fn expand(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let with_words = self.emoji.apply(&lowered);
        self.contractions.apply(&with_words)
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Tables this normalizer was built from, persisted with model artifacts
    pub fn tables(&self) -> &NormalizerTables {
        &self.tables
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("stopwords", &self.stopwords.len())
            .finish_non_exhaustive()
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::internal(format!("invalid pattern {pattern}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lemmatizer::IdentityLemmatizer;
    use crate::tables::{ENGLISH_NEGATIONS, ENGLISH_STOPWORDS};
    use proptest::prelude::*;

    fn english() -> Normalizer {
        Normalizer::english().unwrap()
    }

    fn tokens(text: &str) -> Vec<String> {
        english().normalize(text).as_slice().to_vec()
    }

    #[test]
    fn test_emoji_and_case() {
        assert_eq!(tokens("I LOVED the hotel!!! 😊"), vec!["loved", "hotel", "happy"]);
    }

    #[test]
    fn test_negation_survives_stopwords() {
        let out = tokens("not good at all");
        assert_eq!(out, vec!["not", "good"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(english().normalize("").is_empty());
        assert!(english().normalize("   \n\t").is_empty());
        assert!(english().normalize("the and of").is_empty());
    }

    #[test]
    fn test_specific_contractions_win() {
        let out = tokens("I can't sleep and the lift won't work");
        assert!(out.contains(&"not".to_string()));
        assert!(!out.iter().any(|t| t == "ca" || t == "wo"));
        assert!(out.contains(&"sleep".to_string()));
        assert!(out.contains(&"lift".to_string()));
    }

    #[test]
    fn test_generic_contraction_suffix() {
        let out = tokens("the towels mightn't be clean");
        assert_eq!(out, vec!["towel", "might", "not", "clean"]);
    }

    #[test]
    fn test_url_digits_and_punctuation_removed() {
        let out = tokens("Booked via https://example.com/deal?id=7 for 129 dollars, great-value");
        assert_eq!(out, vec!["booked", "via", "dollar", "great", "value"]);
    }

    #[test]
    fn test_lemmatization_applied() {
        assert_eq!(tokens("The rooms had dirty beds"), vec!["room", "dirty", "bed"]);
    }

    #[test]
    fn test_deterministic() {
        let normalizer = english();
        let text = "Wasn't worth it 😡 - 2 stars, http://x.y";
        assert_eq!(normalizer.normalize(text), normalizer.normalize(text));
    }

    #[test]
    fn test_normalize_value_coerces() {
        let out = english().normalize_value(&12345);
        assert!(out.is_empty());
        let out = english().normalize_value("Great");
        assert_eq!(out.to_text(), "great");
    }

    #[test]
    fn test_injected_tables() {
        let tables = NormalizerTables {
            emoji: vec![("☀".to_string(), " sunny ".to_string())],
            contractions: vec![],
            stopwords: vec!["very".to_string(), "never".to_string()],
            negations: vec!["never".to_string()],
        };
        let normalizer = Normalizer::new(&tables, Arc::new(IdentityLemmatizer)).unwrap();
        let out = normalizer.normalize("Very ☀ never rooms");
        assert_eq!(out.to_text(), "sunny never rooms");
    }

    /// Negations that also sit on the stopword list, with the token each must
    /// leave behind once contractions are expanded
    fn protected_negations() -> Vec<(&'static str, &'static str)> {
        ENGLISH_NEGATIONS
            .iter()
            .filter(|word| ENGLISH_STOPWORDS.contains(*word))
            .map(|&word| (word, if word.contains("n't") { "not" } else { word }))
            .collect()
    }

    #[test]
    fn test_protected_negations_cover_plain_and_contracted_forms() {
        let words: Vec<&str> = protected_negations().iter().map(|(w, _)| *w).collect();
        for expected in ["no", "nor", "not", "don't", "won't", "wasn't"] {
            assert!(words.contains(&expected), "{expected} missing");
        }
    }

    proptest! {
        #[test]
        fn prop_negations_survive_in_any_context(
            prefix in "[a-zA-Z0-9 .,!?]{0,40}",
            suffix in "[a-zA-Z0-9 .,!?]{0,40}",
            pick in any::<prop::sample::Index>(),
        ) {
            let negations = protected_negations();
            let (word, expected) = negations[pick.index(negations.len())];
            let text = format!("{prefix} {word} {suffix}");

            let out = english().normalize(&text);
            prop_assert!(out.contains(expected), "{:?} lost {} in {:?}", text, expected, out);
        }
    }
}
