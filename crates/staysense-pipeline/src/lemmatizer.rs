//! Lemmatization capability used by the normalizer

/// Maps a word to its dictionary base form
pub trait Lemmatizer: Send + Sync {
    fn lemmatize(&self, word: &str) -> String;
}

/// Irregular plurals and their singular forms
const IRREGULAR_NOUNS: &[(&str, &str)] = &[
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("leaves", "leaf"),
    ("knives", "knife"),
    ("wives", "wife"),
    ("lives", "life"),
    ("shelves", "shelf"),
];

/// Words ending in `s` that are already base forms
const INVARIANT: &[&str] = &[
    "always", "perhaps", "sometimes", "news", "towards", "afterwards", "besides", "upstairs",
    "downstairs", "series", "species", "thanks", "whereas", "overseas",
];

/// Dictionary-free noun lemmatizer
///
/// Only plural nouns are reduced. Verb and adjective inflections are left as
/// they are, so "loved" stays "loved" while "rooms" becomes "room".
#[derive(Debug, Clone, Copy, Default)]
pub struct NounLemmatizer;

impl NounLemmatizer {
    pub fn new() -> Self {
        Self
    }
}

impl Lemmatizer for NounLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        if let Some((_, base)) = IRREGULAR_NOUNS.iter().find(|(plural, _)| *plural == word) {
            return base.to_string();
        }
        if word.chars().count() <= 3 || INVARIANT.contains(&word) || !word.ends_with('s') {
            return word.to_string();
        }

        if let Some(stem) = word.strip_suffix("ies") {
            if stem.chars().count() >= 2 {
                return format!("{stem}y");
            }
        }
        for suffix in ["sses", "ches", "shes", "xes"] {
            if word.ends_with(suffix) {
                return word[..word.len() - 2].to_string();
            }
        }
        if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
            return word.to_string();
        }
        word[..word.len() - 1].to_string()
    }
}

/// Leaves every word unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLemmatizer;

impl Lemmatizer for IdentityLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        word.to_string()
    }
}
