use crate::error::{Result, SearchError};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

lazy_static! {
    static ref CONTROL_CHARS: Regex = Regex::new(r"[\x00-\x1F]").expect("valid regex");
}

/// Split on the space character, skipping the empty runs between consecutive spaces.
pub fn split_into_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(' ').filter(|w| !w.is_empty())
}

/// A word is valid when it carries no ASCII control character.
pub fn is_valid_word(word: &str) -> bool { !CONTROL_CHARS.is_match(word) }

/// Terms excluded from both the index and queries. Fixed at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWords {
    words: BTreeSet<String>,
}

impl StopWords {
    pub fn from_text(text: &str) -> Result<Self> { Self::from_words(split_into_words(text)) }

    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for word in words {
            let word = word.as_ref();
            if word.is_empty() { continue; }
            if !is_valid_word(word) {
                return Err(SearchError::InvalidStopWord(word.to_string()));
            }
            set.insert(word.to_string());
        }
        Ok(Self { words: set })
    }

    pub fn contains(&self, word: &str) -> bool { self.words.contains(word) }

    pub fn len(&self) -> usize { self.words.len() }

    pub fn is_empty(&self) -> bool { self.words.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &str> { self.words.iter().map(String::as_str) }

    /// Tokenize document text, dropping stop words. Every token is validated,
    /// stop words included, so a failure is reported before anything is indexed.
    pub fn split_no_stop<'t>(&self, text: &'t str) -> Result<Vec<&'t str>> {
        let mut words = Vec::new();
        for word in split_into_words(text) {
            if !is_valid_word(word) {
                return Err(SearchError::InvalidWord(word.to_string()));
            }
            if !self.contains(word) {
                words.push(word);
            }
        }
        Ok(words)
    }
}
