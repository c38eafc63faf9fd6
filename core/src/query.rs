use crate::error::{Result, SearchError};
use crate::tokenizer::{is_valid_word, split_into_words, StopWords};
use crate::ExecutionMode;
use rayon::prelude::*;
use std::collections::BTreeSet;

/// Output shape of the query parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryShape {
    /// Deduplicated ordered set.
    OrderedSet,
    /// Deduplicated vector, sorted so membership can use binary search.
    SortedVec,
    /// Query order, duplicates kept. Cheapest to build.
    Raw,
}

impl QueryShape {
    pub fn for_ranking(mode: ExecutionMode) -> Self {
        match mode {
            ExecutionMode::Sequential => QueryShape::OrderedSet,
            ExecutionMode::Parallel => QueryShape::SortedVec,
        }
    }

    pub fn for_matching(mode: ExecutionMode) -> Self {
        match mode {
            ExecutionMode::Sequential => QueryShape::SortedVec,
            ExecutionMode::Parallel => QueryShape::Raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordList<'a> {
    Set(BTreeSet<&'a str>),
    Sorted(Vec<&'a str>),
    Raw(Vec<&'a str>),
}

impl<'a> WordList<'a> {
    fn empty(shape: QueryShape) -> Self {
        match shape {
            QueryShape::OrderedSet => WordList::Set(BTreeSet::new()),
            QueryShape::SortedVec => WordList::Sorted(Vec::new()),
            QueryShape::Raw => WordList::Raw(Vec::new()),
        }
    }

    fn push(&mut self, word: &'a str) {
        match self {
            WordList::Set(set) => { set.insert(word); }
            WordList::Sorted(words) | WordList::Raw(words) => words.push(word),
        }
    }

    fn finish(self) -> Self {
        match self {
            WordList::Sorted(mut words) => {
                words.sort_unstable();
                words.dedup();
                WordList::Sorted(words)
            }
            other => other,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            WordList::Set(set) => set.len(),
            WordList::Sorted(words) | WordList::Raw(words) => words.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        let (set, words) = match self {
            WordList::Set(set) => (Some(set.iter()), None),
            WordList::Sorted(words) | WordList::Raw(words) => (None, Some(words.iter())),
        };
        set.into_iter().flatten().chain(words.into_iter().flatten()).copied()
    }

    pub fn contains(&self, word: &str) -> bool {
        match self {
            WordList::Set(set) => set.contains(word),
            WordList::Sorted(words) => words.binary_search(&word).is_ok(),
            WordList::Raw(words) => words.contains(&word),
        }
    }

    /// Run `op` for every word on the current rayon pool. Returns once all calls finished.
    pub fn par_for_each<F>(&self, op: F)
    where
        F: Fn(&'a str) + Sync + Send,
    {
        match self {
            WordList::Set(set) => set.par_iter().for_each(|w| op(*w)),
            WordList::Sorted(words) | WordList::Raw(words) => words.par_iter().for_each(|w| op(*w)),
        }
    }

    pub fn par_any<F>(&self, pred: F) -> bool
    where
        F: Fn(&'a str) -> bool + Sync + Send,
    {
        match self {
            WordList::Set(set) => set.par_iter().any(|w| pred(*w)),
            WordList::Sorted(words) | WordList::Raw(words) => words.par_iter().any(|w| pred(*w)),
        }
    }

    /// Parallel `filter_map`, results kept in list order.
    pub fn par_filter_map<T, F>(&self, op: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&'a str) -> Option<T> + Sync + Send,
    {
        match self {
            WordList::Set(set) => set.par_iter().filter_map(|w| op(*w)).collect(),
            WordList::Sorted(words) | WordList::Raw(words) => words.par_iter().filter_map(|w| op(*w)).collect(),
        }
    }
}

/// Parsed plus/minus query, borrowing its words from the raw query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query<'a> {
    pub plus_words: WordList<'a>,
    pub minus_words: WordList<'a>,
}

impl<'a> Query<'a> {
    pub fn shape(&self) -> QueryShape {
        match self.plus_words {
            WordList::Set(_) => QueryShape::OrderedSet,
            WordList::Sorted(_) => QueryShape::SortedVec,
            WordList::Raw(_) => QueryShape::Raw,
        }
    }
}

struct QueryWord<'a> {
    data: &'a str,
    is_minus: bool,
    is_stop: bool,
}

fn parse_query_word<'a>(text: &'a str, stop_words: &StopWords) -> Result<QueryWord<'a>> {
    if text.is_empty() {
        return Err(SearchError::EmptyQueryWord);
    }
    let (data, is_minus) = match text.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (text, false),
    };
    if data.is_empty() || data.starts_with('-') || !is_valid_word(data) {
        return Err(SearchError::InvalidQueryWord(text.to_string()));
    }
    Ok(QueryWord { data, is_minus, is_stop: stop_words.contains(data) })
}

pub fn parse_query<'a>(text: &'a str, stop_words: &StopWords, shape: QueryShape) -> Result<Query<'a>> {
    let mut plus_words = WordList::empty(shape);
    let mut minus_words = WordList::empty(shape);
    for token in split_into_words(text) {
        let word = parse_query_word(token, stop_words)?;
        if word.is_stop { continue; }
        if word.is_minus {
            minus_words.push(word.data);
        } else {
            plus_words.push(word.data);
        }
    }
    Ok(Query { plus_words: plus_words.finish(), minus_words: minus_words.finish() })
}
