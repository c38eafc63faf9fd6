use crate::error::{Result, SearchError};
use crate::parallel;
use crate::query::{parse_query, Query, QueryShape};
use crate::tokenizer::StopWords;
use crate::{DocId, DocumentStatus, ExecutionMode};
use rayon::prelude::*;
use std::collections::{btree_set, BTreeMap, BTreeSet};

static EMPTY_FREQUENCIES: BTreeMap<String, f64> = BTreeMap::new();

#[derive(Debug, Clone)]
pub(crate) struct DocumentData {
    pub(crate) rating: i32,
    pub(crate) status: DocumentStatus,
    pub(crate) text: String,
}

/// In-memory document store with a term -> document inverted index and its mirror.
///
/// Mutations take `&mut self`; wrap the server in a [`crate::SharedSearchServer`] to share
/// it between threads.
#[derive(Debug, Clone, Default)]
pub struct SearchServer {
    stop_words: StopWords,
    /// term -> (doc id -> term frequency)
    pub(crate) word_to_document_freqs: BTreeMap<String, BTreeMap<DocId, f64>>,
    /// doc id -> (term -> term frequency)
    pub(crate) document_to_word_freqs: BTreeMap<DocId, BTreeMap<String, f64>>,
    pub(crate) documents: BTreeMap<DocId, DocumentData>,
    document_ids: BTreeSet<DocId>,
}

impl SearchServer {
    /// Build a server from space-separated stop words.
    pub fn new(stop_words_text: &str) -> Result<Self> {
        Ok(Self::from_stop_words(StopWords::from_text(stop_words_text)?))
    }

    pub fn with_stop_words<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::from_stop_words(StopWords::from_words(stop_words)?))
    }

    pub fn from_stop_words(stop_words: StopWords) -> Self { Self { stop_words, ..Self::default() } }

    pub fn stop_words(&self) -> &StopWords { &self.stop_words }

    pub fn add_document(&mut self, document_id: DocId, document: &str, status: DocumentStatus, ratings: &[i32]) -> Result<()> {
        if document_id < 0 || self.documents.contains_key(&document_id) {
            return Err(SearchError::InvalidId(document_id));
        }
        // Validate every word before touching any map.
        let words = self.stop_words.split_no_stop(document)?;

        if !words.is_empty() {
            let inv_word_count = 1.0 / words.len() as f64;
            let doc_freqs = self.document_to_word_freqs.entry(document_id).or_default();
            for &word in &words {
                *self
                    .word_to_document_freqs
                    .entry(word.to_string())
                    .or_default()
                    .entry(document_id)
                    .or_insert(0.0) += inv_word_count;
                *doc_freqs.entry(word.to_string()).or_insert(0.0) += inv_word_count;
            }
        }

        let rating = compute_average_rating(ratings);
        self.documents.insert(document_id, DocumentData { rating, status, text: document.to_string() });
        self.document_ids.insert(document_id);
        tracing::debug!(document_id, words = words.len(), rating, "document added");
        Ok(())
    }

    pub fn remove_document(&mut self, document_id: DocId) -> Result<()> {
        self.remove_document_with(ExecutionMode::Sequential, document_id)
    }

    /// Remove a document from every structure. In parallel mode the per-term erasures run
    /// on the worker pool and all of them finish before the document's own entries go.
    pub fn remove_document_with(&mut self, mode: ExecutionMode, document_id: DocId) -> Result<()> {
        if !self.document_ids.contains(&document_id) {
            return Err(SearchError::UnknownId(document_id));
        }

        if let Some(words) = self.document_to_word_freqs.get(&document_id) {
            match mode {
                ExecutionMode::Sequential => {
                    for word in words.keys() {
                        if let Some(postings) = self.word_to_document_freqs.get_mut(word) {
                            postings.remove(&document_id);
                        }
                    }
                }
                ExecutionMode::Parallel => {
                    // The document's posting maps are taken out of the index so each task owns one.
                    let mut postings: Vec<(String, BTreeMap<DocId, f64>)> = words
                        .keys()
                        .filter_map(|word| self.word_to_document_freqs.remove_entry(word))
                        .collect();
                    parallel::install(|| {
                        postings.par_iter_mut().for_each(|(_, postings)| {
                            postings.remove(&document_id);
                        })
                    });
                    self.word_to_document_freqs.extend(postings);
                }
            }
        }

        if let Some(words) = self.document_to_word_freqs.remove(&document_id) {
            for word in words.keys() {
                if self.word_to_document_freqs.get(word).is_some_and(BTreeMap::is_empty) {
                    self.word_to_document_freqs.remove(word);
                }
            }
        }
        self.documents.remove(&document_id);
        self.document_ids.remove(&document_id);
        tracing::debug!(document_id, ?mode, "document removed");
        Ok(())
    }

    /// Term frequencies of one document. Empty when the id is unknown or has no indexed words.
    pub fn word_frequencies(&self, document_id: DocId) -> &BTreeMap<String, f64> {
        self.document_to_word_freqs.get(&document_id).unwrap_or(&EMPTY_FREQUENCIES)
    }

    pub fn document_count(&self) -> usize { self.documents.len() }

    /// Live ids in ascending order.
    pub fn iter(&self) -> std::iter::Copied<btree_set::Iter<'_, DocId>> { self.document_ids.iter().copied() }

    /// The `index`-th live id in ascending order.
    pub fn document_id(&self, index: usize) -> Option<DocId> { self.document_ids.iter().nth(index).copied() }

    pub fn document_status(&self, document_id: DocId) -> Option<DocumentStatus> {
        self.documents.get(&document_id).map(|d| d.status)
    }

    pub fn document_rating(&self, document_id: DocId) -> Option<i32> {
        self.documents.get(&document_id).map(|d| d.rating)
    }

    pub fn document_text(&self, document_id: DocId) -> Option<&str> {
        self.documents.get(&document_id).map(|d| d.text.as_str())
    }

    pub fn parse_query<'q>(&self, text: &'q str, shape: QueryShape) -> Result<Query<'q>> {
        parse_query(text, &self.stop_words, shape)
    }
}

impl<'a> IntoIterator for &'a SearchServer {
    type Item = DocId;
    type IntoIter = std::iter::Copied<btree_set::Iter<'a, DocId>>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

/// Integer mean, truncated toward zero. Zero for no ratings.
fn compute_average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|&r| r as i64).sum();
    (sum / ratings.len() as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> SearchServer {
        let mut server = SearchServer::new("and with").unwrap();
        server.add_document(1, "funny pet and nasty rat", DocumentStatus::Actual, &[7, 2, 7]).unwrap();
        server.add_document(2, "funny pet with curly hair", DocumentStatus::Actual, &[1, 2]).unwrap();
        server
    }

    #[test]
    fn average_rating_truncates_toward_zero() {
        assert_eq!(compute_average_rating(&[]), 0);
        assert_eq!(compute_average_rating(&[7, 2, 7]), 5);
        assert_eq!(compute_average_rating(&[-7, -2, -7]), -5);
        assert_eq!(compute_average_rating(&[i32::MAX, i32::MAX]), i32::MAX);
    }

    #[test]
    fn term_frequencies_sum_to_one() {
        let mut server = server();
        server.add_document(3, "rat rat cat", DocumentStatus::Banned, &[]).unwrap();
        for id in &server {
            let total: f64 = server.word_frequencies(id).values().sum();
            assert!((total - 1.0).abs() < 1e-9, "doc {id} sums to {total}");
        }
        assert!((server.word_frequencies(3)["rat"] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn inverted_index_mirrors_reverse_index() {
        let server = server();
        for (word, postings) in &server.word_to_document_freqs {
            for (id, tf) in postings {
                assert_eq!(server.document_to_word_freqs[id][word], *tf);
            }
        }
        assert_eq!(server.word_to_document_freqs["funny"].len(), 2);
        assert!(!server.word_to_document_freqs.contains_key("and"));
    }

    #[test]
    fn rejects_negative_and_duplicate_ids() {
        let mut server = server();
        assert_eq!(server.add_document(-1, "cat", DocumentStatus::Actual, &[]), Err(SearchError::InvalidId(-1)));
        assert_eq!(server.add_document(1, "cat", DocumentStatus::Actual, &[]), Err(SearchError::InvalidId(1)));
        assert_eq!(server.document_count(), 2);
    }

    #[test]
    fn invalid_word_leaves_no_partial_state() {
        let mut server = server();
        let before = server.word_to_document_freqs.clone();
        let err = server.add_document(3, "fresh words then bro\x02ken", DocumentStatus::Actual, &[1]).unwrap_err();
        assert_eq!(err, SearchError::InvalidWord("bro\x02ken".into()));
        assert_eq!(server.document_count(), 2);
        assert_eq!(server.word_to_document_freqs, before);
        assert!(server.word_frequencies(3).is_empty());
        assert!(server.add_document(3, "fresh words", DocumentStatus::Actual, &[1]).is_ok());
    }

    #[test]
    fn stop_word_only_document_is_stored_without_index_entries() {
        let mut server = server();
        server.add_document(5, "and with", DocumentStatus::Actual, &[3]).unwrap();
        assert_eq!(server.document_count(), 3);
        assert!(server.word_frequencies(5).is_empty());
        assert_eq!(server.document_text(5), Some("and with"));
        server.remove_document(5).unwrap();
        assert_eq!(server.document_count(), 2);
    }

    #[test]
    fn remove_prunes_orphan_terms() {
        for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
            let mut server = server();
            server.remove_document_with(mode, 1).unwrap();
            assert!(!server.word_to_document_freqs.contains_key("rat"));
            assert!(!server.word_to_document_freqs["funny"].contains_key(&1));
            assert_eq!(server.word_to_document_freqs["funny"].len(), 1);
            assert!(server.document_status(1).is_none());
            assert_eq!(server.remove_document_with(mode, 1), Err(SearchError::UnknownId(1)));
        }
    }

    #[test]
    fn parallel_remove_leaves_the_same_index_as_sequential() {
        let mut sequential = server();
        sequential.add_document(3, "nasty cat with curly tail", DocumentStatus::Actual, &[4]).unwrap();
        let mut parallel = sequential.clone();
        for id in [1, 3] {
            sequential.remove_document_with(ExecutionMode::Sequential, id).unwrap();
            parallel.remove_document_with(ExecutionMode::Parallel, id).unwrap();
            assert_eq!(sequential.word_to_document_freqs, parallel.word_to_document_freqs);
            assert_eq!(sequential.document_to_word_freqs, parallel.document_to_word_freqs);
        }
        assert_eq!(parallel.word_to_document_freqs.keys().collect::<Vec<_>>(), vec!["curly", "funny", "hair", "pet"]);
    }

    #[test]
    fn ids_iterate_in_ascending_order() {
        let mut server = SearchServer::default();
        for id in [9, 3, 5] {
            server.add_document(id, "x", DocumentStatus::Actual, &[]).unwrap();
        }
        assert_eq!(server.iter().collect::<Vec<_>>(), vec![3, 5, 9]);
        assert_eq!(server.document_id(1), Some(5));
        assert_eq!(server.document_id(3), None);
    }
}
