use crate::concurrent_map::ConcurrentMap;
use crate::error::{Result, SearchError};
use crate::index::SearchServer;
use crate::parallel;
use crate::query::{Query, QueryShape};
use crate::{DocId, Document, DocumentStatus, ExecutionMode, MAX_RESULT_DOCUMENT_COUNT, RELEVANCE_THRESHOLD};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Caller-supplied selection of the documents a ranking call may return.
pub trait DocumentFilter: Sync {
    fn matches(&self, document_id: DocId, status: DocumentStatus, rating: i32) -> bool;
}

impl DocumentFilter for DocumentStatus {
    fn matches(&self, _document_id: DocId, status: DocumentStatus, _rating: i32) -> bool { *self == status }
}

impl<F> DocumentFilter for F
where
    F: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
{
    fn matches(&self, document_id: DocId, status: DocumentStatus, rating: i32) -> bool {
        self(document_id, status, rating)
    }
}

/// Cell of `relevance` on a grid of [`RELEVANCE_THRESHOLD`] steps. Documents in one cell
/// tie on relevance.
pub fn relevance_bucket(relevance: f64) -> f64 { (relevance / RELEVANCE_THRESHOLD).floor() }

/// Relevance bucket descending, then rating descending. This is a total order, so the
/// sequential and the parallel sort agree on it.
fn by_relevance(lhs: &Document, rhs: &Document) -> Ordering {
    relevance_bucket(rhs.relevance)
        .total_cmp(&relevance_bucket(lhs.relevance))
        .then_with(|| rhs.rating.cmp(&lhs.rating))
}

impl SearchServer {
    /// `ln(N / df)`. `None` when the word is not indexed.
    pub fn compute_idf(&self, word: &str) -> Option<f64> {
        self.word_to_document_freqs.get(word).map(|postings| self.idf(postings.len()))
    }

    fn idf(&self, containing: usize) -> f64 { (self.document_count() as f64 / containing as f64).ln() }

    /// Top documents with status [`DocumentStatus::Actual`].
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_with(ExecutionMode::Sequential, raw_query, DocumentStatus::Actual)
    }

    pub fn find_top_documents_by<F: DocumentFilter>(&self, raw_query: &str, filter: F) -> Result<Vec<Document>> {
        self.find_top_documents_with(ExecutionMode::Sequential, raw_query, filter)
    }

    pub fn find_top_documents_with<F: DocumentFilter>(
        &self,
        mode: ExecutionMode,
        raw_query: &str,
        filter: F,
    ) -> Result<Vec<Document>> {
        let query = self.parse_query(raw_query, QueryShape::for_ranking(mode))?;
        let mut matched = match mode {
            ExecutionMode::Sequential => {
                let mut matched = self.find_all_documents(&query, &filter);
                matched.sort_by(by_relevance);
                matched
            }
            ExecutionMode::Parallel => {
                let mut matched = self.find_all_documents_parallel(&query, &filter);
                parallel::install(|| matched.par_sort_by(by_relevance));
                matched
            }
        };
        matched.truncate(MAX_RESULT_DOCUMENT_COUNT);
        Ok(matched)
    }

    fn find_all_documents<F: DocumentFilter>(&self, query: &Query<'_>, filter: &F) -> Vec<Document> {
        let mut document_to_relevance: BTreeMap<DocId, f64> = BTreeMap::new();
        for word in query.plus_words.iter() {
            let Some(postings) = self.word_to_document_freqs.get(word) else { continue };
            let idf = self.idf(postings.len());
            for (&document_id, &term_freq) in postings {
                if self.accepts(filter, document_id) {
                    *document_to_relevance.entry(document_id).or_insert(0.0) += term_freq * idf;
                }
            }
        }

        for word in query.minus_words.iter() {
            let Some(postings) = self.word_to_document_freqs.get(word) else { continue };
            for document_id in postings.keys() {
                document_to_relevance.remove(document_id);
            }
        }

        self.collect_documents(document_to_relevance)
    }

    fn find_all_documents_parallel<F: DocumentFilter>(&self, query: &Query<'_>, filter: &F) -> Vec<Document> {
        let document_to_relevance: ConcurrentMap<DocId, f64> = ConcurrentMap::new(parallel::relevance_shard_count());
        tracing::debug!(
            shards = document_to_relevance.shard_count(),
            plus = query.plus_words.len(),
            minus = query.minus_words.len(),
            "parallel ranking"
        );

        parallel::install(|| {
            query.plus_words.par_for_each(|word| {
                let Some(postings) = self.word_to_document_freqs.get(word) else { return };
                let idf = self.idf(postings.len());
                for (&document_id, &term_freq) in postings {
                    if self.accepts(filter, document_id) {
                        *document_to_relevance.access(document_id) += term_freq * idf;
                    }
                }
            });
            // Every plus word has been accumulated; exclusion must not race with it.
            query.minus_words.par_for_each(|word| {
                let Some(postings) = self.word_to_document_freqs.get(word) else { return };
                for document_id in postings.keys() {
                    document_to_relevance.erase(document_id);
                }
            });
        });

        self.collect_documents(document_to_relevance.build_ordinary_map())
    }

    fn accepts<F: DocumentFilter>(&self, filter: &F, document_id: DocId) -> bool {
        self.documents
            .get(&document_id)
            .is_some_and(|data| filter.matches(document_id, data.status, data.rating))
    }

    fn collect_documents(&self, document_to_relevance: BTreeMap<DocId, f64>) -> Vec<Document> {
        document_to_relevance
            .into_iter()
            .filter_map(|(id, relevance)| self.documents.get(&id).map(|data| Document::new(id, relevance, data.rating)))
            .collect()
    }

    pub fn match_document(&self, raw_query: &str, document_id: DocId) -> Result<(Vec<&str>, DocumentStatus)> {
        self.match_document_with(ExecutionMode::Sequential, raw_query, document_id)
    }

    /// Plus words of the query that index `document_id`, sorted and deduplicated, plus the
    /// document status. The word list is empty when a minus word indexes the document.
    pub fn match_document_with(
        &self,
        mode: ExecutionMode,
        raw_query: &str,
        document_id: DocId,
    ) -> Result<(Vec<&str>, DocumentStatus)> {
        let query = self.parse_query(raw_query, QueryShape::for_matching(mode))?;
        let status = self.document_status(document_id).ok_or(SearchError::UnknownId(document_id))?;
        let indexes = |word: &str| {
            self.word_to_document_freqs
                .get(word)
                .is_some_and(|postings| postings.contains_key(&document_id))
        };

        let matched: Vec<&str> = match mode {
            ExecutionMode::Sequential => {
                if query.minus_words.iter().any(indexes) {
                    return Ok((Vec::new(), status));
                }
                // Sorted, deduplicated input keeps the output sorted.
                query.plus_words.iter().filter_map(|word| self.indexed_word(word, document_id)).collect()
            }
            ExecutionMode::Parallel => {
                if parallel::install(|| query.minus_words.par_any(indexes)) {
                    return Ok((Vec::new(), status));
                }
                let mut matched: Vec<&str> = parallel::install(|| {
                    query.plus_words.par_filter_map(|word| self.indexed_word(word, document_id))
                });
                matched.sort_unstable();
                matched.dedup();
                matched
            }
        };
        Ok((matched, status))
    }

    /// The index's copy of `word` if it indexes `document_id`.
    fn indexed_word(&self, word: &str, document_id: DocId) -> Option<&str> {
        self.word_to_document_freqs
            .get_key_value(word)
            .filter(|(_, postings)| postings.contains_key(&document_id))
            .map(|(word, _)| word.as_str())
    }
}
