use serde::{Deserialize, Serialize};

pub mod concurrent_map;
pub mod dedup;
pub mod error;
pub mod index;
pub mod paginate;
pub mod parallel;
pub mod process_queries;
pub mod query;
pub mod ranking;
pub mod request_queue;
pub mod shared;
pub mod tokenizer;

pub use concurrent_map::ConcurrentMap;
pub use dedup::{find_duplicates, remove_duplicates, remove_duplicates_with};
pub use error::{Result, SearchError};
pub use index::SearchServer;
pub use paginate::paginate;
pub use process_queries::{process_queries, process_queries_joined};
pub use query::{Query, QueryShape, WordList};
pub use ranking::{relevance_bucket, DocumentFilter};
pub use request_queue::RequestQueue;
pub use shared::SharedSearchServer;
pub use tokenizer::StopWords;

pub type DocId = i32;

/// Upper bound on the number of documents returned by a ranking call.
pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;
/// Relevance values closer than this are ranked by rating instead.
pub const RELEVANCE_THRESHOLD: f64 = 1e-6;
/// Number of requests kept by a [`RequestQueue`] (one per minute of a day).
pub const REQUEST_WINDOW: usize = 1440;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Actual,
    Irrelevant,
    Banned,
    Removed,
}

/// A ranked search hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub relevance: f64,
    pub rating: i32,
}

impl Document {
    pub fn new(id: DocId, relevance: f64, rating: i32) -> Self { Self { id, relevance, rating } }
}

/// Selects between the single-threaded and the fork-join code path of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
}
