use crate::DocId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Negative id, or an id that is already indexed.
    #[error("invalid document id {0}")]
    InvalidId(DocId),
    #[error("word {0:?} contains control characters")]
    InvalidWord(String),
    #[error("stop word {0:?} contains control characters")]
    InvalidStopWord(String),
    #[error("query word is empty")]
    EmptyQueryWord,
    #[error("query word {0:?} is invalid")]
    InvalidQueryWord(String),
    #[error("document {0} not found")]
    UnknownId(DocId),
}

pub type Result<T> = std::result::Result<T, SearchError>;
