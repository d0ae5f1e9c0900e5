//! Error types

use thiserror::Error;

/// Failures reported by [`Indexer::search`](crate::Indexer::search).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The index name has never been populated.
    #[error("no such index: {index}")]
    IndexNotFound { index: String },

    /// The index exists but has no postings for this key.
    #[error("index {index} has no such key: {key}")]
    KeyNotFound { index: String, key: String },

    /// A postings id did not resolve to a live record in the main table.
    #[error("index {index} key {key} references missing record {id}")]
    InconsistentState {
        index: String,
        key: String,
        id: String,
    },
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Rejected configuration value.
    #[error("invalid option: {0}")]
    InvalidOption(String),
}

pub type Result<T> = std::result::Result<T, Error>;
