//! Indexing
//!
//! Multi-attribute lookup over a collection of records.

mod indexed;
mod indexer;
mod search;

pub use indexed::{IndexFn, Indexed};
pub use indexer::Indexer;
pub use search::SearchResult;
