//! INDEXCACHE - In-Process Expiring Store with Secondary Indexes
//!
//! A concurrent key-value store whose entries expire lazily, a registry
//! that sweeps expired entries from every registered store in the
//! background, expiring sets, and an indexer that looks records up by
//! any number of named attributes.

pub mod error;
pub mod index;
pub mod registry;
pub mod storage;

pub use error::{Error, Result, SearchError};
pub use index::{IndexFn, Indexed, Indexer, SearchResult};
pub use registry::{Registry, RegistryConfig, Sweep, Sweeper};
pub use storage::{ExpiresAt, ReferenceTime, Set, Store, StoreOptions, FOREVER};
