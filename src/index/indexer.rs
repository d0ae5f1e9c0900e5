//! Secondary Indexes
//!
//! Main table of id -> record plus, per index name, a postings store of
//! key -> set of ids.
//!
//! Updates touch the main table and the postings one step at a time with
//! no lock spanning them, so a concurrent search can see a record in one
//! place and not yet in the other. Search reports that case as
//! [`SearchError::InconsistentState`] instead of hiding it.

use hashbrown::HashMap;
use parking_lot::RwLock;
use std::fmt;
use tracing::{debug, warn};

use super::{Indexed, SearchResult};
use crate::error::SearchError;
use crate::storage::{Set, Store, StoreOptions};

type Postings = Store<String, Set<String>>;

/// Record store with named secondary indexes
pub struct Indexer<R> {
    main: Store<String, R>,
    postings: RwLock<HashMap<String, Postings>>,
}

impl<R: Indexed> Default for Indexer<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for Indexer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Indexer")
            .field("main", &self.main)
            .field("indexes", &self.postings.read().len())
            .finish()
    }
}

impl<R: Indexed> Indexer<R> {
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// `options` configure the main table; postings never expire.
    pub fn with_options(options: StoreOptions<R>) -> Self {
        Self {
            main: Store::new(options),
            postings: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        self.main.name()
    }

    fn postings(&self, index: &str) -> Option<Postings> {
        self.postings.read().get(index).cloned()
    }

    fn postings_or_create(&self, index: &str) -> Postings {
        if let Some(postings) = self.postings(index) {
            return postings;
        }

        let mut indexes = self.postings.write();
        indexes
            .entry(index.to_string())
            .or_insert_with(|| {
                debug!(indexer = %self.main.name(), index = %index, "Created postings store");
                Store::new(
                    StoreOptions::default().with_name(format!("{}:{}", self.main.name(), index)),
                )
            })
            .clone()
    }

    /// Insert or replace the record under its id.
    ///
    /// A previous record with the same id has its postings retracted first,
    /// so keys it no longer produces stop finding it. This includes a
    /// previous record that has expired but has not been swept yet.
    pub fn set(&self, record: R) {
        let id = record.id();
        if let Some(previous) = self.main.get_raw(&id) {
            self.retract(&id, &previous);
        }

        let index_keys = record.index_keys();
        self.main.set(id.clone(), record);

        for (index, keys) in index_keys {
            let postings = self.postings_or_create(index);
            for key in keys {
                let ids = match postings.get(&key) {
                    Some(ids) => ids,
                    None => postings.get_or_insert(key, Set::new()),
                };
                ids.insert(id.clone());
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<R> {
        self.main.get(id)
    }

    /// Remove the live record under `id`, returning it.
    ///
    /// An id without a live record is ignored, including any postings that
    /// still mention it.
    pub fn delete(&self, id: &str) -> Option<R> {
        let record = self.main.get(id)?;
        self.delete_record(&record);
        Some(record)
    }

    /// Remove `record`'s id from the main table and from every postings
    /// set its index keys point at.
    pub fn delete_record(&self, record: &R) {
        let id = record.id();
        self.main.delete(&id);
        self.retract(&id, record);
    }

    fn retract(&self, id: &str, record: &R) {
        for (index, keys) in record.index_keys() {
            let Some(postings) = self.postings(index) else {
                continue;
            };
            for key in keys {
                if let Some(ids) = postings.get(&key) {
                    ids.delete(id);
                }
            }
        }
    }

    /// Visit live records until `visit` returns false
    pub fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&str, &R) -> bool,
    {
        self.main.range(|id, record| visit(id, record));
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.main.len()
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_empty()
    }

    /// Names of every index populated so far
    pub fn index_names(&self) -> Vec<String> {
        self.postings.read().keys().cloned().collect()
    }

    /// All keys present under `index`
    pub fn set_from_index(&self, index: &str) -> Result<Set<String>, SearchError> {
        let postings = self.postings(index).ok_or_else(|| SearchError::IndexNotFound {
            index: index.to_string(),
        })?;
        Ok(postings.keys().into_iter().collect())
    }

    /// Records whose `index` keys include `key`
    pub fn search(&self, index: &str, key: &str) -> SearchResult<R> {
        self.resolve(index, key).into()
    }

    fn resolve(&self, index: &str, key: &str) -> Result<Vec<R>, SearchError> {
        let postings = self.postings(index).ok_or_else(|| SearchError::IndexNotFound {
            index: index.to_string(),
        })?;
        let ids = postings.get(key).ok_or_else(|| SearchError::KeyNotFound {
            index: index.to_string(),
            key: key.to_string(),
        })?;

        ids.list()
            .into_iter()
            .map(|id| {
                self.main.get(&id).ok_or_else(|| {
                    warn!(index = %index, key = %key, id = %id, "Postings reference a missing record");
                    SearchError::InconsistentState {
                        index: index.to_string(),
                        key: key.to_string(),
                        id,
                    }
                })
            })
            .collect()
    }
}
