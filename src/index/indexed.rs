//! Record contract for [`Indexer`](crate::Indexer).

/// Computes the keys a record is discoverable under for one index.
pub type IndexFn<R> = fn(&R) -> Vec<String>;

/// A record that can be stored in an [`Indexer`](crate::Indexer)
///
/// ```
/// use indexcache::{IndexFn, Indexed};
///
/// #[derive(Clone)]
/// struct Person {
///     id: String,
///     country: String,
/// }
///
/// impl Indexed for Person {
///     fn id(&self) -> String {
///         self.id.clone()
///     }
///
///     fn indexes(&self) -> Vec<(&'static str, IndexFn<Self>)> {
///         let by_country: IndexFn<Self> = |p| vec![p.country.clone()];
///         vec![("country", by_country)]
///     }
/// }
/// ```
pub trait Indexed: Clone + Send + Sync + 'static {
    /// Stable identity; a second record with the same id replaces the first
    fn id(&self) -> String;

    /// Index name paired with the function computing this record's keys
    fn indexes(&self) -> Vec<(&'static str, IndexFn<Self>)>;

    /// Keys per index for this record as it is now
    fn index_keys(&self) -> Vec<(&'static str, Vec<String>)> {
        self.indexes()
            .into_iter()
            .map(|(name, index)| (name, index(self)))
            .collect()
    }
}
