//! Expiring Key-Value Store
//!
//! Concurrent hashmap using DashMap with lazily evaluated expiry. Expired
//! entries stay in the map until [`Store::sweep`] removes them.

use dashmap::mapref::entry::Entry as Slot;
use dashmap::DashMap;
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use super::entry::Entry;
use super::{Set, StoreOptions};
use crate::registry::Sweep;

struct Inner<K, V> {
    map: DashMap<K, Entry<V>>,
    options: StoreOptions<V>,
}

/// Concurrent key-value store with per-entry expiry
///
/// Cloning is cheap and yields another handle to the same map.
pub struct Store<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for Store<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Eq + Hash, V> fmt::Debug for Store<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.options.name)
            .field("ttl", &self.inner.options.ttl)
            .field("stored", &self.inner.map.len())
            .finish()
    }
}

impl<K, V> Default for Store<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a store, registering it for sweeping unless it opted out
    pub fn new(mut options: StoreOptions<V>) -> Self {
        if options.ttl >= super::FOREVER {
            options.no_registry = true;
        }
        let registry = if options.no_registry {
            None
        } else {
            options.registry()
        };

        let store = Self {
            inner: Arc::new(Inner {
                map: DashMap::new(),
                options,
            }),
        };

        if let Some(registry) = registry {
            registry.register(Arc::new(store.clone()));
        }
        store
    }

    /// Registry key
    pub fn name(&self) -> &str {
        &self.inner.options.name
    }

    /// Lifetime given to entries without their own deadline
    pub fn ttl(&self) -> Duration {
        self.inner.options.ttl
    }

    /// Options the store was built with
    pub fn options(&self) -> &StoreOptions<V> {
        &self.inner.options
    }

    #[inline]
    fn wrap(&self, value: V, now: Instant) -> Entry<V> {
        Entry::wrap(value, &self.inner.options, now)
    }

    /// Insert or overwrite `key`, resolving its deadline now
    #[inline]
    pub fn set(&self, key: K, value: V) {
        let entry = self.wrap(value, Instant::now());
        self.inner.map.insert(key, entry);
    }

    /// Get value by key, returns None if key doesn't exist or is expired
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.map.get(key).and_then(|entry| {
            if entry.is_expired() {
                None
            } else {
                Some(entry.value.clone())
            }
        })
    }

    /// Get value by key even if it has expired but not been swept yet
    pub(crate) fn get_raw<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.map.get(key).map(|entry| entry.value.clone())
    }

    /// Return the live value under `key`, or install `value` and return it.
    /// An expired entry counts as absent and is replaced.
    pub fn get_or_insert(&self, key: K, value: V) -> V {
        let now = Instant::now();
        match self.inner.map.entry(key) {
            Slot::Occupied(mut slot) => {
                if !slot.get().is_expired_at(now) {
                    return slot.get().value.clone();
                }
                slot.insert(self.wrap(value.clone(), now));
                value
            }
            Slot::Vacant(slot) => {
                slot.insert(self.wrap(value.clone(), now));
                value
            }
        }
    }

    /// Delete key whether expired or not, returns true if an entry was stored
    #[inline]
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.map.remove(key).is_some()
    }

    /// Check if key exists and is not expired
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner
            .map
            .get(key)
            .map(|e| !e.is_expired())
            .unwrap_or(false)
    }

    /// Check if an entry is physically stored, expired or not
    pub fn contains_raw<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.map.contains_key(key)
    }

    /// Visit every live entry until `visit` returns false.
    ///
    /// Live entries are copied out before visiting, so `visit` may mutate
    /// this store. Writes racing with the copy may or may not be seen.
    pub fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        for (key, value) in self.snapshot() {
            if !visit(&key, &value) {
                break;
            }
        }
    }

    fn snapshot(&self) -> Vec<(K, V)> {
        let now = Instant::now();
        self.inner
            .map
            .iter()
            .filter(|r| !r.value().is_expired_at(now))
            .map(|r| (r.key().clone(), r.value().value.clone()))
            .collect()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.inner
            .map
            .iter()
            .filter(|r| !r.value().is_expired_at(now))
            .count()
    }

    /// Check if no live entries remain
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys and values of all live entries, position-aligned
    pub fn list(&self) -> (Vec<K>, Vec<V>) {
        self.snapshot().into_iter().unzip()
    }

    /// Keys of all live entries
    pub fn keys(&self) -> Vec<K> {
        self.list().0
    }

    /// Values of all live entries
    pub fn values(&self) -> Vec<V> {
        self.list().1
    }

    /// Keys of all live entries as a set that never expires
    pub fn key_set(&self) -> Set<K> {
        self.keys().into_iter().collect()
    }

    /// Remove one live entry, chosen by iteration order
    pub(crate) fn pop(&self) -> Option<(K, V)> {
        loop {
            let now = Instant::now();
            let key = self
                .inner
                .map
                .iter()
                .find(|r| !r.value().is_expired_at(now))
                .map(|r| r.key().clone())?;

            // Lost the race to a concurrent delete; pick another key.
            if let Some((key, entry)) = self.inner.map.remove(&key) {
                if !entry.is_expired() {
                    return Some((key, entry.value));
                }
            }
        }
    }

    /// Drop every stored entry
    pub fn clear(&self) {
        self.inner.map.clear();
    }

    /// Remove expired keys, returns count of removed keys
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.inner.map.retain(|_, entry| {
            if entry.is_expired_at(now) {
                removed += 1;
                false
            } else {
                true
            }
        });
        if removed > 0 {
            debug!(store = %self.name(), removed = removed, "Swept expired entries");
        }
        removed
    }
}

impl<K, V> Sweep for Store<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        Store::name(self)
    }

    fn sweep(&self) -> usize {
        Store::sweep(self)
    }
}
