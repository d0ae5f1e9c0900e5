//! Store Registry
//!
//! Named table of stores that get swept together.

use hashbrown::HashMap;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, warn};

use super::{RegistryConfig, Sweeper};
use crate::error::Result;

/// A store that can drop its expired entries
pub trait Sweep: Send + Sync {
    /// Registry key
    fn name(&self) -> &str;

    /// Remove expired entries, returns count of removed entries
    fn sweep(&self) -> usize;
}

struct Inner {
    stores: Mutex<HashMap<String, Arc<dyn Sweep>>>,
    config: RegistryConfig,
}

/// Shared table of registered stores
///
/// Cloning yields another handle to the same table. Stores stay
/// registered for the life of the registry.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<Inner>,
}

/// Non-owning registry handle kept by store options.
#[derive(Clone)]
pub(crate) struct WeakRegistry(Weak<Inner>);

impl WeakRegistry {
    pub(crate) fn upgrade(&self) -> Option<Registry> {
        self.0.upgrade().map(|inner| Registry { inner })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_config(RegistryConfig::default())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("stores", &self.len())
            .field("interval", &self.interval())
            .finish()
    }
}

impl Registry {
    /// Create a registry after validating `config`
    pub fn new(config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: RegistryConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                stores: Mutex::new(HashMap::new()),
                config,
            }),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakRegistry {
        WeakRegistry(Arc::downgrade(&self.inner))
    }

    /// Add `store` under its name, replacing any store already there
    pub fn register(&self, store: Arc<dyn Sweep>) {
        let name = store.name().to_string();
        let mut stores = self.inner.stores.lock();
        if stores.insert(name.clone(), store).is_some() {
            warn!(store = %name, "Registry name collision, previous store will no longer be swept");
        } else {
            debug!(store = %name, "Registered store");
        }
    }

    /// Sweep every registered store in turn, returns total removed
    pub fn sweep_all(&self) -> usize {
        let stores = self.inner.stores.lock();
        let removed: usize = stores.values().map(|store| store.sweep()).sum();
        if removed > 0 {
            debug!(stores = stores.len(), removed = removed, "Sweep pass finished");
        }
        removed
    }

    /// Pause between sweep passes
    pub fn interval(&self) -> Duration {
        self.inner.config.sweep_interval
    }

    pub fn len(&self) -> usize {
        self.inner.stores.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn names(&self) -> Vec<String> {
        self.inner.stores.lock().keys().cloned().collect()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.stores.lock().contains_key(name)
    }

    /// Start the background sweep task on the current tokio runtime
    pub fn spawn_sweeper(&self) -> Sweeper {
        Sweeper::spawn(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Store, StoreOptions};
    use std::thread;

    fn short_lived(registry: &Registry, name: &str) -> StoreOptions<u32> {
        StoreOptions::new()
            .with_ttl(Duration::from_millis(20))
            .with_name(name)
            .with_registry(registry)
    }

    #[test]
    fn test_register_on_construction() {
        let registry = Registry::default();
        let store: Store<u32, u32> = Store::new(short_lived(&registry, "sessions"));

        assert!(registry.is_registered("sessions"));
        assert_eq!(registry.len(), 1);
        assert_eq!(store.name(), "sessions");
    }

    #[test]
    fn test_opted_out_stores_skipped() {
        let registry = Registry::default();
        let _private: Store<u32, u32> =
            Store::new(short_lived(&registry, "private").without_registry());
        let _forever: Store<u32, u32> = Store::new(
            StoreOptions::new()
                .with_name("forever")
                .with_registry(&registry),
        );

        assert!(registry.is_empty());
    }

    #[test]
    fn test_sweep_all() {
        let registry = Registry::default();
        let a: Store<u32, u32> = Store::new(short_lived(&registry, "a"));
        let b: Store<u32, u32> = Store::new(short_lived(&registry, "b"));
        for i in 0..5 {
            a.set(i, i);
            b.set(i, i);
        }
        thread::sleep(Duration::from_millis(40));

        assert!(a.contains_raw(&0));
        assert_eq!(registry.sweep_all(), 10);
        assert!(!a.contains_raw(&0));
        assert!(!b.contains_raw(&0));
    }

    #[test]
    fn test_name_collision_replaces() {
        let registry = Registry::default();
        let first: Store<u32, u32> = Store::new(short_lived(&registry, "dup"));
        let second: Store<u32, u32> = Store::new(short_lived(&registry, "dup"));
        first.set(1, 1);
        second.set(1, 1);
        thread::sleep(Duration::from_millis(40));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.sweep_all(), 1);
        assert!(first.contains_raw(&1));
        assert!(!second.contains_raw(&1));
    }

    #[test]
    fn test_invalid_config() {
        let config = RegistryConfig::default().with_interval(Duration::ZERO);
        assert!(Registry::new(config).is_err());
    }

    #[test]
    fn test_dropped_registry_skips_registration() {
        let registry = Registry::default();
        let options = short_lived(&registry, "orphan");
        drop(registry);

        let store: Store<u32, u32> = Store::new(options);
        store.set(1, 1);
        assert_eq!(store.get(&1), Some(1));
    }
}
