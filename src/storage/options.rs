//! Store Options

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use super::{ExpiresAt, ReferenceTime};
use crate::registry::{Registry, WeakRegistry};

/// Effectively unbounded entry lifetime (ten years).
///
/// A store configured with this TTL is never registered for sweeping.
pub const FOREVER: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 10);

/// Reads an instant out of a stored value.
pub type ExpiryHook<V> = Arc<dyn Fn(&V) -> Option<Instant> + Send + Sync>;

/// Construction options for [`Store`](crate::Store) and [`Set`](crate::Set)
pub struct StoreOptions<V> {
    pub(crate) ttl: Duration,
    pub(crate) name: String,
    pub(crate) no_registry: bool,
    pub(crate) registry: Option<WeakRegistry>,
    pub(crate) deadline: Option<ExpiryHook<V>>,
    pub(crate) reference_time: Option<ExpiryHook<V>>,
}

impl<V> Default for StoreOptions<V> {
    fn default() -> Self {
        Self {
            ttl: FOREVER,
            name: Uuid::new_v4().to_string(),
            no_registry: false,
            registry: None,
            deadline: None,
            reference_time: None,
        }
    }
}

impl<V> Clone for StoreOptions<V> {
    fn clone(&self) -> Self {
        Self {
            ttl: self.ttl,
            name: self.name.clone(),
            no_registry: self.no_registry,
            registry: self.registry.clone(),
            deadline: self.deadline.clone(),
            reference_time: self.reference_time.clone(),
        }
    }
}

impl<V> fmt::Debug for StoreOptions<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("ttl", &self.ttl)
            .field("name", &self.name)
            .field("no_registry", &self.no_registry)
            .field("registry", &self.registry.is_some())
            .field("deadline", &self.deadline.is_some())
            .field("reference_time", &self.reference_time.is_some())
            .finish()
    }
}

impl<V> StoreOptions<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry lifetime when the value does not supply its own deadline
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Registry key. Registering a second store under the same name
    /// replaces the first one.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Register the store with `registry` on construction
    pub fn with_registry(mut self, registry: &Registry) -> Self {
        self.registry = Some(registry.downgrade());
        self
    }

    /// Keep the store out of any registry
    pub fn without_registry(mut self) -> Self {
        self.no_registry = true;
        self
    }

    /// Absolute deadline read from the value; takes precedence over the TTL
    pub fn with_deadline<F>(mut self, hook: F) -> Self
    where
        F: Fn(&V) -> Option<Instant> + Send + Sync + 'static,
    {
        self.deadline = Some(Arc::new(hook));
        self
    }

    /// Reference time read from the value; expiry is that time plus the TTL
    pub fn with_reference_time<F>(mut self, hook: F) -> Self
    where
        F: Fn(&V) -> Option<Instant> + Send + Sync + 'static,
    {
        self.reference_time = Some(Arc::new(hook));
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a store built from these options stays out of the registry.
    /// An unbounded TTL always opts out.
    pub fn is_opted_out(&self) -> bool {
        self.no_registry || self.ttl >= FOREVER
    }

    pub(crate) fn registry(&self) -> Option<Registry> {
        self.registry.as_ref().and_then(WeakRegistry::upgrade)
    }

    /// Same configuration under a freshly generated name.
    pub(crate) fn derive(&self) -> Self {
        Self {
            name: Uuid::new_v4().to_string(),
            ..self.clone()
        }
    }
}

impl<V: ExpiresAt> StoreOptions<V> {
    /// Use [`ExpiresAt`] as the deadline hook
    pub fn deadline_from_value(self) -> Self {
        self.with_deadline(|value: &V| value.expires_at())
    }
}

impl<V: ReferenceTime> StoreOptions<V> {
    /// Use [`ReferenceTime`] as the reference-time hook
    pub fn reference_from_value(self) -> Self {
        self.with_reference_time(|value: &V| value.reference_time())
    }
}
