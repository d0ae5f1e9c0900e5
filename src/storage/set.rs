//! Set Algebra
//!
//! Presence-only [`Store`] with set operations. Members are the store's
//! live keys, so they expire like any other entry.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use tracing::warn;

use super::{Store, StoreOptions};

/// Expiring set of keys
///
/// `clone` returns another handle to the same members; use [`Set::copy`]
/// for an independent set.
pub struct Set<K> {
    inner: Store<K, ()>,
}

impl<K> Clone for Set<K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: Eq + Hash> fmt::Debug for Set<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Set").field(&self.inner).finish()
    }
}

impl<K> Default for Set<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Set<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    /// Create an empty set that never expires
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// Create an empty set configured by `options`
    pub fn with_options(options: StoreOptions<()>) -> Self {
        Self {
            inner: Store::new(options),
        }
    }

    /// Create a set holding `keys`
    pub fn from_keys<I>(keys: I, options: StoreOptions<()>) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let set = Self::with_options(options);
        set.add(keys);
        set
    }

    /// Empty set sharing this set's TTL and registration
    fn sibling(&self) -> Self {
        Self::with_options(self.inner.options().derive())
    }

    /// Registry key of the backing store
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Add one member
    pub fn insert(&self, key: K) {
        self.inner.set(key, ());
    }

    /// Add every key as a member
    pub fn add<I>(&self, keys: I)
    where
        I: IntoIterator<Item = K>,
    {
        for key in keys {
            self.insert(key);
        }
    }

    /// Remove one member, returns true if it was stored
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.delete(key)
    }

    /// Remove every key given
    pub fn remove(&self, keys: &[K]) {
        for key in keys {
            self.inner.delete(key);
        }
    }

    /// Check if `key` is a live member
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains(key)
    }

    /// True when every key is a member. False for no keys.
    pub fn has(&self, keys: &[K]) -> bool {
        !keys.is_empty() && keys.iter().all(|key| self.contains(key))
    }

    /// True when at least one key is a member. False for no keys.
    pub fn has_any(&self, keys: &[K]) -> bool {
        keys.iter().any(|key| self.contains(key))
    }

    /// Remove and return an arbitrary member
    pub fn pop(&self) -> Option<K> {
        self.inner.pop().map(|(key, _)| key)
    }

    /// Number of live members
    pub fn size(&self) -> usize {
        self.inner.len()
    }

    /// Check if no live members remain
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Drop every member
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Snapshot of the live members
    pub fn list(&self) -> Vec<K> {
        self.inner.keys()
    }

    /// Visit members until `visit` returns false
    pub fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&K) -> bool,
    {
        self.inner.range(|key, _| visit(key));
    }

    pub fn union(&self, other: &Set<K>) -> Set<K> {
        let set = self.copy();
        set.merge(other);
        set
    }

    pub fn intersection(&self, other: &Set<K>) -> Set<K> {
        let set = self.sibling();
        self.range(|key| {
            if other.contains(key) {
                set.insert(key.clone());
            }
            true
        });
        set
    }

    /// Members of `self` absent from `other`
    pub fn difference(&self, other: &Set<K>) -> Set<K> {
        let set = self.copy();
        set.separate(other);
        set
    }

    /// Alias of [`Set::difference`]
    pub fn sub(&self, other: &Set<K>) -> Set<K> {
        self.difference(other)
    }

    /// Add every member of `other` to `self`
    pub fn merge(&self, other: &Set<K>) {
        other.range(|key| {
            self.insert(key.clone());
            true
        });
    }

    /// Remove every member of `other` from `self`
    pub fn separate(&self, other: &Set<K>) {
        self.remove(&other.list());
    }

    /// Independent set with the same members and configuration
    pub fn copy(&self) -> Set<K> {
        let set = self.sibling();
        set.add(self.list());
        set
    }

    pub fn is_equal(&self, other: &Set<K>) -> bool {
        self.size() == other.size() && self.difference(other).is_empty()
    }

    /// True when `other` is contained in `self`
    pub fn is_subset(&self, other: &Set<K>) -> bool {
        let mut subset = true;
        other.range(|key| {
            subset = self.contains(key);
            subset
        });
        subset
    }

    /// True when `self` is contained in `other`
    pub fn is_superset(&self, other: &Set<K>) -> bool {
        other.is_subset(self)
    }

    /// Every subset of a snapshot of the members, one per bitmask
    /// `0..2^n` over the snapshot order. Index 0 is the empty set.
    ///
    /// Returns nothing when the member count is at least `usize::BITS`,
    /// since the subsets cannot be counted in a `usize`.
    pub fn power_set(&self) -> Vec<Set<K>> {
        let members = self.list();
        let Some(count) = u32::try_from(members.len())
            .ok()
            .and_then(|bits| 1usize.checked_shl(bits))
        else {
            warn!(set = %self.name(), members = members.len(), "Power set too large");
            return Vec::new();
        };

        (0..count)
            .map(|mask| {
                let subset = self.sibling();
                for (bit, member) in members.iter().enumerate() {
                    if mask & (1 << bit) != 0 {
                        subset.insert(member.clone());
                    }
                }
                subset
            })
            .collect()
    }
}

impl<K> FromIterator<K> for Set<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Set::from_keys(iter, StoreOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    fn set_of(keys: &[u32]) -> Set<u32> {
        keys.iter().copied().collect()
    }

    fn sorted(set: &Set<u32>) -> Vec<u32> {
        let mut keys = set.list();
        keys.sort();
        keys
    }

    #[test]
    fn test_add_remove() {
        let set = Set::new();
        set.add([1, 2, 3]);
        assert_eq!(set.size(), 3);

        set.remove(&[1, 2]);
        assert_eq!(sorted(&set), vec![3]);
        assert!(set.delete(&3));
        assert!(set.is_empty());
    }

    #[test]
    fn test_has() {
        let set = set_of(&[1, 2, 3]);
        assert!(set.has(&[1, 2]));
        assert!(!set.has(&[1, 4]));
        assert!(!set.has(&[]));

        assert!(set.has_any(&[4, 3]));
        assert!(!set.has_any(&[4, 5]));
        assert!(!set.has_any(&[]));
    }

    #[test]
    fn test_pop() {
        let set = set_of(&[1, 2]);
        let first = set.pop().unwrap();
        let second = set.pop().unwrap();
        assert_ne!(first, second);
        assert_eq!(set.pop(), None);
        assert!(set.is_empty());
    }

    #[test]
    fn test_union() {
        let a = set_of(&[1, 2]);
        let b = set_of(&[2, 3]);
        let u = a.union(&b);
        assert_eq!(sorted(&u), vec![1, 2, 3]);
        assert!(u.has(&a.list()) && u.has(&b.list()));
        assert_eq!(sorted(&a), vec![1, 2]);
    }

    #[test]
    fn test_intersection_and_difference() {
        let a = set_of(&[1, 2, 3, 4]);
        let b = set_of(&[3, 4, 5]);

        assert_eq!(sorted(&a.intersection(&b)), vec![3, 4]);
        assert_eq!(sorted(&a.difference(&b)), vec![1, 2]);
        assert_eq!(sorted(&a.sub(&b)), vec![1, 2]);
        assert_eq!(sorted(&b.difference(&a)), vec![5]);

        // Receivers untouched
        assert_eq!(a.size(), 4);
        assert_eq!(b.size(), 3);
    }

    #[test]
    fn test_merge_and_separate() {
        let a = set_of(&[1, 2]);
        a.merge(&set_of(&[2, 3]));
        assert_eq!(sorted(&a), vec![1, 2, 3]);

        a.separate(&set_of(&[1, 3, 9]));
        assert_eq!(sorted(&a), vec![2]);
    }

    #[test]
    fn test_subset_laws() {
        let a = set_of(&[1, 2, 3]);
        let b = set_of(&[2, 3, 4]);
        let both = a.intersection(&b);

        assert!(a.is_subset(&both));
        assert!(both.is_superset(&a));
        assert!(!a.is_subset(&b));
        assert!(a.is_subset(&Set::new()));
    }

    #[test]
    fn test_copy_is_independent() {
        let a = set_of(&[1, 2]);
        let copy = a.copy();
        assert!(copy.is_equal(&a));
        assert_ne!(copy.name(), a.name());

        copy.insert(3);
        copy.delete(&1);
        assert_eq!(sorted(&a), vec![1, 2]);
        assert!(!copy.is_equal(&a));
    }

    #[test]
    fn test_clone_shares_members() {
        let a = set_of(&[1]);
        let handle = a.clone();
        handle.insert(2);
        assert_eq!(sorted(&a), vec![1, 2]);
    }

    #[test]
    fn test_power_set() {
        let set = set_of(&[1, 2, 3, 4]);
        let subsets = set.power_set();
        assert_eq!(subsets.len(), 16);
        assert!(subsets[0].is_empty());

        let mut by_size = [0usize; 5];
        for subset in &subsets {
            by_size[subset.size()] += 1;
            assert!(set.is_subset(subset));
        }
        assert_eq!(by_size, [1, 4, 6, 4, 1]);
    }

    #[test]
    fn test_power_set_too_large() {
        let set: Set<u32> = (0..usize::BITS).collect();
        assert!(set.power_set().is_empty());
        assert_eq!(set.size(), usize::BITS as usize);
    }

    #[test]
    fn test_power_set_of_empty() {
        let subsets = Set::<u32>::new().power_set();
        assert_eq!(subsets.len(), 1);
        assert!(subsets[0].is_empty());
    }

    #[test]
    fn test_members_expire() {
        let set = Set::with_options(
            StoreOptions::new()
                .with_ttl(Duration::from_millis(20))
                .without_registry(),
        );
        set.insert("a");
        assert!(set.contains("a"));

        thread::sleep(Duration::from_millis(40));
        assert!(!set.contains("a"));
        assert_eq!(set.pop(), None);

        // Copies inherit the TTL
        set.insert("b");
        let copy = set.copy();
        thread::sleep(Duration::from_millis(40));
        assert!(copy.is_empty());
    }
}
