use super::Collider;

use std::hash::{Hash, Hasher};
use thunderdome as td;

/// Key type to look up a collider stored in a [`ColliderSet`][self::ColliderSet].
///
/// Keys are generational, so a key to a removed collider never
/// resolves to a collider inserted later into the same slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColliderKey(pub(crate) td::Index);

impl ColliderKey {
    /// Get the underlying [`thunderdome::Index`][thunderdome::Index] of this key.
    #[inline]
    pub fn index(&self) -> td::Index {
        self.0
    }

    #[inline]
    pub(crate) fn slot(&self) -> usize {
        self.0.slot() as usize
    }
}

// ordering and hashing go through the raw bits so that pairs of keys
// can be put in a canonical order regardless of which one came first
impl Hash for ColliderKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for ColliderKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ColliderKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.to_bits().cmp(&other.0.to_bits())
    }
}

/// Storage for every collider in a scene.
///
/// Ownership links between colliders and entities are maintained by
/// [`Scene`][crate::Scene], which is the only thing that inserts and removes colliders.
#[derive(Default)]
pub struct ColliderSet {
    colliders: td::Arena<Collider>,
    // keeping track of the highest slot index
    // because slots are used for addressing in spatial indices
    slot_count: usize,
}

impl ColliderSet {
    #[inline]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Access a collider, if it still exists.
    #[inline]
    pub fn get(&self, key: ColliderKey) -> Option<&Collider> {
        self.colliders.get(key.0)
    }

    /// Mutably access a collider, if it still exists.
    #[inline]
    pub fn get_mut(&mut self, key: ColliderKey) -> Option<&mut Collider> {
        self.colliders.get_mut(key.0)
    }

    #[inline]
    pub fn contains(&self, key: ColliderKey) -> bool {
        self.colliders.contains(key.0)
    }

    pub fn iter(&self) -> impl '_ + Iterator<Item = (ColliderKey, &Collider)> {
        self.colliders.iter().map(|(idx, coll)| (ColliderKey(idx), coll))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// One more than the highest slot index that has been in use.
    /// Spatial indices size their per-collider storage with this.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub(crate) fn insert(&mut self, coll: Collider) -> ColliderKey {
        let key = self.colliders.insert(coll);
        let slot = key.slot() as usize;
        if slot >= self.slot_count {
            self.slot_count = slot + 1;
        }
        ColliderKey(key)
    }

    #[inline]
    pub(crate) fn remove(&mut self, key: ColliderKey) -> Option<Collider> {
        self.colliders.remove(key.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_keys_dont_resolve() {
        let mut set = ColliderSet::new();
        let first = set.insert(Collider::new_circle(1.0));
        assert!(set.remove(first).is_some());
        let second = set.insert(Collider::new_circle(2.0));
        // same slot, different generation
        assert_eq!(first.slot(), second.slot());
        assert_ne!(first, second);
        assert!(set.get(first).is_none());
        assert!(set.get(second).is_some());
        assert_eq!(set.slot_count(), 1);
    }
}
