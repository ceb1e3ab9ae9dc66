//! The broad phase contract used by trigger detection,
//! and the simplest possible implementation of it.

use super::{ColliderKey, ColliderSet, LayerMask, AABB};

use parking_lot::Mutex;
use std::sync::Arc;

/// Answers "which colliders may overlap this box" for the trigger helpers.
///
/// Results are allowed to contain colliders that don't actually overlap,
/// since every candidate is confirmed with an exact test afterwards.
/// Leaving out a collider that does overlap is a bug in the implementation.
pub trait SpatialQuery {
    /// Append every collider whose bounds may intersect `bounds`
    /// and whose layer is in `mask` to `out`.
    fn query_aabb(&mut self, bounds: AABB, mask: LayerMask, out: &mut Vec<ColliderKey>);
}

/// A spatial query structure that can be refreshed from the current state of a scene.
pub trait SpatialIndex: SpatialQuery {
    /// Re-insert every enabled collider at its current bounds.
    fn rebuild(&mut self, colliders: &ColliderSet);
}

impl<Q: SpatialQuery + ?Sized> SpatialQuery for &mut Q {
    #[inline]
    fn query_aabb(&mut self, bounds: AABB, mask: LayerMask, out: &mut Vec<ColliderKey>) {
        (**self).query_aabb(bounds, mask, out);
    }
}

/// A handle to an index shared between every trigger helper in a
/// [`TriggerSystem`][crate::TriggerSystem].
pub type SharedIndex<I> = Arc<Mutex<I>>;

impl<Q: SpatialQuery + ?Sized> SpatialQuery for Arc<Mutex<Q>> {
    #[inline]
    fn query_aabb(&mut self, bounds: AABB, mask: LayerMask, out: &mut Vec<ColliderKey>) {
        self.lock().query_aabb(bounds, mask, out);
    }
}

impl<I: SpatialIndex + ?Sized> SpatialIndex for Arc<Mutex<I>> {
    #[inline]
    fn rebuild(&mut self, colliders: &ColliderSet) {
        self.lock().rebuild(colliders);
    }
}

/// The simplest possible index, which checks every collider against every query.
/// Very inefficient, but can work for small scenes.
#[derive(Clone, Debug, Default)]
pub struct BruteForce {
    entries: Vec<(ColliderKey, AABB, usize)>,
}

impl BruteForce {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpatialQuery for BruteForce {
    fn query_aabb(&mut self, bounds: AABB, mask: LayerMask, out: &mut Vec<ColliderKey>) {
        out.extend(
            self.entries
                .iter()
                .filter(|(_, aabb, layer)| mask.get(*layer) && bounds.intersection(aabb).is_some())
                .map(|(key, _, _)| *key),
        );
    }
}

impl SpatialIndex for BruteForce {
    fn rebuild(&mut self, colliders: &ColliderSet) {
        self.entries.clear();
        self.entries.extend(
            colliders
                .iter()
                .filter(|(_, coll)| coll.enabled)
                .map(|(key, coll)| (key, coll.bounds(), coll.layer)),
        );
    }
}
