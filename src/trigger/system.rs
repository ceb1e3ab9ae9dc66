use super::TriggerHelper;
use crate::{
    collision::{SharedIndex, SpatialIndex},
    Scene,
};

use parking_lot::Mutex;
use std::sync::Arc;

/// Runs trigger detection for every entity it's enabled for,
/// all sharing one spatial index.
///
/// Call [`update`][Self::update] once per frame after entities have been moved.
pub struct TriggerSystem<I: SpatialIndex> {
    index: SharedIndex<I>,
    // in the order entities were enabled
    helpers: Vec<TriggerHelper<SharedIndex<I>>>,
}

impl<I: SpatialIndex> TriggerSystem<I> {
    pub fn new(index: I) -> Self {
        Self::with_shared_index(Arc::new(Mutex::new(index)))
    }

    /// Create a system using an index that's also used elsewhere.
    pub fn with_shared_index(index: SharedIndex<I>) -> Self {
        Self {
            index,
            helpers: Vec::new(),
        }
    }

    #[inline]
    pub fn index(&self) -> &SharedIndex<I> {
        &self.index
    }

    /// Start tracking triggers for an entity.
    /// Returns false if the entity was already being tracked.
    pub fn enable(&mut self, entity: hecs::Entity) -> bool {
        if self.is_enabled(entity) {
            return false;
        }
        log::debug!("Trigger tracking enabled for {:?}", entity);
        self.helpers
            .push(TriggerHelper::new(entity, self.index.clone()));
        true
    }

    /// Stop tracking triggers for an entity.
    /// Overlaps it was part of end silently, without Exit notifications.
    /// Returns false if the entity wasn't being tracked.
    pub fn disable(&mut self, entity: hecs::Entity) -> bool {
        let Some(idx) = self.helpers.iter().position(|h| h.entity() == entity) else {
            return false;
        };
        log::debug!("Trigger tracking disabled for {:?}", entity);
        self.helpers.remove(idx);
        true
    }

    #[inline]
    pub fn is_enabled(&self, entity: hecs::Entity) -> bool {
        self.helpers.iter().any(|h| h.entity() == entity)
    }

    #[inline]
    pub fn tracked_count(&self) -> usize {
        self.helpers.len()
    }

    pub fn helper(&self, entity: hecs::Entity) -> Option<&TriggerHelper<SharedIndex<I>>> {
        self.helpers.iter().find(|h| h.entity() == entity)
    }

    /// Bring colliders up to date with their owners, rebuild the index
    /// and advance every helper.
    ///
    /// Helpers whose entity has been despawned report Exit for everything
    /// they were tracking one last time and are then dropped.
    pub fn update(&mut self, scene: &mut Scene) {
        let _span = tracy_span!("update triggers", "update");

        scene.sync_collider_poses();
        self.index.lock().rebuild(scene.colliders());

        for helper in &mut self.helpers {
            helper.advance(scene);
        }
        self.helpers.retain(|h| {
            let alive = scene.contains(h.entity());
            if !alive {
                log::debug!("Dropping trigger tracking for despawned {:?}", h.entity());
            }
            alive
        });
    }
}
