//! Entities, their poses, and the colliders and listeners attached to them.

use crate::{
    collision::{Collider, ColliderKey, ColliderSet},
    math as m,
    trigger::{EntityListener, SharedListener, TriggerListener, TriggerListeners},
};

use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

/// Error when operating on an entity through a [`Scene`][self::Scene].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    #[error("Entity does not exist")]
    NoSuchEntity(hecs::Entity),
    #[error("Entity has no pose")]
    NoPose(hecs::Entity),
}

/// A [`hecs::World`] of posed entities together with every collider attached to them.
///
/// Entities are spawned with a [`Pose`][crate::math::Pose] component.
/// Colliders are attached to entities and follow their owner's pose
/// when [`sync_collider_poses`][Self::sync_collider_poses] is called.
/// Trigger listeners live in the world as components,
/// so they can be found from any entity that owns a collider.
///
/// Other components can be freely added to the world.
/// Entities despawned directly through `world` instead of [`despawn`][Self::despawn]
/// have their colliders cleaned up on the next pose sync.
#[derive(Default)]
pub struct Scene {
    pub world: hecs::World,
    colliders: ColliderSet,
    // colliders in attachment order per owner
    attachments: HashMap<hecs::Entity, Vec<ColliderKey>>,
}

impl Scene {
    #[inline]
    pub fn new() -> Self {
        Self {
            world: hecs::World::new(),
            colliders: ColliderSet::new(),
            attachments: HashMap::new(),
        }
    }

    /// Spawn an entity with nothing but a pose.
    #[inline]
    pub fn spawn(&mut self, pose: m::Pose) -> hecs::Entity {
        self.world.spawn((pose,))
    }

    /// Despawn an entity and remove every collider attached to it.
    pub fn despawn(&mut self, entity: hecs::Entity) -> Result<(), SceneError> {
        self.world
            .despawn(entity)
            .map_err(|_| SceneError::NoSuchEntity(entity))?;
        if let Some(keys) = self.attachments.remove(&entity) {
            for key in keys {
                self.colliders.remove(key);
            }
        }
        log::trace!("despawned {:?}", entity);
        Ok(())
    }

    /// Check whether an entity is still alive.
    #[inline]
    pub fn contains(&self, entity: hecs::Entity) -> bool {
        self.world.contains(entity)
    }

    #[inline]
    pub fn pose(&self, entity: hecs::Entity) -> Option<m::Pose> {
        self.world.get::<&m::Pose>(entity).ok().map(|pose| *pose)
    }

    /// Set the pose of an entity, giving it one if it didn't have one.
    /// Colliders don't follow until the next [`sync_collider_poses`][Self::sync_collider_poses].
    #[inline]
    pub fn set_pose(&mut self, entity: hecs::Entity, pose: m::Pose) -> Result<(), SceneError> {
        self.world
            .insert_one(entity, pose)
            .map_err(|_| SceneError::NoSuchEntity(entity))
    }

    /// Move an entity by the given offset.
    pub fn translate(&mut self, entity: hecs::Entity, offset: m::Vec2) -> Result<(), SceneError> {
        match self.world.query_one_mut::<&mut m::Pose>(entity) {
            Ok(pose) => {
                pose.translation += offset;
                Ok(())
            }
            Err(hecs::QueryOneError::NoSuchEntity) => Err(SceneError::NoSuchEntity(entity)),
            Err(hecs::QueryOneError::Unsatisfied) => Err(SceneError::NoPose(entity)),
        }
    }

    //
    // colliders
    //

    /// Attach a collider to an entity.
    /// The collider's world pose is set from the entity's current pose right away.
    pub fn attach_collider(
        &mut self,
        entity: hecs::Entity,
        mut coll: Collider,
    ) -> Result<ColliderKey, SceneError> {
        if !self.world.contains(entity) {
            return Err(SceneError::NoSuchEntity(entity));
        }
        let owner_pose = self.pose(entity).unwrap_or_else(m::Pose::identity);
        coll.owner = Some(entity);
        coll.pose = owner_pose * coll.offset;
        let key = self.colliders.insert(coll);
        self.attachments.entry(entity).or_default().push(key);
        Ok(key)
    }

    /// Remove a collider, detaching it from its owner.
    /// Returns `None` if the collider was already gone.
    pub fn remove_collider(&mut self, key: ColliderKey) -> Option<Collider> {
        let mut coll = self.colliders.remove(key)?;
        if let Some(owner) = coll.owner.take() {
            if let Some(keys) = self.attachments.get_mut(&owner) {
                keys.retain(|k| *k != key);
                if keys.is_empty() {
                    self.attachments.remove(&owner);
                }
            }
        }
        Some(coll)
    }

    #[inline]
    pub fn collider(&self, key: ColliderKey) -> Option<&Collider> {
        self.colliders.get(key)
    }

    /// Mutably access a collider, e.g. to toggle `enabled` or `is_trigger`.
    #[inline]
    pub fn collider_mut(&mut self, key: ColliderKey) -> Option<&mut Collider> {
        self.colliders.get_mut(key)
    }

    #[inline]
    pub fn colliders(&self) -> &ColliderSet {
        &self.colliders
    }

    /// Colliders attached to an entity, in attachment order.
    /// Empty for entities that don't exist.
    pub fn colliders_of(&self, entity: hecs::Entity) -> &[ColliderKey] {
        self.attachments
            .get(&entity)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The entity a collider is attached to, if both still exist.
    pub fn owner_of(&self, key: ColliderKey) -> Option<hecs::Entity> {
        let owner = self.colliders.get(key)?.owner?;
        self.world.contains(owner).then_some(owner)
    }

    /// Move every collider to its owner's pose combined with its offset.
    ///
    /// Call after entities have been moved for the frame and before trigger detection.
    /// Colliders whose owner has been despawned directly from the world are removed here.
    pub fn sync_collider_poses(&mut self) {
        let _span = tracy_span!("sync collider poses", "sync_collider_poses");
        let world = &self.world;
        let colliders = &mut self.colliders;
        self.attachments.retain(|&entity, keys| {
            if !world.contains(entity) {
                for key in keys.drain(..) {
                    colliders.remove(key);
                }
                return false;
            }
            let Ok(owner_pose) = world.get::<&m::Pose>(entity) else { return true };
            for key in keys.iter() {
                let Some(coll) = colliders.get_mut(*key) else { continue };
                coll.pose = *owner_pose * coll.offset;
            }
            true
        });
    }

    //
    // listeners
    //

    /// Attach a listener component to an entity.
    /// Listeners on the same entity are notified in attachment order.
    ///
    /// The returned handle can be used to inspect the listener or remove it later.
    pub fn add_listener(
        &mut self,
        entity: hecs::Entity,
        listener: impl TriggerListener + 'static,
    ) -> Result<SharedListener, SceneError> {
        if !self.world.contains(entity) {
            return Err(SceneError::NoSuchEntity(entity));
        }
        let shared: SharedListener = Arc::new(Mutex::new(listener));
        if let Ok(listeners) = self.world.query_one_mut::<&mut TriggerListeners>(entity) {
            listeners.0.push(shared.clone());
        } else {
            self.world
                .insert_one(entity, TriggerListeners(vec![shared.clone()]))
                .map_err(|_| SceneError::NoSuchEntity(entity))?;
        }
        Ok(shared)
    }

    /// Give the entity itself the listener capability.
    /// Replaces any previous entity listener. It's notified after all listener components.
    pub fn set_entity_listener(
        &mut self,
        entity: hecs::Entity,
        listener: impl TriggerListener + 'static,
    ) -> Result<SharedListener, SceneError> {
        let shared: SharedListener = Arc::new(Mutex::new(listener));
        self.world
            .insert_one(entity, EntityListener(shared.clone()))
            .map_err(|_| SceneError::NoSuchEntity(entity))?;
        Ok(shared)
    }

    /// Detach a listener previously returned by [`add_listener`][Self::add_listener]
    /// or [`set_entity_listener`][Self::set_entity_listener].
    /// Returns whether it was found on the entity.
    pub fn remove_listener(&mut self, entity: hecs::Entity, listener: &SharedListener) -> bool {
        let same = |other: &SharedListener| {
            Arc::as_ptr(other) as *const () == Arc::as_ptr(listener) as *const ()
        };

        if let Ok(listeners) = self.world.query_one_mut::<&mut TriggerListeners>(entity) {
            if let Some(idx) = listeners.0.iter().position(same) {
                listeners.0.remove(idx);
                return true;
            }
        }
        let is_entity_listener = self
            .world
            .get::<&EntityListener>(entity)
            .map_or(false, |l| same(&l.0));
        is_entity_listener && self.world.remove_one::<EntityListener>(entity).is_ok()
    }

    /// Copy handles to every listener on an entity into `out`:
    /// listener components in attachment order, then the entity listener.
    pub fn listeners_of(&self, entity: hecs::Entity, out: &mut Vec<SharedListener>) {
        if let Ok(listeners) = self.world.get::<&TriggerListeners>(entity) {
            out.extend(listeners.0.iter().cloned());
        }
        if let Ok(listener) = self.world.get::<&EntityListener>(entity) {
            out.push(listener.0.clone());
        }
    }
}
