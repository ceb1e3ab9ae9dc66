use crate::{collision::ColliderKey, Scene};

use parking_lot::Mutex;
use std::sync::Arc;

/// The kind of change in a trigger overlap between two frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// The pair started overlapping this frame.
    Enter,
    /// The pair was already overlapping last frame and still is.
    Pulse,
    /// The pair overlapped last frame but doesn't anymore.
    Exit,
}

/// Something that wants to know when colliders of its entity touch trigger colliders.
///
/// `this` is always a collider of the entity the listener is attached to
/// and `other` the collider on the opposite side of the pair.
/// The scene can be freely modified from the callbacks,
/// including despawning either entity.
///
/// Transitions are delivered after the whole frame has been scanned,
/// so `other` may already have been removed by an earlier callback in the same frame.
/// Look it up with [`Scene::collider`] before relying on it.
/// A pair broken up that way still ends with an Exit on the next frame.
///
/// All methods do nothing by default.
pub trait TriggerListener: Send {
    fn on_trigger_enter(&mut self, _scene: &mut Scene, _this: ColliderKey, _other: ColliderKey) {}

    /// Called every frame after the first that the pair keeps overlapping.
    fn on_collisioning(&mut self, _scene: &mut Scene, _this: ColliderKey, _other: ColliderKey) {}

    fn on_trigger_exit(&mut self, _scene: &mut Scene, _this: ColliderKey, _other: ColliderKey) {}
}

/// A listener as it's stored in the scene.
pub type SharedListener = Arc<Mutex<dyn TriggerListener>>;

/// Listener components of an entity, in attachment order.
pub(crate) struct TriggerListeners(pub Vec<SharedListener>);

/// The listener an entity exposes itself.
pub(crate) struct EntityListener(pub SharedListener);

/// Call the callback matching `kind` on a listener.
#[inline]
pub fn notify(
    listener: &mut dyn TriggerListener,
    kind: TriggerKind,
    scene: &mut Scene,
    this: ColliderKey,
    other: ColliderKey,
) {
    match kind {
        TriggerKind::Enter => listener.on_trigger_enter(scene, this, other),
        TriggerKind::Pulse => listener.on_collisioning(scene, this, other),
        TriggerKind::Exit => listener.on_trigger_exit(scene, this, other),
    }
}
