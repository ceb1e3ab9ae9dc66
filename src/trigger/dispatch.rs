use super::{listener::notify, ColliderPair, SharedListener, TriggerKind};
use crate::{collision::ColliderKey, Scene};

/// Delivers trigger transitions to the listeners on both sides of a pair.
#[derive(Default)]
pub struct Dispatcher {
    // reused between calls so that dispatching doesn't allocate in the steady state
    listeners: Vec<SharedListener>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notify both sides of a pair, `pair.first()`'s side first.
    ///
    /// Each side is only notified if its collider and owner entity still exist
    /// at the moment that side's turn comes, so listeners on the first side
    /// are free to destroy the second.
    pub fn dispatch(&mut self, scene: &mut Scene, pair: ColliderPair, kind: TriggerKind) {
        self.notify_side(scene, pair.first(), pair.second(), kind);
        self.notify_side(scene, pair.second(), pair.first(), kind);
    }

    fn notify_side(
        &mut self,
        scene: &mut Scene,
        this: ColliderKey,
        other: ColliderKey,
        kind: TriggerKind,
    ) {
        let Some(owner) = scene.owner_of(this) else {
            log::trace!("{:?} of {:?}: collider or its owner is gone, skipping", kind, this);
            return;
        };

        // listeners can add and remove listeners while we iterate,
        // so work on a copy of the handles
        self.listeners.clear();
        scene.listeners_of(owner, &mut self.listeners);
        for listener in self.listeners.drain(..) {
            let Some(mut listener) = listener.try_lock() else {
                log::warn!(
                    "Trigger listener on {:?} is already in use, skipping {:?} for {:?}",
                    owner,
                    kind,
                    this
                );
                continue;
            };
            notify(&mut *listener, kind, scene, this, other);
        }
    }
}
