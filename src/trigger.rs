//! Frame-to-frame trigger overlap detection.
//!
//! Every frame, a [`TriggerHelper`] scans the colliders of its entity for overlaps
//! where at least one side is a trigger, and compares the result with the previous frame
//! to tell which pairs started ([`TriggerKind::Enter`]), kept ([`TriggerKind::Pulse`])
//! or stopped ([`TriggerKind::Exit`]) overlapping.
//! Each transition is delivered once to the [`TriggerListener`]s on both sides of the pair.
//!
//! [`TriggerSystem`] manages helpers for many entities around one shared spatial index.

mod pair;
pub use pair::UnorderedPair;

mod listener;
pub use listener::{notify, SharedListener, TriggerKind, TriggerListener};
pub(crate) use listener::{EntityListener, TriggerListeners};

mod tracker;
pub use tracker::TriggerTracker;

mod dispatch;
pub use dispatch::Dispatcher;

mod helper;
pub use helper::TriggerHelper;

mod system;
pub use system::TriggerSystem;

use crate::collision::ColliderKey;

/// Two distinct colliders that overlap.
pub type ColliderPair = UnorderedPair<ColliderKey>;

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::Scene;

    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Listener id, kind, this, other.
    pub type Event = (u32, TriggerKind, ColliderKey, ColliderKey);

    /// Event log shared between recorders.
    #[derive(Clone, Default)]
    pub struct Events(Arc<Mutex<Vec<Event>>>);

    impl Events {
        pub fn take(&self) -> Vec<Event> {
            std::mem::take(&mut *self.0.lock())
        }
    }

    pub struct Recorder {
        id: u32,
        events: Events,
    }

    impl Recorder {
        pub fn new(id: u32, events: &Events) -> Self {
            Self {
                id,
                events: events.clone(),
            }
        }

        fn push(&self, kind: TriggerKind, this: ColliderKey, other: ColliderKey) {
            self.events.0.lock().push((self.id, kind, this, other));
        }
    }

    impl TriggerListener for Recorder {
        fn on_trigger_enter(&mut self, _: &mut Scene, this: ColliderKey, other: ColliderKey) {
            self.push(TriggerKind::Enter, this, other);
        }

        fn on_collisioning(&mut self, _: &mut Scene, this: ColliderKey, other: ColliderKey) {
            self.push(TriggerKind::Pulse, this, other);
        }

        fn on_trigger_exit(&mut self, _: &mut Scene, this: ColliderKey, other: ColliderKey) {
            self.push(TriggerKind::Exit, this, other);
        }
    }
}
