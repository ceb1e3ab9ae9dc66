use super::{ColliderPair, TriggerKind};

use std::collections::HashSet;

/// Frame-to-frame overlap state of one entity's colliders.
///
/// Transitions are worked out with set operations on the pairs seen last frame
/// and the pairs seen this frame, so the order pairs are recorded in doesn't matter
/// and a pair recorded many times in one frame still produces one transition.
#[derive(Debug, Default)]
pub struct TriggerTracker {
    active: HashSet<ColliderPair>,
    previous: HashSet<ColliderPair>,
    transitions: Vec<(ColliderPair, TriggerKind)>,
}

impl TriggerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start recording a frame.
    pub fn begin(&mut self) {
        debug_assert!(
            self.active.is_empty(),
            "begin called twice without finish in between"
        );
        self.transitions.clear();
    }

    /// Record a confirmed overlap for this frame.
    /// Returns true if this is a new overlap, in which case an Enter transition is stored.
    pub fn record(&mut self, pair: ColliderPair) -> bool {
        let is_enter = !self.active.contains(&pair) && !self.previous.contains(&pair);
        if is_enter {
            self.transitions.push((pair, TriggerKind::Enter));
        }
        self.active.insert(pair);
        is_enter
    }

    /// Finish the frame, returning every transition that happened in it:
    /// Enters in the order they were recorded, then Pulses, then Exits.
    pub fn finish(&mut self) -> &[(ColliderPair, TriggerKind)] {
        self.transitions.extend(
            self.previous
                .intersection(&self.active)
                .map(|pair| (*pair, TriggerKind::Pulse)),
        );
        self.transitions.extend(
            self.previous
                .difference(&self.active)
                .map(|pair| (*pair, TriggerKind::Exit)),
        );
        // swap instead of copying so both sets keep their allocations
        std::mem::swap(&mut self.previous, &mut self.active);
        self.active.clear();
        &self.transitions
    }

    /// Transitions from the last finished frame.
    #[inline]
    pub fn transitions(&self) -> &[(ColliderPair, TriggerKind)] {
        &self.transitions
    }

    /// Whether the pair was overlapping as of the last finished frame.
    #[inline]
    pub fn is_tracking(&self, pair: &ColliderPair) -> bool {
        self.previous.contains(pair)
    }

    pub fn tracked_pairs(&self) -> impl '_ + Iterator<Item = ColliderPair> {
        self.previous.iter().copied()
    }

    /// Forget every tracked pair without producing Exits.
    pub fn clear(&mut self) {
        self.active.clear();
        self.previous.clear();
        self.transitions.clear();
    }
}
