use super::{Dispatcher, TriggerTracker, UnorderedPair};
use crate::{
    collision::{ColliderKey, SpatialQuery},
    Scene,
};

/// Trigger detection for the colliders of a single entity.
///
/// Every frame, after movement has been resolved and the spatial index is up to date,
/// [`advance`][Self::advance] finds every trigger overlap involving
/// the entity's enabled colliders and notifies listeners on both sides
/// of each pair that started, continued or stopped overlapping.
///
/// The helper queries neighbors through whatever [`SpatialQuery`] it was created with.
/// To share one index between many helpers, give each a clone of a
/// [`SharedIndex`][crate::collision::SharedIndex], or use a
/// [`TriggerSystem`][crate::TriggerSystem] which does this for you.
pub struct TriggerHelper<Q: SpatialQuery> {
    entity: hecs::Entity,
    query: Q,
    tracker: TriggerTracker,
    dispatcher: Dispatcher,
    own_colliders: Vec<ColliderKey>,
    candidates: Vec<ColliderKey>,
}

impl<Q: SpatialQuery> TriggerHelper<Q> {
    pub fn new(entity: hecs::Entity, query: Q) -> Self {
        Self {
            entity,
            query,
            tracker: TriggerTracker::new(),
            dispatcher: Dispatcher::new(),
            own_colliders: Vec::new(),
            candidates: Vec::new(),
        }
    }

    #[inline]
    pub fn entity(&self) -> hecs::Entity {
        self.entity
    }

    #[inline]
    pub fn query(&self) -> &Q {
        &self.query
    }

    #[inline]
    pub fn query_mut(&mut self) -> &mut Q {
        &mut self.query
    }

    /// Pairs that were overlapping as of the last call to `advance`.
    #[inline]
    pub fn tracker(&self) -> &TriggerTracker {
        &self.tracker
    }

    /// Detect this frame's trigger overlaps and notify listeners of every transition.
    ///
    /// If the entity no longer exists it's treated as having no colliders,
    /// which ends every overlap it was part of.
    pub fn advance(&mut self, scene: &mut Scene) {
        let _span = tracy_span!("advance trigger helper", "advance");

        self.tracker.begin();
        self.own_colliders.clear();
        if scene.contains(self.entity) {
            self.own_colliders
                .extend_from_slice(scene.colliders_of(self.entity));
        }

        for &coll_key in &self.own_colliders {
            let Some(coll) = scene.collider(coll_key) else { continue };
            if !coll.enabled {
                continue;
            }

            self.candidates.clear();
            self.query
                .query_aabb(coll.bounds(), coll.collides_with, &mut self.candidates);

            for &cand_key in &self.candidates {
                let Some(pair) = UnorderedPair::new(coll_key, cand_key) else { continue };
                // the index may be older than the scene
                let Some(cand) = scene.collider(cand_key) else { continue };
                if !cand.enabled || !(coll.is_trigger || cand.is_trigger) {
                    continue;
                }
                if coll.overlaps(cand) {
                    self.tracker.record(pair);
                }
            }
        }

        let transitions = self.tracker.finish();
        for &(pair, kind) in transitions {
            log::trace!("{:?} {:?} <-> {:?}", kind, pair.first(), pair.second());
            self.dispatcher.dispatch(scene, pair, kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collision::{BruteForce, SpatialIndex},
        math::{self as m, pose_at},
        trigger::{testing::*, TriggerKind::*, TriggerListener},
        Collider, LayerMask,
    };
    use parking_lot::Mutex;
    use rand::{seq::SliceRandom, SeedableRng};
    use std::sync::Arc;

    fn step<Q: SpatialIndex>(scene: &mut Scene, helper: &mut TriggerHelper<Q>) {
        scene.sync_collider_poses();
        helper.query_mut().rebuild(scene.colliders());
        helper.advance(scene);
    }

    /// An entity with a trigger circle and another with a solid one, far apart,
    /// both recording into `events` with ids 1 and 2.
    struct TwoBodies {
        scene: Scene,
        events: Events,
        e1: hecs::Entity,
        e2: hecs::Entity,
        trigger: ColliderKey,
        solid: ColliderKey,
        helper: TriggerHelper<BruteForce>,
    }

    impl TwoBodies {
        fn new() -> Self {
            let mut scene = Scene::new();
            let events = Events::default();
            let e1 = scene.spawn(pose_at(0.0, 0.0));
            let e2 = scene.spawn(pose_at(10.0, 0.0));
            let trigger = scene
                .attach_collider(e1, Collider::new_circle(1.0).as_trigger())
                .unwrap();
            let solid = scene.attach_collider(e2, Collider::new_circle(1.0)).unwrap();
            scene.add_listener(e1, Recorder::new(1, &events)).unwrap();
            scene.add_listener(e2, Recorder::new(2, &events)).unwrap();
            Self {
                scene,
                events,
                e1,
                e2,
                trigger,
                solid,
                helper: TriggerHelper::new(e1, BruteForce::new()),
            }
        }

        fn move_e2_to(&mut self, x: f64) {
            self.scene.set_pose(self.e2, pose_at(x, 0.0)).unwrap();
        }

        fn step(&mut self) -> Vec<Event> {
            step(&mut self.scene, &mut self.helper);
            self.events.take()
        }
    }

    #[test]
    fn enter_then_pulse_then_exit() {
        let mut t = TwoBodies::new();
        let (a, b) = (t.trigger, t.solid);
        assert!(t.step().is_empty());

        t.move_e2_to(1.5);
        assert_eq!(t.step(), [(1, Enter, a, b), (2, Enter, b, a)]);
        for _ in 0..4 {
            assert_eq!(t.step(), [(1, Pulse, a, b), (2, Pulse, b, a)]);
        }

        t.move_e2_to(2.5);
        assert_eq!(t.step(), [(1, Exit, a, b), (2, Exit, b, a)]);
        assert_eq!(t.helper.tracker().tracked_pairs().count(), 0);
        assert!(t.step().is_empty());

        // a new overlap enters again
        t.move_e2_to(-1.0);
        assert_eq!(t.step(), [(1, Enter, a, b), (2, Enter, b, a)]);
    }

    #[test]
    fn disabling_either_side_exits() {
        let mut t = TwoBodies::new();
        let (a, b) = (t.trigger, t.solid);
        t.move_e2_to(0.5);
        assert_eq!(t.step().len(), 2);

        t.scene.collider_mut(b).unwrap().enabled = false;
        assert_eq!(t.step(), [(1, Exit, a, b), (2, Exit, b, a)]);
        assert!(t.step().is_empty());

        t.scene.collider_mut(b).unwrap().enabled = true;
        assert_eq!(t.step().len(), 2);
        t.scene.collider_mut(a).unwrap().enabled = false;
        assert_eq!(t.step(), [(1, Exit, a, b), (2, Exit, b, a)]);
    }

    #[test]
    fn no_trigger_no_event() {
        let mut t = TwoBodies::new();
        t.scene.collider_mut(t.trigger).unwrap().is_trigger = false;
        t.move_e2_to(0.5);
        for _ in 0..3 {
            assert!(t.step().is_empty());
        }
        assert!(t.scene.collider(t.trigger).unwrap().overlaps(t.scene.collider(t.solid).unwrap()));

        // a trigger on the other side is enough
        t.scene.collider_mut(t.solid).unwrap().is_trigger = true;
        assert_eq!(t.step().len(), 2);
        // and losing it ends the overlap
        t.scene.collider_mut(t.solid).unwrap().is_trigger = false;
        assert_eq!(t.step().iter().filter(|e| e.1 == Exit).count(), 2);
    }

    #[test]
    fn layer_mask_limits_neighbors() {
        let mut t = TwoBodies::new();
        t.scene.collider_mut(t.solid).unwrap().layer = 5;
        t.scene.collider_mut(t.trigger).unwrap().collides_with = LayerMask::ALL.without(5);
        t.move_e2_to(0.5);
        assert!(t.step().is_empty());
        t.scene.collider_mut(t.trigger).unwrap().collides_with = LayerMask::single(5);
        assert_eq!(t.step().len(), 2);
    }

    #[test]
    fn destroyed_neighbor() {
        struct Despawner(hecs::Entity);
        impl TriggerListener for Despawner {
            fn on_trigger_enter(&mut self, scene: &mut Scene, _: ColliderKey, _: ColliderKey) {
                let _ = scene.despawn(self.0);
            }
        }

        let mut t = TwoBodies::new();
        let (a, b) = (t.trigger, t.solid);
        t.scene.add_listener(t.e1, Despawner(t.e2)).unwrap();
        t.move_e2_to(0.5);
        // the listener on e2 never hears about it
        assert_eq!(t.step(), [(1, Enter, a, b)]);
        assert!(!t.scene.contains(t.e2));
        assert_eq!(t.step(), [(1, Exit, a, b)]);
        assert!(t.step().is_empty());
    }

    // a neighbor removed by an earlier callback in the same frame
    // is still reported as `other`, then exits on the next frame
    #[test]
    fn neighbor_removed_mid_frame() {
        struct Despawner(hecs::Entity);
        impl TriggerListener for Despawner {
            fn on_trigger_enter(&mut self, scene: &mut Scene, _: ColliderKey, _: ColliderKey) {
                let _ = scene.despawn(self.0);
            }
        }

        let mut scene = Scene::new();
        let events = Events::default();
        let e1 = scene.spawn(pose_at(0.0, 0.0));
        let e2 = scene.spawn(pose_at(0.5, 0.0));
        let e3 = scene.spawn(pose_at(-0.5, 0.0));
        let t = scene
            .attach_collider(e1, Collider::new_circle(1.0).as_trigger())
            .unwrap();
        let s2 = scene.attach_collider(e2, Collider::new_circle(1.0)).unwrap();
        let s3 = scene.attach_collider(e3, Collider::new_circle(1.0)).unwrap();
        scene.add_listener(e1, Recorder::new(1, &events)).unwrap();
        scene.add_listener(e1, Despawner(e3)).unwrap();
        let mut helper = TriggerHelper::new(e1, BruteForce::new());

        step(&mut scene, &mut helper);
        assert_eq!(events.take(), [(1, Enter, t, s2), (1, Enter, t, s3)]);
        assert!(!scene.contains(e3));
        assert!(scene.collider(s3).is_none());

        step(&mut scene, &mut helper);
        assert_eq!(events.take(), [(1, Pulse, t, s2), (1, Exit, t, s3)]);
        step(&mut scene, &mut helper);
        assert_eq!(events.take(), [(1, Pulse, t, s2)]);
    }

    #[test]
    fn neighbor_collider_swapped_during_enter() {
        struct Swapper {
            old: Option<ColliderKey>,
            owner: hecs::Entity,
            new: Arc<Mutex<Option<ColliderKey>>>,
        }
        impl TriggerListener for Swapper {
            fn on_trigger_enter(&mut self, scene: &mut Scene, _: ColliderKey, _: ColliderKey) {
                let Some(old) = self.old.take() else { return };
                assert!(scene.remove_collider(old).is_some());
                let replacement = scene
                    .attach_collider(self.owner, Collider::new_circle(1.0))
                    .unwrap();
                *self.new.lock() = Some(replacement);
            }
        }

        let mut t = TwoBodies::new();
        let (a, b) = (t.trigger, t.solid);
        let new = Arc::new(Mutex::new(None));
        t.scene
            .add_listener(
                t.e1,
                Swapper {
                    old: Some(b),
                    owner: t.e2,
                    new: new.clone(),
                },
            )
            .unwrap();
        t.move_e2_to(0.5);

        // e2's side is skipped since its collider went away first
        assert_eq!(t.step(), [(1, Enter, a, b)]);
        let c = new.lock().expect("replacement attached");
        assert_ne!(b, c);
        assert_eq!(t.scene.colliders_of(t.e2), [c]);

        assert_eq!(t.step(), [(1, Enter, a, c), (2, Enter, c, a), (1, Exit, a, b)]);
        assert_eq!(t.step(), [(1, Pulse, a, c), (2, Pulse, c, a)]);
    }

    #[test]
    fn own_entity_destroyed() {
        let mut t = TwoBodies::new();
        let (a, b) = (t.trigger, t.solid);
        t.move_e2_to(0.5);
        assert_eq!(t.step().len(), 2);
        t.scene.despawn(t.e1).unwrap();
        assert_eq!(t.step(), [(2, Exit, b, a)]);
        assert!(t.step().is_empty());
    }

    #[test]
    fn entity_listener_comes_last() {
        let mut t = TwoBodies::new();
        let (a, b) = (t.trigger, t.solid);
        t.scene
            .set_entity_listener(t.e1, Recorder::new(3, &t.events))
            .unwrap();
        t.move_e2_to(0.5);
        assert_eq!(t.step(), [(1, Enter, a, b), (3, Enter, a, b), (2, Enter, b, a)]);
    }

    // frames 0-3 approach without overlapping (frame 3 only touches),
    // frame 4 overlaps, frame 5 stays, frame 6 leaves
    #[test]
    fn approach_stay_leave() {
        let mut scene = Scene::new();
        let events = Events::default();
        let e1 = scene.spawn(pose_at(0.0, 0.0));
        let e2 = scene.spawn(pose_at(20.0, 0.0));
        let t = scene
            .attach_collider(e1, Collider::new_square(10.0).as_trigger())
            .unwrap();
        let s = scene.attach_collider(e2, Collider::new_square(10.0)).unwrap();
        scene.add_listener(e1, Recorder::new(1, &events)).unwrap();
        let mut helper = TriggerHelper::new(e1, BruteForce::new());

        let xs = [20.0, 15.0, 10.0, 10.0, 0.0, 0.0, 20.0];
        let mut all = Vec::new();
        for (frame, x) in xs.into_iter().enumerate() {
            scene.set_pose(e2, pose_at(x, 0.0)).unwrap();
            step(&mut scene, &mut helper);
            let frame_events = events.take();
            match frame {
                0..=3 => assert!(frame_events.is_empty(), "frame {}", frame),
                4 => assert_eq!(frame_events, [(1, Enter, t, s)]),
                5 => assert_eq!(frame_events, [(1, Pulse, t, s)]),
                6 => assert_eq!(frame_events, [(1, Exit, t, s)]),
                _ => unreachable!(),
            }
            all.extend(frame_events);
        }
        assert_eq!(all.len(), 3);
    }

    /// Wraps a query and shuffles its results to vary scan order.
    struct Shuffled<Q> {
        inner: Q,
        rng: rand::rngs::StdRng,
    }

    impl<Q: SpatialQuery> SpatialQuery for Shuffled<Q> {
        fn query_aabb(&mut self, bounds: crate::AABB, mask: LayerMask, out: &mut Vec<ColliderKey>) {
            let start = out.len();
            self.inner.query_aabb(bounds, mask, out);
            out[start..].shuffle(&mut self.rng);
        }
    }

    impl<Q: SpatialIndex> SpatialIndex for Shuffled<Q> {
        fn rebuild(&mut self, colliders: &crate::collision::ColliderSet) {
            self.inner.rebuild(colliders);
        }
    }

    #[test]
    fn one_notification_per_side_in_any_scan_order() {
        for seed in 0..8 {
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let mut scene = Scene::new();
            let events = Events::default();
            let e1 = scene.spawn(pose_at(0.0, 0.0));
            let e2 = scene.spawn(pose_at(1.0, 0.5));

            // overlapping colliders on the same entity pair up with each other too
            let mut offsets = vec![(0.0, true), (0.5, true), (1.0, false), (1.5, true)];
            offsets.shuffle(&mut rng);
            for (x, is_trigger) in offsets {
                let mut coll = Collider::new_circle(1.0).with_offset(pose_at(x, 0.0));
                coll.is_trigger = is_trigger;
                scene.attach_collider(e1, coll).unwrap();
            }
            for x in [-1.0, 0.0, 1.0] {
                scene
                    .attach_collider(e2, Collider::new_circle(0.5).with_offset(pose_at(x, 0.0)))
                    .unwrap();
            }
            scene.add_listener(e1, Recorder::new(1, &events)).unwrap();
            scene.add_listener(e2, Recorder::new(2, &events)).unwrap();
            scene.sync_collider_poses();

            let own: Vec<ColliderKey> = scene.colliders_of(e1).to_vec();
            let mut expected = Vec::new();
            for &c in &own {
                for (n, other) in scene.colliders().iter() {
                    let coll = scene.collider(c).unwrap();
                    if c != n && (coll.is_trigger || other.is_trigger) && coll.overlaps(other) {
                        expected.push(UnorderedPair::new(c, n).unwrap());
                    }
                }
            }
            expected.sort_by_key(|p| (p.first().min(p.second()), p.first().max(p.second())));
            expected.dedup();
            assert!(!expected.is_empty());

            let mut helper = TriggerHelper::new(
                e1,
                Shuffled {
                    inner: BruteForce::new(),
                    rng: rand::rngs::StdRng::seed_from_u64(seed + 100),
                },
            );
            for kind in [Enter, Pulse, Pulse] {
                step(&mut scene, &mut helper);
                let mut got = events.take();
                assert!(got.iter().all(|e| e.1 == kind));
                // one event per side per pair
                assert_eq!(got.len(), 2 * expected.len());
                got.sort_by_key(|e| (e.2, e.3));
                got.dedup_by_key(|e| (e.2, e.3));
                assert_eq!(got.len(), 2 * expected.len());
                for pair in &expected {
                    assert!(got.iter().any(|e| (e.2, e.3) == (pair.first(), pair.second())));
                    assert!(got.iter().any(|e| (e.2, e.3) == (pair.second(), pair.first())));
                }
            }

            scene.set_pose(e2, pose_at(50.0, 0.0)).unwrap();
            step(&mut scene, &mut helper);
            let got = events.take();
            let cross_pairs = expected
                .iter()
                .filter(|p| scene.owner_of(p.first()) != scene.owner_of(p.second()))
                .count();
            // pairs within e1 keep going
            assert_eq!(got.iter().filter(|e| e.1 == Exit).count(), 2 * cross_pairs);
            assert_eq!(
                got.iter().filter(|e| e.1 == Pulse).count(),
                2 * (expected.len() - cross_pairs)
            );
        }
    }

    #[test]
    fn works_with_the_grid() {
        use crate::collision::{HGrid, HGridParams};

        let mut scene = Scene::new();
        let events = Events::default();
        let e1 = scene.spawn(pose_at(-39.0, 9.5));
        let e2 = scene.spawn(pose_at(39.5, -9.5));
        let a = scene
            .attach_collider(e1, Collider::new_rect(3.0, 0.5).as_trigger())
            .unwrap();
        let b = scene.attach_collider(e2, Collider::new_capsule(1.0, 0.3)).unwrap();
        scene.add_listener(e1, Recorder::new(1, &events)).unwrap();
        let mut helper = TriggerHelper::new(e1, HGrid::new(HGridParams::default()));

        step(&mut scene, &mut helper);
        assert!(events.take().is_empty());
        scene.translate(e2, m::Vec2::new(-78.0, 19.0)).unwrap();
        step(&mut scene, &mut helper);
        assert_eq!(events.take(), [(1, Enter, a, b)]);
    }
}
