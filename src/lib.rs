// profiling spans, no-ops unless the `tracy` feature is enabled and a profiler is connected
macro_rules! tracy_span {
    ($name:literal, $fn_name:literal) => {
        tracy_client::Client::running()
            .map(|client| client.span_alloc(Some($name), $fn_name, file!(), line!(), 0))
    };
}

pub mod math;
pub use math::{uv, Angle, Pose, Rotor2, Vec2};

pub mod collision;
pub use collision::{
    BruteForce, Collider, ColliderKey, ColliderSet, ColliderShape, HGrid, HGridParams, LayerMask,
    SharedIndex, SpatialIndex, SpatialQuery, AABB,
};

pub mod scene;
pub use scene::{Scene, SceneError};

pub mod trigger;
pub use trigger::{
    ColliderPair, SharedListener, TriggerHelper, TriggerKind, TriggerListener, TriggerSystem,
    UnorderedPair,
};

pub use hecs;
