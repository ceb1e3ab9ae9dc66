mod aabb;
pub use aabb::AABB;

mod layer;
pub use layer::LayerMask;

mod collider;
pub use collider::{Collider, ColliderShape};

mod collider_set;
pub use collider_set::{ColliderKey, ColliderSet};

pub mod shape_shape;
pub use shape_shape::{point_in_shape, shapes_overlap};

mod bitmatrix;
pub mod hgrid;
pub use hgrid::{HGrid, HGridParams};

pub mod spatial_query;
pub use spatial_query::{BruteForce, SharedIndex, SpatialIndex, SpatialQuery};
