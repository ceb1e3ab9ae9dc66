use super::{shape_shape, LayerMask, AABB};
use crate::math as m;

/// A collision volume attached to an entity.
///
/// Colliders are placed relative to their owner entity's pose with `offset`.
/// Trigger colliders only report overlaps; whether anything else reacts
/// to them is up to the listeners on either side.
#[derive(Clone, Copy, Debug)]
pub struct Collider {
    pub shape: ColliderShape,
    /// Pose relative to the owning entity.
    pub offset: m::Pose,
    /// The layer this collider lives on.
    pub layer: usize,
    /// Layers this collider's overlap queries look at.
    pub collides_with: LayerMask,
    pub is_trigger: bool,
    /// Disabled colliders are skipped entirely by spatial indexing and trigger detection.
    pub enabled: bool,
    // world-space pose, updated from the owner's pose by `Scene::sync_collider_poses`
    pub(crate) pose: m::Pose,
    pub(crate) owner: Option<hecs::Entity>,
}

/// The physical shape of a collider.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub enum ColliderShape {
    Circle {
        r: f64,
    },
    /// The rect collider stores its side lengths halved because this makes
    /// intersection tests easier.
    Rect {
        hw: f64,
        hh: f64,
    },
    /// A capsule is the shape a circle traces when moved along a line segment.
    /// `hl` is half the length of that segment, which lies along the local x axis.
    Capsule {
        hl: f64,
        r: f64,
    },
}

impl ColliderShape {
    /// Get the axis-aligned bounding box of the shape at the given pose.
    pub fn aabb(&self, pose: &m::Pose) -> AABB {
        let center = pose.translation;
        let half_extents = match *self {
            ColliderShape::Circle { r } => m::Vec2::new(r, r),
            ColliderShape::Rect { hw, hh } => {
                let x_axis = pose.rotation * m::Vec2::unit_x();
                let y_axis = m::left_normal(x_axis);
                let hw_v = hw * x_axis;
                let hh_v = hh * y_axis;
                m::Vec2::new(
                    hw_v.x.abs() + hh_v.x.abs(),
                    hw_v.y.abs() + hh_v.y.abs(),
                )
            }
            ColliderShape::Capsule { hl, r } => {
                let hl_v = hl * (pose.rotation * m::Vec2::unit_x());
                m::Vec2::new(hl_v.x.abs() + r, hl_v.y.abs() + r)
            }
        };
        AABB::from_center_extents(center, half_extents)
    }
}

impl Collider {
    fn from_shape(shape: ColliderShape) -> Self {
        Collider {
            shape,
            offset: m::Pose::identity(),
            layer: 0,
            collides_with: LayerMask::ALL,
            is_trigger: false,
            enabled: true,
            pose: m::Pose::identity(),
            owner: None,
        }
    }

    /// Create a circle collider from a radius.
    pub fn new_circle(radius: f64) -> Self {
        Self::from_shape(ColliderShape::Circle { r: radius })
    }

    /// Create a rect collider with both sides set to the same length.
    pub fn new_square(side_length: f64) -> Self {
        Self::new_rect(side_length, side_length)
    }

    /// Create a rect collider with two different side lengths.
    pub fn new_rect(width: f64, height: f64) -> Self {
        Self::from_shape(ColliderShape::Rect {
            hw: width / 2.0,
            hh: height / 2.0,
        })
    }

    /// Create a capsule collider from the length of its center line and its radius.
    /// The total length of the capsule is `length + 2 * radius`.
    pub fn new_capsule(length: f64, radius: f64) -> Self {
        Self::from_shape(ColliderShape::Capsule {
            hl: length / 2.0,
            r: radius,
        })
    }

    /// Set the pose of the collider relative to its owner in a builder-like chain.
    pub fn with_offset(mut self, offset: impl Into<m::Pose>) -> Self {
        self.offset = offset.into();
        self
    }

    pub fn with_layer(mut self, layer: usize) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_collides_with(mut self, mask: LayerMask) -> Self {
        self.collides_with = mask;
        self
    }

    /// Make this a trigger collider.
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// World-space pose as of the last pose sync.
    #[inline]
    pub fn pose(&self) -> &m::Pose {
        &self.pose
    }

    /// World-space bounds as of the last pose sync.
    #[inline]
    pub fn bounds(&self) -> AABB {
        self.shape.aabb(&self.pose)
    }

    /// The entity this collider is attached to.
    /// `None` if it was never attached or has since been detached.
    #[inline]
    pub fn owner(&self) -> Option<hecs::Entity> {
        self.owner
    }

    /// Exact overlap test between two colliders at their current world poses.
    #[inline]
    pub fn overlaps(&self, other: &Collider) -> bool {
        shape_shape::shapes_overlap(&self.pose, &self.shape, &other.pose, &other.shape)
    }
}
