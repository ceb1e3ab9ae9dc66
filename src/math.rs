//! Geometry aliases over the `f64` types of `ultraviolet`.
pub use ultraviolet as uv;

/// Rotation and translation without scaling.
///
/// Entities and colliders are both placed with Poses.
/// A collider's world pose is its owner's pose multiplied by the collider's offset.
pub type Pose = uv::DIsometry2;
pub type Vec2 = uv::DVec2;
pub type Rotor2 = uv::DRotor2;

/// A rotation angle, written in whichever unit is handier.
/// Converts into a [`Rotor2`] with `into()`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde-types", derive(serde::Deserialize, serde::Serialize))]
pub enum Angle {
    Rad(f64),
    Deg(f64),
}

impl Angle {
    #[inline]
    pub fn rad(self) -> f64 {
        match self {
            Angle::Rad(r) => r,
            Angle::Deg(d) => d.to_radians(),
        }
    }
}

impl Default for Angle {
    fn default() -> Self {
        Angle::Rad(0.0)
    }
}

impl From<Angle> for Rotor2 {
    #[inline]
    fn from(angle: Angle) -> Rotor2 {
        Rotor2::from_angle(angle.rad())
    }
}

/// Shorthand for an unrotated pose at the given position.
#[inline]
pub fn pose_at(x: f64, y: f64) -> Pose {
    Pose::new(Vec2::new(x, y), Rotor2::identity())
}

/// `v` rotated a quarter turn counterclockwise.
#[inline]
pub fn left_normal(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}
