//! Exact overlap tests between collider shapes.
//!
//! All tests are strict: shapes that only touch at their boundary don't overlap.
//! Every test gives the same answer regardless of argument order.

use super::collider::ColliderShape;
use crate::math::{self as m, Pose};

/// Checks two shapes for overlap.
pub fn shapes_overlap(
    pose1: &Pose,
    shape1: &ColliderShape,
    pose2: &Pose,
    shape2: &ColliderShape,
) -> bool {
    use ColliderShape::*;
    match (*shape1, *shape2) {
        (Circle { r: r1 }, Circle { r: r2 }) => circle_circle(pose1, r1, pose2, r2),
        (Circle { r }, Rect { hw, hh }) => rect_circle(pose2, hw, hh, pose1, r),
        (Rect { hw, hh }, Circle { r }) => rect_circle(pose1, hw, hh, pose2, r),
        (Circle { r: rcirc }, Capsule { hl, r: rcap }) => {
            circle_capsule(pose1, rcirc, pose2, hl, rcap)
        }
        (Capsule { hl, r: rcap }, Circle { r: rcirc }) => {
            circle_capsule(pose2, rcirc, pose1, hl, rcap)
        }
        (Rect { hw: hw1, hh: hh1 }, Rect { hw: hw2, hh: hh2 }) => {
            rect_rect(pose1, hw1, hh1, pose2, hw2, hh2)
        }
        (Rect { hw, hh }, Capsule { hl, r }) => rect_capsule(pose1, hw, hh, pose2, hl, r),
        (Capsule { hl, r }, Rect { hw, hh }) => rect_capsule(pose2, hw, hh, pose1, hl, r),
        (Capsule { hl: hl1, r: r1 }, Capsule { hl: hl2, r: r2 }) => {
            capsule_capsule(pose1, hl1, r1, pose2, hl2, r2)
        }
    }
}

/// Check whether or not a point is inside a shape.
pub fn point_in_shape(point: m::Vec2, pose: &Pose, shape: &ColliderShape) -> bool {
    let p_wrt_c = pose.inversed() * point;
    match *shape {
        ColliderShape::Circle { r } => p_wrt_c.mag_sq() < r * r,
        ColliderShape::Rect { hw, hh } => p_wrt_c.x.abs() < hw && p_wrt_c.y.abs() < hh,
        ColliderShape::Capsule { hl, r } => {
            let x_dist = (p_wrt_c.x.abs() - hl).max(0.0);
            let y_dist = p_wrt_c.y.abs();
            x_dist * x_dist + y_dist * y_dist < r * r
        }
    }
}

//
// CIRCLE <-> CIRCLE
//

fn circle_circle(pose1: &Pose, r1: f64, pose2: &Pose, r2: f64) -> bool {
    let dist_sq = (pose2.translation - pose1.translation).mag_sq();
    let r_sum = r1 + r2;
    dist_sq < r_sum * r_sum
}

//
// RECT <-> CIRCLE
//

fn rect_circle(pose_rect: &Pose, hw: f64, hh: f64, pose_circle: &Pose, r: f64) -> bool {
    let center = pose_rect.inversed() * pose_circle.translation;
    point_rect_dist_sq(center, hw, hh) < r * r
}

//
// CIRCLE <-> CAPSULE
//

fn circle_capsule(pose_circ: &Pose, r_circ: f64, pose_cap: &Pose, hl: f64, r_cap: f64) -> bool {
    let center_dist = pose_cap.inversed() * pose_circ.translation;
    // x distance is 0 if the circle is along the line segment defining the capsule
    let x_dist = (center_dist.x.abs() - hl).max(0.0);
    let r_sum = r_circ + r_cap;
    x_dist * x_dist + center_dist.y * center_dist.y < r_sum * r_sum
}

//
// RECT <-> RECT
//

fn rect_rect(pose1: &Pose, hw1: f64, hh1: f64, pose2: &Pose, hw2: f64, hh2: f64) -> bool {
    let pose2_wrt_pose1 = pose1.inversed() * *pose2;

    // obj1 is axis-aligned at origin, these are obj2's values
    let dist = pose2_wrt_pose1.translation;

    let x2_axis = pose2_wrt_pose1.rotation * m::Vec2::unit_x();
    let hw2_v = hw2 * x2_axis;
    let y2_axis = m::left_normal(x2_axis);
    let hh2_v = hh2 * y2_axis;

    // separating axis test on each of the four edge normals
    let x1_pen = hw1 + hw2_v.x.abs() + hh2_v.x.abs() - dist.x.abs();
    if x1_pen <= 0.0 {
        return false;
    }
    let y1_pen = hh1 + hw2_v.y.abs() + hh2_v.y.abs() - dist.y.abs();
    if y1_pen <= 0.0 {
        return false;
    }
    let x2_pen = hw2 + x2_axis.x.abs() * hw1 + x2_axis.y.abs() * hh1 - dist.dot(x2_axis).abs();
    if x2_pen <= 0.0 {
        return false;
    }
    let y2_pen = hh2 + y2_axis.x.abs() * hw1 + y2_axis.y.abs() * hh1 - dist.dot(y2_axis).abs();
    y2_pen > 0.0
}

//
// RECT <-> CAPSULE
//

fn rect_capsule(pose_rect: &Pose, hw: f64, hh: f64, pose_cap: &Pose, hl: f64, r: f64) -> bool {
    let pose_cap_wrt_rect = pose_rect.inversed() * *pose_cap;
    let axis = pose_cap_wrt_rect.rotation * m::Vec2::unit_x();
    let seg_start = pose_cap_wrt_rect.translation - hl * axis;
    let seg_end = pose_cap_wrt_rect.translation + hl * axis;

    if segment_hits_rect(seg_start, seg_end, hw, hh) {
        return true;
    }
    // segment is fully outside, so the closest points are either
    // a segment endpoint or a rect corner
    let r_sq = r * r;
    if point_rect_dist_sq(seg_start, hw, hh) < r_sq || point_rect_dist_sq(seg_end, hw, hh) < r_sq {
        return true;
    }
    [
        m::Vec2::new(hw, hh),
        m::Vec2::new(-hw, hh),
        m::Vec2::new(-hw, -hh),
        m::Vec2::new(hw, -hh),
    ]
    .iter()
    .any(|&corner| point_segment_dist_sq(corner, seg_start, seg_end) < r_sq)
}

//
// CAPSULE <-> CAPSULE
//

fn capsule_capsule(pose1: &Pose, hl1: f64, r1: f64, pose2: &Pose, hl2: f64, r2: f64) -> bool {
    let axis1 = pose1.rotation * m::Vec2::unit_x();
    let axis2 = pose2.rotation * m::Vec2::unit_x();
    let a = (pose1.translation - hl1 * axis1, pose1.translation + hl1 * axis1);
    let b = (pose2.translation - hl2 * axis2, pose2.translation + hl2 * axis2);
    let r_sum = r1 + r2;
    segment_segment_dist_sq(a, b) < r_sum * r_sum
}

//
// distance helpers
//

fn point_rect_dist_sq(p: m::Vec2, hw: f64, hh: f64) -> f64 {
    let dx = (p.x.abs() - hw).max(0.0);
    let dy = (p.y.abs() - hh).max(0.0);
    dx * dx + dy * dy
}

fn point_segment_dist_sq(p: m::Vec2, start: m::Vec2, end: m::Vec2) -> f64 {
    let seg = end - start;
    let len_sq = seg.mag_sq();
    if len_sq == 0.0 {
        return (p - start).mag_sq();
    }
    let t = ((p - start).dot(seg) / len_sq).clamp(0.0, 1.0);
    (p - (start + t * seg)).mag_sq()
}

fn segment_segment_dist_sq(a: (m::Vec2, m::Vec2), b: (m::Vec2, m::Vec2)) -> f64 {
    if segments_cross(a, b) {
        return 0.0;
    }
    point_segment_dist_sq(a.0, b.0, b.1)
        .min(point_segment_dist_sq(a.1, b.0, b.1))
        .min(point_segment_dist_sq(b.0, a.0, a.1))
        .min(point_segment_dist_sq(b.1, a.0, a.1))
}

fn segments_cross(a: (m::Vec2, m::Vec2), b: (m::Vec2, m::Vec2)) -> bool {
    let cross = |o: m::Vec2, p: m::Vec2, q: m::Vec2| (p - o).wedge(q - o).xy;
    let d1 = cross(b.0, b.1, a.0);
    let d2 = cross(b.0, b.1, a.1);
    let d3 = cross(a.0, a.1, b.0);
    let d4 = cross(a.0, a.1, b.1);
    // collinear and touching cases are caught by the endpoint distances
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Liang-Barsky clip of a segment against an origin-centered rect.
fn segment_hits_rect(start: m::Vec2, end: m::Vec2, hw: f64, hh: f64) -> bool {
    let dir = end - start;
    let mut t_min: f64 = 0.0;
    let mut t_max: f64 = 1.0;
    for (s, d, half) in [(start.x, dir.x, hw), (start.y, dir.y, hh)] {
        if d == 0.0 {
            if s.abs() >= half {
                return false;
            }
            continue;
        }
        let t1 = (-half - s) / d;
        let t2 = (half - s) / d;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
        if t_min >= t_max {
            return false;
        }
    }
    true
}

//
// tests
//
