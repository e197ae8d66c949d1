//! Collision detection module
//!
//! Ray and box queries used for picking and placement validation: box
//! overlap, ray-triangle and ray-ground tests.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_half(center: Vec3, half: Vec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn half_extents(&self) -> Vec3 {
        self.size() * 0.5
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// True when the boxes overlap on all three axes by more than `eps`.
    ///
    /// Boxes that only touch (or overlap by less than `eps`) do not count.
    /// Axes are tested one at a time and the test stops at the first
    /// separating axis.
    pub fn overlaps(&self, other: &Aabb, eps: f32) -> bool {
        for axis in 0..3 {
            let separated =
                self.max[axis] <= other.min[axis] + eps || self.min[axis] >= other.max[axis] - eps;
            if separated {
                return false;
            }
        }
        true
    }
}

/// A ray with an origin and a (normalized) direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; the direction is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Möller–Trumbore ray-triangle intersection.
///
/// Double-sided. Returns the ray distance to the hit.
pub fn ray_triangle_intersect(ray_origin: Vec3, ray_dir: Vec3, tri: &[Vec3; 3]) -> Option<f32> {
    const EPSILON: f32 = 1e-8;

    let [v0, v1, v2] = *tri;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray_dir.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray_origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray_dir.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if t > EPSILON { Some(t) } else { None }
}

/// Distance along `ray` to the horizontal plane `y = height`, limited to the
/// square `[-half_size, half_size]` in X and Z.
pub fn ray_ground_intersect(ray: &Ray, height: f32, half_size: f32) -> Option<f32> {
    if ray.direction.y.abs() < 1e-10 {
        return None;
    }
    let t = (height - ray.origin.y) / ray.direction.y;
    if t < 0.0 {
        return None;
    }
    let p = ray.at(t);
    if p.x.abs() > half_size || p.z.abs() > half_size {
        return None;
    }
    Some(t)
}
