//! Small 2D helpers layered on top of glam.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::collision::queries::Ray;

/// 2D cross product (z component of the 3D cross).
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Counter-clockwise perpendicular.
#[inline]
pub fn perp(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Rotate a vector by `angle` radians.
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y)
}

/// Clamp a vector's length to `max_length`.
#[inline]
pub fn truncate(v: Vec2, max_length: f32) -> Vec2 {
    let length_sq = v.length_squared();
    if length_sq > max_length * max_length {
        v * (max_length / length_sq.sqrt())
    } else {
        v
    }
}

/// Solve `A * x = b` for a 2x2 matrix given in row-major scalars.
/// A singular matrix yields the zero vector.
#[inline]
pub fn solve2x2(a11: f32, a12: f32, a21: f32, a22: f32, b: Vec2) -> Vec2 {
    let mut det = a11 * a22 - a12 * a21;
    if det != 0.0 {
        det = 1.0 / det;
    }
    Vec2::new(det * (a22 * b.x - a12 * b.y), det * (a11 * b.y - a21 * b.x))
}

/// Solve `A * x = b` for a 3x3 matrix given by columns, via cofactors.
/// A singular matrix yields the zero vector.
#[inline]
pub fn solve3x3(ex: Vec3, ey: Vec3, ez: Vec3, b: Vec3) -> Vec3 {
    let mut det = ex.dot(ey.cross(ez));
    if det != 0.0 {
        det = 1.0 / det;
    }
    Vec3::new(
        det * b.dot(ey.cross(ez)),
        det * ex.dot(b.cross(ez)),
        det * ex.dot(ey.cross(b)),
    )
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub mins: Vec2,
    pub maxs: Vec2,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::cleared()
    }
}

impl Bounds {
    pub fn new(mins: Vec2, maxs: Vec2) -> Self {
        Self { mins, maxs }
    }

    /// Empty bounds that any `add_point` will snap onto.
    pub fn cleared() -> Self {
        Self {
            mins: Vec2::splat(f32::MAX),
            maxs: Vec2::splat(-f32::MAX),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::cleared();
    }

    pub fn add_point(&mut self, point: Vec2) {
        self.mins = self.mins.min(point);
        self.maxs = self.maxs.max(point);
    }

    pub fn add_bounds(&mut self, other: &Bounds) {
        self.mins = self.mins.min(other.mins);
        self.maxs = self.maxs.max(other.maxs);
    }

    pub fn expand(&mut self, amount: f32) {
        self.mins -= Vec2::splat(amount);
        self.maxs += Vec2::splat(amount);
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.mins.x <= other.maxs.x
            && self.maxs.x >= other.mins.x
            && self.mins.y <= other.maxs.y
            && self.maxs.y >= other.mins.y
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.mins.x
            && point.x <= self.maxs.x
            && point.y >= self.mins.y
            && point.y <= self.maxs.y
    }

    pub fn center(&self) -> Vec2 {
        (self.mins + self.maxs) * 0.5
    }

    pub fn extents(&self) -> Vec2 {
        (self.maxs - self.mins) * 0.5
    }

    /// Slab test against a ray segment. Zero direction components divide to
    /// infinities, which the min/max ordering handles.
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        let inv = Vec2::new(1.0 / ray.direction.x, 1.0 / ray.direction.y);

        let tx1 = (self.mins.x - ray.origin.x) * inv.x;
        let tx2 = (self.maxs.x - ray.origin.x) * inv.x;
        let mut tmin = tx1.min(tx2);
        let mut tmax = tx1.max(tx2);

        let ty1 = (self.mins.y - ray.origin.y) * inv.y;
        let ty2 = (self.maxs.y - ray.origin.y) * inv.y;
        tmin = tmin.max(ty1.min(ty2));
        tmax = tmax.min(ty1.max(ty2));

        tmax >= tmin.max(0.0) && tmin <= ray.max_distance
    }
}

/// Rigid 2D transform with a cached rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2 {
    pub position: Vec2,
    pub cos: f32,
    pub sin: f32,
}

impl Default for Transform2 {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 0.0)
    }
}

impl Transform2 {
    pub fn new(position: Vec2, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self { position, cos, sin }
    }

    pub fn set(&mut self, position: Vec2, angle: f32) {
        self.position = position;
        self.set_angle(angle);
    }

    pub fn set_angle(&mut self, angle: f32) {
        let (sin, cos) = angle.sin_cos();
        self.sin = sin;
        self.cos = cos;
    }

    /// Local point to world.
    #[inline]
    pub fn transform_point(&self, point: Vec2) -> Vec2 {
        self.position + self.rotate_vector(point)
    }

    /// World point to local.
    #[inline]
    pub fn untransform_point(&self, point: Vec2) -> Vec2 {
        self.unrotate_vector(point - self.position)
    }

    /// Local direction to world.
    #[inline]
    pub fn rotate_vector(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.cos * v.x - self.sin * v.y, self.sin * v.x + self.cos * v.y)
    }

    /// World direction to local.
    #[inline]
    pub fn unrotate_vector(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.cos * v.x + self.sin * v.y, -self.sin * v.x + self.cos * v.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn solve2x2_recovers_known_solution() {
        // [2 1; 1 3] * (1, 2) = (4, 7)
        let x = solve2x2(2.0, 1.0, 1.0, 3.0, Vec2::new(4.0, 7.0));
        assert_relative_eq!(x.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(x.y, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn singular_solves_return_zero() {
        assert_eq!(solve2x2(1.0, 2.0, 2.0, 4.0, Vec2::new(1.0, 1.0)), Vec2::ZERO);
        let x = solve3x3(Vec3::X, Vec3::X, Vec3::Z, Vec3::ONE);
        assert_eq!(x, Vec3::ZERO);
    }

    #[test]
    fn solve3x3_identity_passthrough() {
        let b = Vec3::new(3.0, -1.0, 0.5);
        let x = solve3x3(Vec3::X, Vec3::Y, Vec3::Z, b);
        assert_relative_eq!(x.x, b.x, epsilon = 1e-6);
        assert_relative_eq!(x.y, b.y, epsilon = 1e-6);
        assert_relative_eq!(x.z, b.z, epsilon = 1e-6);
    }

    #[test]
    fn transform_round_trips() {
        let xf = Transform2::new(Vec2::new(3.0, -2.0), 0.7);
        let p = Vec2::new(1.5, 4.0);
        let back = xf.untransform_point(xf.transform_point(p));
        assert_relative_eq!(back.x, p.x, epsilon = 1e-5);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-5);
    }
}
