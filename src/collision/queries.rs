//! Ray casting against shapes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::shape::{Circle, Poly, Segment, Shape, ShapeKind};
use crate::utils::math::cross;
use crate::utils::BodyId;

/// A ray segment. The direction is normalized on construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec2,
    pub direction: Vec2,
    pub max_distance: f32,
}

impl Ray {
    pub fn new(origin: Vec2, direction: Vec2, max_distance: f32) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
            max_distance,
        }
    }

    pub fn point_at(&self, distance: f32) -> Vec2 {
        self.origin + self.direction * distance
    }
}

/// Result of a [`Space::raycast`](crate::space::Space::raycast).
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    pub body: BodyId,
    pub shape_id: u32,
    pub point: Vec2,
    pub normal: Vec2,
    pub distance: f32,
}

pub(crate) struct ShapeHit {
    pub distance: f32,
    pub point: Vec2,
    pub normal: Vec2,
}

fn ray_circle(center: Vec2, radius: f32, ray: &Ray) -> Option<ShapeHit> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;

    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }

    // Nearest root; rays starting inside the circle miss.
    let t = -b - disc.sqrt();
    if t < 0.0 || t > ray.max_distance {
        return None;
    }

    let point = ray.point_at(t);
    Some(ShapeHit {
        distance: t,
        point,
        normal: (point - center) / radius,
    })
}

/// Intersection with the segment from `a` to `b`, treated as a thin wall with
/// surface normal `n`. Only the side facing the ray counts.
fn ray_wall(a: Vec2, b: Vec2, n: Vec2, ray: &Ray) -> Option<ShapeHit> {
    let e = b - a;
    let denom = cross(ray.direction, e);
    if denom == 0.0 {
        return None;
    }

    let w = a - ray.origin;
    let t = cross(w, e) / denom;
    let s = cross(w, ray.direction) / denom;

    if t < 0.0 || t > ray.max_distance || !(0.0..=1.0).contains(&s) {
        return None;
    }

    let normal = if n.dot(ray.direction) < 0.0 { n } else { -n };
    Some(ShapeHit {
        distance: t,
        point: ray.point_at(t),
        normal,
    })
}

fn ray_segment(seg: &Segment, ray: &Ray) -> Option<ShapeHit> {
    if seg.radius == 0.0 {
        return ray_wall(seg.world_a, seg.world_b, seg.world_normal, ray);
    }

    // Rounded segment: two offset sides plus the end caps.
    let offset = seg.world_normal * seg.radius;
    let candidates = [
        ray_wall(
            seg.world_a + offset,
            seg.world_b + offset,
            seg.world_normal,
            ray,
        ),
        ray_wall(
            seg.world_a - offset,
            seg.world_b - offset,
            -seg.world_normal,
            ray,
        ),
        ray_circle(seg.world_a, seg.radius, ray),
        ray_circle(seg.world_b, seg.radius, ray),
    ];

    candidates
        .into_iter()
        .flatten()
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

fn ray_poly(poly: &Poly, ray: &Ray) -> Option<ShapeHit> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::MAX;
    let mut enter_normal = None;

    for plane in &poly.world_planes {
        let denom = plane.normal.dot(ray.direction);
        let dist = plane.distance - plane.normal.dot(ray.origin);

        if denom == 0.0 {
            // Parallel: miss outright if the origin is outside this plane.
            if dist < 0.0 {
                return None;
            }
            continue;
        }

        let t = dist / denom;
        if denom < 0.0 {
            if t > t_enter {
                t_enter = t;
                enter_normal = Some(plane.normal);
            }
        } else {
            t_exit = t_exit.min(t);
        }
    }

    let normal = enter_normal?;
    if t_enter > t_exit || t_enter < 0.0 || t_enter > ray.max_distance {
        return None;
    }

    Some(ShapeHit {
        distance: t_enter,
        point: ray.point_at(t_enter),
        normal,
    })
}

/// Nearest intersection of the ray with a shape's world geometry, with an
/// AABB pre-filter.
pub(crate) fn raycast_shape(shape: &Shape, ray: &Ray) -> Option<ShapeHit> {
    if !shape.bounds.intersects_ray(ray) {
        return None;
    }

    match &shape.kind {
        ShapeKind::Circle(Circle {
            world_center,
            radius,
            ..
        }) => ray_circle(*world_center, *radius, ray),
        ShapeKind::Segment(seg) => ray_segment(seg, ray),
        ShapeKind::Poly(poly) => ray_poly(poly, ray),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::math::Transform2;
    use approx::assert_relative_eq;

    #[test]
    fn ray_hits_circle_front_face() {
        let mut shape = Shape::circle(0.0, 0.0, 1.0);
        shape.cache_data(&Transform2::new(Vec2::new(5.0, 0.0), 0.0));

        let ray = Ray::new(Vec2::ZERO, Vec2::X, 100.0);
        let hit = raycast_shape(&shape, &ray).unwrap();
        assert_relative_eq!(hit.distance, 4.0, epsilon = 1e-5);
        assert_relative_eq!(hit.normal.x, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn ray_starting_inside_misses() {
        let mut shape = Shape::circle(0.0, 0.0, 2.0);
        shape.cache_data(&Transform2::default());

        let ray = Ray::new(Vec2::ZERO, Vec2::X, 100.0);
        assert!(raycast_shape(&shape, &ray).is_none());

        let mut boxy = Shape::new_box(0.0, 0.0, 4.0, 4.0);
        boxy.cache_data(&Transform2::default());
        assert!(raycast_shape(&boxy, &ray).is_none());
    }

    #[test]
    fn ray_hits_box_face_with_outward_normal() {
        let mut shape = Shape::new_box(0.0, 0.0, 2.0, 2.0);
        shape.cache_data(&Transform2::new(Vec2::new(0.0, -3.0), 0.0));

        let ray = Ray::new(Vec2::ZERO, Vec2::NEG_Y, 100.0);
        let hit = raycast_shape(&shape, &ray).unwrap();
        assert_relative_eq!(hit.distance, 2.0, epsilon = 1e-5);
        assert_relative_eq!(hit.normal.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(hit.point.y, -2.0, epsilon = 1e-5);
    }

    #[test]
    fn ray_respects_max_distance() {
        let mut shape = Shape::circle(0.0, 0.0, 1.0);
        shape.cache_data(&Transform2::new(Vec2::new(10.0, 0.0), 0.0));

        let ray = Ray::new(Vec2::ZERO, Vec2::X, 5.0);
        assert!(raycast_shape(&shape, &ray).is_none());
    }
}
