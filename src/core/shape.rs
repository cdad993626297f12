//! Collision shapes.
//!
//! A shape stores its geometry in body-local coordinates and caches the
//! world-space version whenever the owning body moves. Contact generation and
//! queries only ever look at the cached world geometry.

use glam::Vec2;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::core::geometry;
use crate::utils::math::{cross, perp, Bounds, Transform2};

static ID_COUNTER: AtomicU32 = AtomicU32::new(0);

#[derive(Debug, Clone)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
    pub world_center: Vec2,
}

#[derive(Debug, Clone)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
    pub radius: f32,
    pub normal: Vec2,
    pub world_a: Vec2,
    pub world_b: Vec2,
    pub world_normal: Vec2,
}

/// Half-plane in `n · x = d` form, normal facing outward.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plane {
    pub normal: Vec2,
    pub distance: f32,
}

#[derive(Debug, Clone)]
pub struct Poly {
    pub verts: Vec<Vec2>,
    pub planes: Vec<Plane>,
    pub world_verts: Vec<Vec2>,
    pub world_planes: Vec<Plane>,
    pub convex: bool,
}

#[derive(Debug, Clone)]
pub enum ShapeKind {
    Circle(Circle),
    Segment(Segment),
    Poly(Poly),
}

#[derive(Debug, Clone)]
pub struct Shape {
    id: u32,
    pub elasticity: f32,
    pub friction: f32,
    pub density: f32,
    pub bounds: Bounds,
    pub kind: ShapeKind,
}

impl Shape {
    fn new(kind: ShapeKind) -> Self {
        Self {
            id: ID_COUNTER.fetch_add(1, Ordering::Relaxed),
            elasticity: 0.0,
            friction: 1.0,
            density: 1.0,
            bounds: Bounds::cleared(),
            kind,
        }
    }

    pub fn circle(x: f32, y: f32, radius: f32) -> Self {
        Self::new(ShapeKind::Circle(Circle {
            center: Vec2::new(x, y),
            radius: radius.abs(),
            world_center: Vec2::ZERO,
        }))
    }

    pub fn segment(a: Vec2, b: Vec2, radius: f32) -> Self {
        Self::new(ShapeKind::Segment(Segment {
            a,
            b,
            radius: radius.abs(),
            normal: perp(b - a).normalize(),
            world_a: Vec2::ZERO,
            world_b: Vec2::ZERO,
            world_normal: Vec2::ZERO,
        }))
    }

    pub fn poly(verts: impl Into<Vec<Vec2>>) -> Self {
        let verts = verts.into();
        let world_verts = verts.clone();
        let mut poly = Poly {
            verts,
            planes: Vec::new(),
            world_verts,
            world_planes: Vec::new(),
            convex: true,
        };
        poly.finish_verts();
        Self::new(ShapeKind::Poly(poly))
    }

    /// Axis-aligned box centered at the local point `(x, y)`.
    pub fn new_box(x: f32, y: f32, width: f32, height: f32) -> Self {
        let hw = width * 0.5;
        let hh = height * 0.5;
        Self::poly(vec![
            Vec2::new(-hw + x, hh + y),
            Vec2::new(-hw + x, -hh + y),
            Vec2::new(hw + x, -hh + y),
            Vec2::new(hw + x, hh + y),
        ])
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Dispatch order for contact generation: circle < segment < poly.
    pub fn kind_index(&self) -> u8 {
        match &self.kind {
            ShapeKind::Circle(_) => 0,
            ShapeKind::Segment(_) => 1,
            ShapeKind::Poly(_) => 2,
        }
    }

    pub fn area(&self) -> f32 {
        match &self.kind {
            ShapeKind::Circle(c) => geometry::area_for_circle(c.radius, 0.0),
            ShapeKind::Segment(s) => geometry::area_for_segment(s.a, s.b, s.radius),
            ShapeKind::Poly(p) => geometry::area_for_poly(&p.verts),
        }
    }

    pub fn centroid(&self) -> Vec2 {
        match &self.kind {
            ShapeKind::Circle(c) => c.center,
            ShapeKind::Segment(s) => geometry::centroid_for_segment(s.a, s.b),
            ShapeKind::Poly(p) => geometry::centroid_for_poly(&p.verts),
        }
    }

    pub fn inertia(&self, mass: f32) -> f32 {
        match &self.kind {
            ShapeKind::Circle(c) => geometry::inertia_for_circle(mass, c.center, c.radius, 0.0),
            ShapeKind::Segment(s) => geometry::inertia_for_segment(mass, s.a, s.b),
            ShapeKind::Poly(p) => geometry::inertia_for_poly(mass, &p.verts, Vec2::ZERO),
        }
    }

    /// Shift local geometry so it is expressed about `c`.
    pub fn recenter(&mut self, c: Vec2) {
        match &mut self.kind {
            ShapeKind::Circle(circle) => circle.center -= c,
            ShapeKind::Segment(s) => {
                s.a -= c;
                s.b -= c;
            }
            ShapeKind::Poly(p) => {
                for v in &mut p.verts {
                    *v -= c;
                }
            }
        }
    }

    /// Refresh the world-space cache and bounds for the owning body transform.
    pub fn cache_data(&mut self, xf: &Transform2) {
        match &mut self.kind {
            ShapeKind::Circle(c) => {
                c.world_center = xf.transform_point(c.center);
                self.bounds = Bounds::new(
                    c.world_center - Vec2::splat(c.radius),
                    c.world_center + Vec2::splat(c.radius),
                );
            }
            ShapeKind::Segment(s) => {
                s.world_a = xf.transform_point(s.a);
                s.world_b = xf.transform_point(s.b);
                s.world_normal = perp(s.world_b - s.world_a).normalize();

                let mins = s.world_a.min(s.world_b) - Vec2::splat(s.radius);
                let maxs = s.world_a.max(s.world_b) + Vec2::splat(s.radius);
                self.bounds = Bounds::new(mins, maxs);
            }
            ShapeKind::Poly(p) => {
                self.bounds.clear();
                let num_verts = p.verts.len();
                if num_verts == 0 {
                    return;
                }

                for (world, local) in p.world_verts.iter_mut().zip(&p.verts) {
                    *world = xf.transform_point(*local);
                }

                if num_verts < 2 {
                    self.bounds.add_point(p.world_verts[0]);
                    return;
                }

                p.world_planes.clear();
                for i in 0..num_verts {
                    let a = p.world_verts[i];
                    let b = p.world_verts[(i + 1) % num_verts];
                    let n = perp(a - b).normalize();
                    p.world_planes.push(Plane {
                        normal: n,
                        distance: n.dot(a),
                    });
                    self.bounds.add_point(a);
                }
            }
        }
    }

    pub fn point_query(&self, p: Vec2) -> bool {
        match &self.kind {
            ShapeKind::Circle(c) => (c.world_center - p).length_squared() < c.radius * c.radius,
            ShapeKind::Segment(s) => {
                if !self.bounds.contains_point(p) {
                    return false;
                }

                let dn = s.world_normal.dot(p) - s.world_a.dot(s.world_normal);
                if dn.abs() > s.radius {
                    return false;
                }

                let dt = cross(p, s.world_normal);
                let dta = cross(s.world_a, s.world_normal);
                let dtb = cross(s.world_b, s.world_normal);

                if dt <= dta {
                    if dt < dta - s.radius {
                        return false;
                    }
                    (s.world_a - p).length_squared() < s.radius * s.radius
                } else if dt > dtb {
                    if dt > dtb + s.radius {
                        return false;
                    }
                    (s.world_b - p).length_squared() < s.radius * s.radius
                } else {
                    true
                }
            }
            ShapeKind::Poly(poly) => self.bounds.contains_point(p) && poly.contains_point(p),
        }
    }

    /// Index of the vertex within `min_dist` of `p`, if any. Circles report
    /// their center as vertex 0.
    pub fn find_vertex_by_point(&self, p: Vec2, min_dist: f32) -> Option<usize> {
        let dsq = min_dist * min_dist;
        match &self.kind {
            ShapeKind::Circle(c) => {
                ((c.world_center - p).length_squared() < dsq).then_some(0)
            }
            ShapeKind::Segment(s) => {
                if (s.world_a - p).length_squared() < dsq {
                    Some(0)
                } else if (s.world_b - p).length_squared() < dsq {
                    Some(1)
                } else {
                    None
                }
            }
            ShapeKind::Poly(poly) => poly
                .world_verts
                .iter()
                .position(|v| (*v - p).length_squared() < dsq),
        }
    }

    /// Signed distance of the shape's support point along the plane `n·x = d`.
    pub fn distance_on_plane(&self, n: Vec2, d: f32) -> f32 {
        match &self.kind {
            ShapeKind::Circle(c) => n.dot(c.world_center) - c.radius - d,
            ShapeKind::Segment(s) => s.distance_on_plane(n, d),
            ShapeKind::Poly(p) => p.distance_on_plane(n, d),
        }
    }
}

impl Segment {
    pub fn distance_on_plane(&self, n: Vec2, d: f32) -> f32 {
        let a = n.dot(self.world_a) - self.radius;
        let b = n.dot(self.world_b) - self.radius;
        a.min(b) - d
    }
}

impl Poly {
    fn finish_verts(&mut self) {
        if self.verts.len() < 2 {
            self.convex = false;
            self.planes.clear();
            return;
        }

        self.planes.clear();
        self.world_planes.clear();

        for i in 0..self.verts.len() {
            let a = self.verts[i];
            let b = self.verts[(i + 1) % self.verts.len()];
            let n = perp(a - b).normalize();
            self.planes.push(Plane {
                normal: n,
                distance: n.dot(a),
            });
            self.world_planes.push(Plane::default());
        }

        // Each vertex two steps ahead must sit behind the edge plane,
        // otherwise the winding is not convex.
        for i in 0..self.verts.len() {
            let b = self.verts[(i + 2) % self.verts.len()];
            let plane = self.planes[i];
            if plane.normal.dot(b) - plane.distance > 0.0 {
                self.convex = false;
            }
        }
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        self.world_planes
            .iter()
            .all(|plane| plane.normal.dot(p) - plane.distance <= 0.0)
    }

    /// Like `contains_point` but only tests planes roughly facing `n`.
    pub fn contains_point_partial(&self, p: Vec2, n: Vec2) -> bool {
        for plane in &self.world_planes {
            if plane.normal.dot(n) < 0.0001 {
                continue;
            }
            if plane.normal.dot(p) - plane.distance > 0.0 {
                return false;
            }
        }
        true
    }

    pub fn distance_on_plane(&self, n: Vec2, d: f32) -> f32 {
        let mut min = f32::MAX;
        for v in &self.world_verts {
            min = min.min(n.dot(*v));
        }
        min - d
    }

    /// Index of the edge whose band contains `p` within `min_dist`, if any.
    pub fn find_edge_by_point(&self, p: Vec2, min_dist: f32) -> Option<usize> {
        let dsq = min_dist * min_dist;
        let num_verts = self.world_verts.len();

        for i in 0..num_verts {
            let v1 = self.world_verts[i];
            let v2 = self.world_verts[(i + 1) % num_verts];
            let n = self.world_planes[i].normal;

            let dtv1 = cross(v1, n);
            let dtv2 = cross(v2, n);
            let dt = cross(p, n);

            if dt > dtv1 {
                if (v1 - p).length_squared() < dsq {
                    return Some(i);
                }
            } else if dt < dtv2 {
                if (v2 - p).length_squared() < dsq {
                    return Some(i);
                }
            } else {
                let dist = n.dot(p) - n.dot(v1);
                if dist * dist < dsq {
                    return Some(i);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn shape_ids_are_unique() {
        let a = Shape::circle(0.0, 0.0, 1.0);
        let b = Shape::circle(0.0, 0.0, 1.0);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn box_planes_face_outward() {
        let shape = Shape::new_box(0.0, 0.0, 2.0, 2.0);
        let ShapeKind::Poly(poly) = &shape.kind else {
            panic!("expected poly");
        };
        assert!(poly.convex);
        assert_eq!(poly.planes.len(), 4);
        for plane in &poly.planes {
            // Origin is inside, so every plane distance is positive.
            assert_relative_eq!(plane.distance, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn cached_poly_answers_point_queries() {
        let mut shape = Shape::new_box(0.0, 0.0, 2.0, 2.0);
        let xf = Transform2::new(Vec2::new(10.0, 0.0), 0.0);
        shape.cache_data(&xf);

        assert!(shape.point_query(Vec2::new(10.5, 0.5)));
        assert!(!shape.point_query(Vec2::new(8.5, 0.0)));
        assert_eq!(shape.find_vertex_by_point(Vec2::new(11.0, 1.0), 0.05), Some(3));
    }

    #[test]
    fn reflex_winding_is_flagged() {
        let shape = Shape::poly(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(1.0, 0.5),
            Vec2::new(0.0, 2.0),
        ]);
        let ShapeKind::Poly(poly) = &shape.kind else {
            panic!("expected poly");
        };
        assert!(!poly.convex);
    }
}
