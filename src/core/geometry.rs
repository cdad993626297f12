//! Mass properties for the collision primitives.
//!
//! Areas are signed for polygons (counter-clockwise winding is positive).
//! Inertia values are about the body origin; callers shift them to the
//! centroid via the parallel axis theorem where needed.

use glam::Vec2;

use crate::utils::math::cross;

pub fn area_for_circle(radius_outer: f32, radius_inner: f32) -> f32 {
    std::f32::consts::PI * (radius_outer * radius_outer - radius_inner * radius_inner)
}

pub fn inertia_for_circle(mass: f32, center: Vec2, radius_outer: f32, radius_inner: f32) -> f32 {
    mass * ((radius_outer * radius_outer + radius_inner * radius_inner) * 0.5
        + center.length_squared())
}

pub fn area_for_segment(a: Vec2, b: Vec2, radius: f32) -> f32 {
    radius * (std::f32::consts::PI * radius + 2.0 * a.distance(b))
}

pub fn centroid_for_segment(a: Vec2, b: Vec2) -> Vec2 {
    (a + b) * 0.5
}

pub fn inertia_for_segment(mass: f32, a: Vec2, b: Vec2) -> f32 {
    let dist_sq = (b - a).length_squared();
    let offset = (a + b) * 0.5;
    mass * (dist_sq / 12.0 + offset.length_squared())
}

pub fn area_for_poly(verts: &[Vec2]) -> f32 {
    let mut area = 0.0;
    for i in 0..verts.len() {
        area += cross(verts[i], verts[(i + 1) % verts.len()]);
    }
    area / 2.0
}

pub fn centroid_for_poly(verts: &[Vec2]) -> Vec2 {
    let mut area = 0.0;
    let mut vsum = Vec2::ZERO;

    for i in 0..verts.len() {
        let v1 = verts[i];
        let v2 = verts[(i + 1) % verts.len()];
        let c = cross(v1, v2);

        area += c;
        vsum += (v1 + v2) * c;
    }

    vsum * (1.0 / (3.0 * area))
}

pub fn inertia_for_poly(mass: f32, verts: &[Vec2], offset: Vec2) -> f32 {
    let mut sum1 = 0.0;
    let mut sum2 = 0.0;

    for i in 0..verts.len() {
        let v1 = verts[i] + offset;
        let v2 = verts[(i + 1) % verts.len()] + offset;

        let a = cross(v2, v1);
        let b = v1.dot(v1) + v1.dot(v2) + v2.dot(v2);

        sum1 += a * b;
        sum2 += a;
    }

    (mass * sum1) / (6.0 * sum2)
}

pub fn inertia_for_box(mass: f32, w: f32, h: f32) -> f32 {
    mass * (w * w + h * h) / 12.0
}

/// Convex hull by gift wrapping. Returns the hull counter-clockwise, starting
/// from the rightmost (then lowest) input point. Collinear points are dropped
/// in favor of the farthest one.
pub fn convex_hull(points: &[Vec2]) -> Vec<Vec2> {
    let mut i0 = 0;
    let mut x0 = points[0].x;
    for (i, p) in points.iter().enumerate().skip(1) {
        if p.x > x0 || (p.x == x0 && p.y < points[i0].y) {
            i0 = i;
            x0 = p.x;
        }
    }

    let n = points.len();
    let mut hull: Vec<usize> = Vec::new();
    let mut ih = i0;

    loop {
        hull.push(ih);

        let last = ih;
        let mut ie = 0;
        for j in 1..n {
            if ie == ih {
                ie = j;
                continue;
            }

            let r = points[ie] - points[last];
            let v = points[j] - points[last];
            let c = cross(r, v);

            if c < 0.0 || (c == 0.0 && v.length_squared() > r.length_squared()) {
                ie = j;
            }
        }

        ih = ie;
        if ie == i0 {
            break;
        }
    }

    hull.into_iter().map(|idx| points[idx]).collect()
}
