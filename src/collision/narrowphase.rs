//! Contact generation for shape pairs.
//!
//! Each generator appends [`Contact`]s with the normal pointing from the
//! first shape toward the second and a negative depth for overlap. Callers
//! are expected to order the pair circle < segment < poly (see
//! [`Shape::kind_index`]); `collide` flips the mismatched cases internally so
//! the convention holds either way.

use glam::Vec2;

use crate::collision::contact::Contact;
use crate::core::shape::{Circle, Poly, Segment, Shape, ShapeKind};
use crate::utils::math::cross;

fn circle_to_circle_internal(
    c1: Vec2,
    r1: f32,
    c2: Vec2,
    r2: f32,
    contacts: &mut Vec<Contact>,
) -> usize {
    let rmax = r1 + r2;
    let t = c2 - c1;
    let dist_sq = t.length_squared();

    if dist_sq > rmax * rmax {
        return 0;
    }

    let dist = dist_sq.sqrt();
    let p = c1 + t * (0.5 + (r1 - r2) * 0.5 / if dist == 0.0 { 0.01 } else { dist });
    let n = if dist != 0.0 { t / dist } else { Vec2::ZERO };
    let d = dist - rmax;

    contacts.push(Contact::new(p, n, d, 0));
    1
}

fn circle_to_circle(c1: &Circle, c2: &Circle, contacts: &mut Vec<Contact>) -> usize {
    circle_to_circle_internal(c1.world_center, c1.radius, c2.world_center, c2.radius, contacts)
}

fn circle_to_segment(circ: &Circle, seg: &Segment, contacts: &mut Vec<Contact>) -> usize {
    let rsum = circ.radius + seg.radius;

    let dn = circ.world_center.dot(seg.world_normal) - seg.world_a.dot(seg.world_normal);
    let dist = dn.abs() - rsum;
    if dist > 0.0 {
        return 0;
    }

    let dt = cross(circ.world_center, seg.world_normal);
    let dt_min = cross(seg.world_a, seg.world_normal);
    let dt_max = cross(seg.world_b, seg.world_normal);

    if dt < dt_min {
        if dt < dt_min - rsum {
            return 0;
        }
        return circle_to_circle_internal(
            circ.world_center,
            circ.radius,
            seg.world_a,
            seg.radius,
            contacts,
        );
    } else if dt > dt_max {
        if dt > dt_max + rsum {
            return 0;
        }
        return circle_to_circle_internal(
            circ.world_center,
            circ.radius,
            seg.world_b,
            seg.radius,
            contacts,
        );
    }

    let n = if dn > 0.0 { seg.world_normal } else { -seg.world_normal };
    contacts.push(Contact::new(
        circ.world_center + n * -(circ.radius + dist * 0.5),
        -n,
        dist,
        0,
    ));
    1
}

fn circle_to_poly(circ: &Circle, poly: &Poly, contacts: &mut Vec<Contact>) -> usize {
    let mut min_dist = f32::NEG_INFINITY;
    let mut min_idx = usize::MAX;

    for (i, plane) in poly.world_planes.iter().enumerate() {
        let dist = circ.world_center.dot(plane.normal) - plane.distance - circ.radius;
        if dist > 0.0 {
            return 0;
        }
        if dist > min_dist {
            min_dist = dist;
            min_idx = i;
        }
    }

    let n = poly.world_planes[min_idx].normal;
    let a_vert = poly.world_verts[min_idx];
    let b_vert = poly.world_verts[(min_idx + 1) % poly.world_verts.len()];
    let dta = cross(a_vert, n);
    let dtb = cross(b_vert, n);
    let dtc = cross(circ.world_center, n);

    if dtc > dta {
        return circle_to_circle_internal(circ.world_center, circ.radius, a_vert, 0.0, contacts);
    } else if dtc < dtb {
        return circle_to_circle_internal(circ.world_center, circ.radius, b_vert, 0.0, contacts);
    }

    contacts.push(Contact::new(
        circ.world_center + n * -(circ.radius + min_dist * 0.5),
        -n,
        min_dist,
        0,
    ));
    1
}

fn segment_point_distance_sq(seg: &Segment, p: Vec2) -> f32 {
    let w = p - seg.world_a;
    let d = seg.world_b - seg.world_a;
    let proj = w.dot(d);

    if proj <= 0.0 {
        return w.dot(w);
    }

    let vsq = d.dot(d);
    if proj >= vsq {
        return w.dot(w) - 2.0 * proj + vsq;
    }

    w.dot(w) - proj * proj / vsq
}

fn segment_to_segment(seg1: &Segment, seg2: &Segment, contacts: &mut Vec<Contact>) -> usize {
    let d = [
        segment_point_distance_sq(seg1, seg2.world_a),
        segment_point_distance_sq(seg1, seg2.world_b),
        segment_point_distance_sq(seg2, seg1.world_a),
        segment_point_distance_sq(seg2, seg1.world_b),
    ];

    let idx1 = if d[0] < d[1] { 0 } else { 1 };
    let idx2 = if d[2] < d[3] { 2 } else { 3 };
    let idxm = if d[idx1] < d[idx2] { idx1 } else { idx2 };

    let u = seg1.world_b - seg1.world_a;
    let v = seg2.world_b - seg2.world_a;

    let (s, t) = match idxm {
        0 => (
            ((seg2.world_a - seg1.world_a).dot(u) / u.dot(u)).clamp(0.0, 1.0),
            0.0,
        ),
        1 => (
            ((seg2.world_b - seg1.world_a).dot(u) / u.dot(u)).clamp(0.0, 1.0),
            1.0,
        ),
        2 => (
            0.0,
            ((seg1.world_a - seg2.world_a).dot(v) / v.dot(v)).clamp(0.0, 1.0),
        ),
        _ => (
            1.0,
            ((seg1.world_b - seg2.world_a).dot(v) / v.dot(v)).clamp(0.0, 1.0),
        ),
    };

    let minp1 = seg1.world_a + u * s;
    let minp2 = seg2.world_a + v * t;

    circle_to_circle_internal(minp1, seg1.radius, minp2, seg2.radius, contacts)
}

fn find_points_behind_seg(
    contacts: &mut Vec<Contact>,
    seg: &Segment,
    poly: &Poly,
    poly_id: u32,
    dist: f32,
    coef: f32,
) {
    let dta = cross(seg.world_normal, seg.world_a);
    let dtb = cross(seg.world_normal, seg.world_b);
    let n = seg.world_normal * coef;

    for (i, v) in poly.world_verts.iter().enumerate() {
        if v.dot(n) < seg.world_normal.dot(seg.world_a) * coef + seg.radius {
            let dt = cross(seg.world_normal, *v);
            if dta >= dt && dt >= dtb {
                contacts.push(Contact::new(*v, n, dist, contact_hash(poly_id, i)));
            }
        }
    }
}

fn segment_to_poly(
    seg: &Segment,
    seg_id: u32,
    poly: &Poly,
    poly_id: u32,
    contacts: &mut Vec<Contact>,
) -> usize {
    let seg_td = seg.world_normal.dot(seg.world_a);
    let seg_d1 = poly.distance_on_plane(seg.world_normal, seg_td) - seg.radius;
    if seg_d1 > 0.0 {
        return 0;
    }

    let seg_d2 = poly.distance_on_plane(-seg.world_normal, -seg_td) - seg.radius;
    if seg_d2 > 0.0 {
        return 0;
    }

    let mut poly_d = f32::NEG_INFINITY;
    let mut poly_i = usize::MAX;

    for (i, plane) in poly.world_planes.iter().enumerate() {
        let dist = seg.distance_on_plane(plane.normal, plane.distance);
        if dist > 0.0 {
            return 0;
        }
        if dist > poly_d {
            poly_d = dist;
            poly_i = i;
        }
    }

    let poly_n = -poly.world_planes[poly_i].normal;
    let va = seg.world_a + poly_n * seg.radius;
    let vb = seg.world_b + poly_n * seg.radius;

    if poly.contains_point(va) {
        contacts.push(Contact::new(va, poly_n, poly_d, contact_hash(seg_id, 0)));
    }
    if poly.contains_point(vb) {
        contacts.push(Contact::new(vb, poly_n, poly_d, contact_hash(seg_id, 1)));
    }

    // Prefer the segment's own face when its separation is comparable.
    let poly_d = poly_d - 0.1;
    if seg_d1 >= poly_d || seg_d2 >= poly_d {
        if seg_d1 > seg_d2 {
            find_points_behind_seg(contacts, seg, poly, poly_id, seg_d1, 1.0);
        } else {
            find_points_behind_seg(contacts, seg, poly, poly_id, seg_d2, -1.0);
        }
    }

    if contacts.is_empty() {
        let poly_a = poly.world_verts[poly_i];
        let poly_b = poly.world_verts[(poly_i + 1) % poly.world_verts.len()];

        if circle_to_circle_internal(seg.world_a, seg.radius, poly_a, 0.0, contacts) > 0 {
            return 1;
        }
        if circle_to_circle_internal(seg.world_b, seg.radius, poly_a, 0.0, contacts) > 0 {
            return 1;
        }
        if circle_to_circle_internal(seg.world_a, seg.radius, poly_b, 0.0, contacts) > 0 {
            return 1;
        }
        if circle_to_circle_internal(seg.world_b, seg.radius, poly_b, 0.0, contacts) > 0 {
            return 1;
        }
    }

    contacts.len()
}

/// Maximum separating axis of `poly` against the given planes. Returns `None`
/// when a plane fully separates.
fn find_msa(poly: &Poly, planes: &[crate::core::shape::Plane]) -> Option<(f32, usize)> {
    let mut min_dist = f32::NEG_INFINITY;
    let mut min_idx = usize::MAX;

    for (i, plane) in planes.iter().enumerate() {
        let dist = poly.distance_on_plane(plane.normal, plane.distance);
        if dist > 0.0 {
            return None;
        }
        if dist > min_dist {
            min_dist = dist;
            min_idx = i;
        }
    }
    Some((min_dist, min_idx))
}

fn find_verts_fallback(
    contacts: &mut Vec<Contact>,
    poly1: &Poly,
    id1: u32,
    poly2: &Poly,
    id2: u32,
    n: Vec2,
    dist: f32,
) -> usize {
    let mut num = 0;
    for (i, v) in poly1.world_verts.iter().enumerate() {
        if poly2.contains_point_partial(*v, n) {
            contacts.push(Contact::new(*v, n, dist, contact_hash(id1, i)));
            num += 1;
        }
    }
    for (i, v) in poly2.world_verts.iter().enumerate() {
        if poly1.contains_point_partial(*v, n) {
            contacts.push(Contact::new(*v, n, dist, contact_hash(id2, i)));
            num += 1;
        }
    }
    num
}

fn find_verts(
    contacts: &mut Vec<Contact>,
    poly1: &Poly,
    id1: u32,
    poly2: &Poly,
    id2: u32,
    n: Vec2,
    dist: f32,
) -> usize {
    let mut num = 0;
    for (i, v) in poly1.world_verts.iter().enumerate() {
        if poly2.contains_point(*v) {
            contacts.push(Contact::new(*v, n, dist, contact_hash(id1, i)));
            num += 1;
        }
    }
    for (i, v) in poly2.world_verts.iter().enumerate() {
        if poly1.contains_point(*v) {
            contacts.push(Contact::new(*v, n, dist, contact_hash(id2, i)));
            num += 1;
        }
    }

    if num > 0 {
        num
    } else {
        find_verts_fallback(contacts, poly1, id1, poly2, id2, n, dist)
    }
}

fn poly_to_poly(
    poly1: &Poly,
    id1: u32,
    poly2: &Poly,
    id2: u32,
    contacts: &mut Vec<Contact>,
) -> usize {
    let Some(msa1) = find_msa(poly2, &poly1.world_planes) else {
        return 0;
    };
    let Some(msa2) = find_msa(poly1, &poly2.world_planes) else {
        return 0;
    };

    if msa1.0 > msa2.0 {
        find_verts(
            contacts,
            poly1,
            id1,
            poly2,
            id2,
            poly1.world_planes[msa1.1].normal,
            msa1.0,
        )
    } else {
        find_verts(
            contacts,
            poly1,
            id1,
            poly2,
            id2,
            -poly2.world_planes[msa2.1].normal,
            msa2.0,
        )
    }
}

/// Persistence hash for a multi-point contact: owning shape id plus the
/// feature (vertex) index on that shape.
fn contact_hash(shape_id: u32, feature: usize) -> u64 {
    ((shape_id as u64) << 16) | feature as u64
}

fn flip_normals(contacts: &mut [Contact]) {
    for con in contacts {
        con.normal = -con.normal;
    }
}

/// Generate contacts for a shape pair. Normals point from `a` toward `b`.
pub fn collide(a: &Shape, b: &Shape, contacts: &mut Vec<Contact>) -> usize {
    let start = contacts.len();
    match (&a.kind, &b.kind) {
        (ShapeKind::Circle(c1), ShapeKind::Circle(c2)) => circle_to_circle(c1, c2, contacts),
        (ShapeKind::Circle(c), ShapeKind::Segment(s)) => circle_to_segment(c, s, contacts),
        (ShapeKind::Circle(c), ShapeKind::Poly(p)) => circle_to_poly(c, p, contacts),
        (ShapeKind::Segment(s), ShapeKind::Circle(c)) => {
            let n = circle_to_segment(c, s, contacts);
            flip_normals(&mut contacts[start..]);
            n
        }
        (ShapeKind::Segment(s1), ShapeKind::Segment(s2)) => segment_to_segment(s1, s2, contacts),
        (ShapeKind::Segment(s), ShapeKind::Poly(p)) => {
            segment_to_poly(s, a.id(), p, b.id(), contacts)
        }
        (ShapeKind::Poly(p), ShapeKind::Circle(c)) => {
            let n = circle_to_poly(c, p, contacts);
            flip_normals(&mut contacts[start..]);
            n
        }
        (ShapeKind::Poly(p), ShapeKind::Segment(s)) => {
            let n = segment_to_poly(s, b.id(), p, a.id(), contacts);
            flip_normals(&mut contacts[start..]);
            n
        }
        (ShapeKind::Poly(p1), ShapeKind::Poly(p2)) => {
            poly_to_poly(p1, a.id(), p2, b.id(), contacts)
        }
    }
}
