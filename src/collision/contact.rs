//! Persistent contact points and the sequential impulse contact solver.

use glam::Vec2;

use crate::config::{BAUMGARTE, COLLISION_SLOP, MAX_LINEAR_CORRECTION, VELOCITY_THRESHOLD};
use crate::core::body::Body;
use crate::utils::math::{cross, perp, rotate};
use crate::utils::BodyId;

/// A single contact point between two shapes.
#[derive(Debug, Clone)]
pub struct Contact {
    /// Feature hash used to carry accumulated impulses across steps.
    pub hash: u64,
    /// World-space contact point.
    pub position: Vec2,
    /// Contact normal, pointing toward the second shape.
    pub normal: Vec2,
    /// Penetration depth, negative while overlapping.
    pub depth: f32,

    // Accumulated impulses (warm starting state).
    pub lambda_n_acc: f32,
    pub lambda_t_acc: f32,

    // Solver scratch, rebuilt by init_solver each step.
    r1: Vec2,
    r2: Vec2,
    r1_local: Vec2,
    r2_local: Vec2,
    emn: f32,
    emt: f32,
    bounce: f32,
}

impl Contact {
    pub fn new(position: Vec2, normal: Vec2, depth: f32, hash: u64) -> Self {
        Self {
            hash,
            position,
            normal: normal.normalize_or_zero(),
            depth,
            lambda_n_acc: 0.0,
            lambda_t_acc: 0.0,
            r1: Vec2::ZERO,
            r2: Vec2::ZERO,
            r1_local: Vec2::ZERO,
            r2_local: Vec2::ZERO,
            emn: 0.0,
            emt: 0.0,
            bounce: 0.0,
        }
    }
}

/// Solves the contact manifold between one shape pair.
///
/// One instance persists per overlapping pair so that accumulated impulses
/// survive from step to step; [`ContactSolver::update`] migrates them onto
/// freshly generated contacts by matching feature hashes.
pub struct ContactSolver {
    pub shape1: u32,
    pub shape2: u32,
    pub body1: BodyId,
    pub body2: BodyId,
    pub contacts: Vec<Contact>,

    /// Combined restitution.
    pub elasticity: f32,
    /// Combined friction coefficient.
    pub friction: f32,

    /// Mark-and-sweep flag maintained by the space.
    pub(crate) valid: bool,
}

impl ContactSolver {
    pub fn new(
        shape1: u32,
        shape2: u32,
        body1: BodyId,
        body2: BodyId,
        contacts: Vec<Contact>,
        elasticity: f32,
        friction: f32,
    ) -> Self {
        Self {
            shape1,
            shape2,
            body1,
            body2,
            contacts,
            elasticity,
            friction,
            valid: true,
        }
    }

    /// Replace the manifold with this step's contacts, carrying accumulated
    /// impulses over wherever the feature hash matches.
    pub fn update(&mut self, mut new_contacts: Vec<Contact>) {
        for new_con in &mut new_contacts {
            if let Some(old) = self.contacts.iter().find(|c| c.hash == new_con.hash) {
                new_con.lambda_n_acc = old.lambda_n_acc;
                new_con.lambda_t_acc = old.lambda_t_acc;
            }
        }
        self.contacts = new_contacts;
    }

    /// Precompute effective masses and the restitution bias.
    pub fn init_solver(&mut self, b1: &Body, b2: &Body) {
        let sum_minv = b1.mass_inv() + b2.mass_inv();

        for con in &mut self.contacts {
            con.r1 = con.position - b1.position;
            con.r2 = con.position - b2.position;
            con.r1_local = b1.transform.unrotate_vector(con.r1);
            con.r2_local = b2.transform.unrotate_vector(con.r2);

            let n = con.normal;
            let t = perp(n);

            let sn1 = cross(con.r1, n);
            let sn2 = cross(con.r2, n);
            let emn_inv = sum_minv + b1.inertia_inv() * sn1 * sn1 + b2.inertia_inv() * sn2 * sn2;
            con.emn = if emn_inv == 0.0 { 0.0 } else { 1.0 / emn_inv };

            let st1 = cross(con.r1, t);
            let st2 = cross(con.r2, t);
            let emt_inv = sum_minv + b1.inertia_inv() * st1 * st1 + b2.inertia_inv() * st2 * st2;
            con.emt = if emt_inv == 0.0 { 0.0 } else { 1.0 / emt_inv };

            let v1 = b1.linear_velocity + perp(con.r1) * b1.angular_velocity;
            let v2 = b2.linear_velocity + perp(con.r2) * b2.angular_velocity;
            let vn = (v2 - v1).dot(n);

            // Only genuinely closing contacts get restitution.
            con.bounce = if vn < VELOCITY_THRESHOLD {
                self.elasticity * vn
            } else {
                0.0
            };
        }
    }

    /// Re-apply last step's impulses so the iteration starts near the answer.
    pub fn warm_start(&mut self, b1: &mut Body, b2: &mut Body) {
        for con in &self.contacts {
            let n = con.normal;
            let ln = con.lambda_n_acc;
            let lt = con.lambda_t_acc;

            let impulse = Vec2::new(ln * n.x - lt * n.y, lt * n.x + ln * n.y);

            b1.linear_velocity += impulse * -b1.mass_inv();
            b1.angular_velocity -= cross(con.r1, impulse) * b1.inertia_inv();

            b2.linear_velocity += impulse * b2.mass_inv();
            b2.angular_velocity += cross(con.r2, impulse) * b2.inertia_inv();
        }
    }

    pub fn solve_velocity_constraints(&mut self, b1: &mut Body, b2: &mut Body) {
        let m1_inv = b1.mass_inv();
        let i1_inv = b1.inertia_inv();
        let m2_inv = b2.mass_inv();
        let i2_inv = b2.inertia_inv();

        for con in &mut self.contacts {
            let n = con.normal;
            let t = perp(n);
            let r1 = con.r1;
            let r2 = con.r2;

            // cross(w, r) = perp(r) * w in 2D
            let v1 = b1.linear_velocity + perp(r1) * b1.angular_velocity;
            let v2 = b2.linear_velocity + perp(r2) * b2.angular_velocity;
            let rv = v2 - v1;

            let mut lambda_n = -con.emn * (n.dot(rv) + con.bounce);

            let old_n = con.lambda_n_acc;
            con.lambda_n_acc = (old_n + lambda_n).max(0.0);
            lambda_n = con.lambda_n_acc - old_n;

            let mut lambda_t = -con.emt * t.dot(rv);

            // Coulomb friction box constraint.
            let lambda_t_max = con.lambda_n_acc * self.friction;

            let old_t = con.lambda_t_acc;
            con.lambda_t_acc = (old_t + lambda_t).clamp(-lambda_t_max, lambda_t_max);
            lambda_t = con.lambda_t_acc - old_t;

            let impulse = Vec2::new(
                lambda_n * n.x - lambda_t * n.y,
                lambda_t * n.x + lambda_n * n.y,
            );

            b1.linear_velocity += impulse * -m1_inv;
            b1.angular_velocity -= cross(r1, impulse) * i1_inv;

            b2.linear_velocity += impulse * m2_inv;
            b2.angular_velocity += cross(r2, impulse) * i2_inv;
        }
    }

    /// Baumgarte position correction. Returns true once the worst remaining
    /// penetration is within tolerance.
    pub fn solve_position_constraints(&mut self, b1: &mut Body, b2: &mut Body) -> bool {
        let m1_inv = b1.mass_inv();
        let i1_inv = b1.inertia_inv();
        let m2_inv = b2.mass_inv();
        let i2_inv = b2.inertia_inv();
        let sum_minv = m1_inv + m2_inv;

        let mut max_penetration: f32 = 0.0;

        for con in &self.contacts {
            let n = con.normal;

            let r1 = rotate(con.r1_local, b1.angle);
            let r2 = rotate(con.r2_local, b2.angle);

            let p1 = b1.position + r1;
            let p2 = b2.position + r2;

            let c = (p2 - p1).dot(n) + con.depth;
            let correction =
                (BAUMGARTE * (c + COLLISION_SLOP)).clamp(-MAX_LINEAR_CORRECTION, 0.0);
            if correction == 0.0 {
                continue;
            }

            max_penetration = max_penetration.max(-c);

            let sn1 = cross(r1, n);
            let sn2 = cross(r2, n);
            let em_inv = sum_minv + i1_inv * sn1 * sn1 + i2_inv * sn2 * sn2;
            let lambda_dt = if em_inv == 0.0 { 0.0 } else { -correction / em_inv };

            let impulse_dt = n * lambda_dt;

            b1.position += impulse_dt * -m1_inv;
            b1.angle -= sn1 * lambda_dt * i1_inv;

            b2.position += impulse_dt * m2_inv;
            b2.angle += sn2 * lambda_dt * i2_inv;
        }

        max_penetration <= COLLISION_SLOP * 3.0
    }
}
