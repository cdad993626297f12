//! One-sided rope: free while slack, rigid once taut.

use glam::Vec2;

use crate::config::{JOINT_MAX_LINEAR_CORRECTION, LINEAR_SLOP};
use crate::core::body::Body;
use crate::utils::math::{cross, rotate};

#[derive(Debug)]
pub struct RopeJoint {
    max_distance: f32,
    u: Vec2,
    s1: f32,
    s2: f32,
    em: f32,
    lambda_acc: f32,
    cdt: f32,
}

impl RopeJoint {
    pub(crate) fn new(max_distance: f32) -> Self {
        Self {
            max_distance,
            u: Vec2::ZERO,
            s1: 0.0,
            s2: 0.0,
            em: 0.0,
            lambda_acc: 0.0,
            cdt: 0.0,
        }
    }

    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    pub(crate) fn set_max_distance(&mut self, distance: f32) {
        self.max_distance = distance;
    }

    pub(crate) fn init_solver(
        &mut self,
        anchors: (Vec2, Vec2),
        b1: &mut Body,
        b2: &mut Body,
        dt: f32,
        warm: bool,
    ) {
        let r1 = b1.transform.rotate_vector(anchors.0 - b1.centroid);
        let r2 = b2.transform.rotate_vector(anchors.1 - b2.centroid);

        let d = b2.position + r2 - (b1.position + r1);
        let distance = d.length();

        let c = distance - self.max_distance;
        self.cdt = if c > 0.0 { 0.0 } else { c / dt };

        self.u = if distance > LINEAR_SLOP { d / distance } else { Vec2::ZERO };

        self.s1 = cross(r1, self.u);
        self.s2 = cross(r2, self.u);

        let em_inv = b1.mass_inv()
            + b2.mass_inv()
            + b1.inertia_inv() * self.s1 * self.s1
            + b2.inertia_inv() * self.s2 * self.s2;
        self.em = if em_inv == 0.0 { 0.0 } else { 1.0 / em_inv };

        if warm {
            let impulse = self.u * self.lambda_acc;

            b1.linear_velocity -= impulse * b1.mass_inv();
            b1.angular_velocity -= self.s1 * self.lambda_acc * b1.inertia_inv();

            b2.linear_velocity += impulse * b2.mass_inv();
            b2.angular_velocity += self.s2 * self.lambda_acc * b2.inertia_inv();
        } else {
            self.lambda_acc = 0.0;
        }
    }

    pub(crate) fn solve_velocity_constraints(&mut self, b1: &mut Body, b2: &mut Body) {
        let cdot = self.u.dot(b2.linear_velocity - b1.linear_velocity)
            + self.s2 * b2.angular_velocity
            - self.s1 * b1.angular_velocity;
        let lambda = -self.em * (cdot + self.cdt);

        // The rope only ever pulls, so the accumulator stays non-positive.
        let old = self.lambda_acc;
        self.lambda_acc = (old + lambda).min(0.0);
        let lambda = self.lambda_acc - old;

        let impulse = self.u * lambda;

        b1.linear_velocity -= impulse * b1.mass_inv();
        b1.angular_velocity -= self.s1 * lambda * b1.inertia_inv();

        b2.linear_velocity += impulse * b2.mass_inv();
        b2.angular_velocity += self.s2 * lambda * b2.inertia_inv();
    }

    pub(crate) fn solve_position_constraints(
        &mut self,
        anchors: (Vec2, Vec2),
        b1: &mut Body,
        b2: &mut Body,
    ) -> bool {
        let r1 = rotate(anchors.0 - b1.centroid, b1.angle);
        let r2 = rotate(anchors.1 - b2.centroid, b2.angle);

        let d = b2.position + r2 - (b1.position + r1);
        let dist = d.length();
        let u = if dist > LINEAR_SLOP { d / dist } else { Vec2::ZERO };

        let c = dist - self.max_distance;
        let correction = c.clamp(0.0, JOINT_MAX_LINEAR_CORRECTION);

        let s1 = cross(r1, u);
        let s2 = cross(r2, u);
        let em_inv = b1.mass_inv()
            + b2.mass_inv()
            + b1.inertia_inv() * s1 * s1
            + b2.inertia_inv() * s2 * s2;
        let lambda_dt = if em_inv == 0.0 { 0.0 } else { -correction / em_inv };

        let impulse_dt = u * lambda_dt;

        b1.position -= impulse_dt * b1.mass_inv();
        b1.angle -= s1 * lambda_dt * b1.inertia_inv();

        b2.position += impulse_dt * b2.mass_inv();
        b2.angle += s2 * lambda_dt * b2.inertia_inv();

        c < LINEAR_SLOP
    }

    pub(crate) fn reaction_force(&self, dt_inv: f32) -> Vec2 {
        self.u * (self.lambda_acc * dt_inv)
    }
}
