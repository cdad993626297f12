//! Fixed-distance constraint, optionally softened into a damped spring.

use glam::Vec2;

use crate::config::{JOINT_MAX_LINEAR_CORRECTION, LINEAR_SLOP};
use crate::core::body::Body;
use crate::utils::math::{cross, rotate};

#[derive(Debug)]
pub struct DistanceJoint {
    rest_length: f32,
    frequency_hz: f32,
    damping_ratio: f32,

    gamma: f32,
    beta_c: f32,
    lambda_acc: f32,
    effective_mass: f32,

    u: Vec2,
    s1: f32,
    s2: f32,
}

impl DistanceJoint {
    pub(crate) fn new(rest_length: f32) -> Self {
        Self {
            rest_length,
            frequency_hz: 0.0,
            damping_ratio: 0.0,
            gamma: 0.0,
            beta_c: 0.0,
            lambda_acc: 0.0,
            effective_mass: 0.0,
            u: Vec2::ZERO,
            s1: 0.0,
            s2: 0.0,
        }
    }

    /// Non-zero frequency turns the rigid rod into a spring; position
    /// correction is then skipped entirely.
    pub fn set_spring_frequency_hz(&mut self, hz: f32) {
        self.frequency_hz = hz;
    }

    pub fn set_spring_damping_ratio(&mut self, ratio: f32) {
        self.damping_ratio = ratio;
    }

    pub fn rest_length(&self) -> f32 {
        self.rest_length
    }

    pub(crate) fn set_rest_length(&mut self, length: f32) {
        self.rest_length = length;
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

        let d = (b2.position + r2) - (b1.position + r1);
        let dist = d.length();

        self.u = if dist > LINEAR_SLOP { d / dist } else { Vec2::ZERO };
        self.s1 = cross(r1, self.u);
        self.s2 = cross(r2, self.u);

        let mut em_inv = b1.mass_inv()
            + b2.mass_inv()
            + b1.inertia_inv() * self.s1 * self.s1
            + b2.inertia_inv() * self.s2 * self.s2;
        self.effective_mass = if em_inv == 0.0 { 0.0 } else { 1.0 / em_inv };

        if self.frequency_hz > 0.0 {
            let omega = 2.0 * std::f32::consts::PI * self.frequency_hz;
            let k = self.effective_mass * omega * omega;
            let c = self.effective_mass * 2.0 * self.damping_ratio * omega;

            self.gamma = (c + k * dt) * dt;
            self.gamma = if self.gamma == 0.0 { 0.0 } else { 1.0 / self.gamma };
            let beta = dt * k * self.gamma;

            let pc = dist - self.rest_length;
            self.beta_c = beta * pc;

            em_inv += self.gamma;
            self.effective_mass = if em_inv == 0.0 { 0.0 } else { 1.0 / em_inv };
        } else {
            self.gamma = 0.0;
            self.beta_c = 0.0;
        }

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
        let soft = self.beta_c + self.gamma * self.lambda_acc;
        let lambda = -self.effective_mass * (cdot + soft);
        self.lambda_acc += lambda;

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
        if self.frequency_hz > 0.0 {
            return true;
        }

        let r1 = rotate(anchors.0 - b1.centroid, b1.angle);
        let r2 = rotate(anchors.1 - b2.centroid, b2.angle);

        let d = (b2.position + r2) - (b1.position + r1);
        let dist = d.length();
        let u = if dist > LINEAR_SLOP { d / dist } else { Vec2::ZERO };

        let c = dist - self.rest_length;
        let correction = c.clamp(-JOINT_MAX_LINEAR_CORRECTION, JOINT_MAX_LINEAR_CORRECTION);

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

        c.abs() < LINEAR_SLOP
    }

    pub(crate) fn reaction_force(&self, dt_inv: f32) -> Vec2 {
        self.u * (self.lambda_acc * dt_inv)
    }
}
