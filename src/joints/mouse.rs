//! Critically damped spring used for dragging a body around with a cursor
//! proxy. Only acts on the second body; the first supplies the target point.

use glam::Vec2;

use crate::core::body::Body;
use crate::utils::math::{cross, perp, solve2x2};

#[derive(Debug)]
pub struct MouseJoint {
    r2: Vec2,
    k11: f32,
    k12: f32,
    k22: f32,
    lambda_acc: Vec2,

    gamma: f32,
    beta_c: Vec2,

    frequency_hz: f32,
    damping_ratio: f32,
    max_impulse: f32,
}

impl MouseJoint {
    pub(crate) fn new() -> Self {
        Self {
            r2: Vec2::ZERO,
            k11: 0.0,
            k12: 0.0,
            k22: 0.0,
            lambda_acc: Vec2::ZERO,
            gamma: 0.0,
            beta_c: Vec2::ZERO,
            frequency_hz: 5.0,
            damping_ratio: 0.9,
            max_impulse: 0.0,
        }
    }

    pub fn set_spring_frequency_hz(&mut self, hz: f32) {
        self.frequency_hz = hz;
    }

    pub fn set_spring_damping_ratio(&mut self, ratio: f32) {
        self.damping_ratio = ratio;
    }

    pub(crate) fn init_solver(
        &mut self,
        anchor2: Vec2,
        b1: &mut Body,
        b2: &mut Body,
        dt: f32,
        max_force: f32,
        warm: bool,
    ) {
        self.max_impulse = max_force * dt;

        let omega = 2.0 * std::f32::consts::PI * self.frequency_hz;
        let k = b2.mass() * omega * omega;
        let d = b2.mass() * 2.0 * self.damping_ratio * omega;

        self.gamma = (d + k * dt) * dt;
        self.gamma = if self.gamma == 0.0 { 0.0 } else { 1.0 / self.gamma };
        let beta = dt * k * self.gamma;

        self.r2 = b2.transform.rotate_vector(anchor2 - b2.centroid);

        let i2_inv = b2.inertia_inv();
        self.k11 = b2.mass_inv() + self.r2.y * self.r2.y * i2_inv + self.gamma;
        self.k12 = -self.r2.x * self.r2.y * i2_inv;
        self.k22 = b2.mass_inv() + self.r2.x * self.r2.x * i2_inv + self.gamma;

        let c = b2.position + self.r2 - b1.position;
        self.beta_c = c * beta;

        // Bleed off spin so the dragged body does not wind up.
        b2.angular_velocity *= 0.98;

        if warm {
            b2.linear_velocity += self.lambda_acc * b2.mass_inv();
            b2.angular_velocity += cross(self.r2, self.lambda_acc) * b2.inertia_inv();
        } else {
            self.lambda_acc = Vec2::ZERO;
        }
    }

    pub(crate) fn solve_velocity_constraints(&mut self, _b1: &mut Body, b2: &mut Body) {
        let cdot = b2.linear_velocity + perp(self.r2) * b2.angular_velocity;
        let soft = self.beta_c + self.lambda_acc * self.gamma;
        let lambda = solve2x2(self.k11, self.k12, self.k12, self.k22, -(cdot + soft));

        let old = self.lambda_acc;
        self.lambda_acc += lambda;

        if self.lambda_acc.length_squared() > self.max_impulse * self.max_impulse {
            self.lambda_acc *= self.max_impulse / self.lambda_acc.length();
        }

        let lambda = self.lambda_acc - old;

        b2.linear_velocity += lambda * b2.mass_inv();
        b2.angular_velocity += cross(self.r2, lambda) * b2.inertia_inv();
    }

    pub(crate) fn reaction_force(&self, dt_inv: f32) -> Vec2 {
        self.lambda_acc * dt_inv
    }
}
