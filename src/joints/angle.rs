//! 1-DOF angular lock between two bodies.

use crate::config::{ANGULAR_SLOP, MAX_ANGULAR_CORRECTION};
use crate::core::body::Body;

#[derive(Debug)]
pub struct AngleJoint {
    ref_angle: f32,
    lambda_acc: f32,
    effective_mass: f32,
}

impl AngleJoint {
    pub(crate) fn new(b1: &Body, b2: &Body) -> Self {
        Self {
            ref_angle: b2.angle - b1.angle,
            lambda_acc: 0.0,
            effective_mass: 0.0,
        }
    }

    pub(crate) fn init_solver(&mut self, b1: &mut Body, b2: &mut Body, warm: bool) {
        let em_inv = b1.inertia_inv() + b2.inertia_inv();
        self.effective_mass = if em_inv == 0.0 { 0.0 } else { 1.0 / em_inv };

        if warm {
            b1.angular_velocity -= self.lambda_acc * b1.inertia_inv();
            b2.angular_velocity += self.lambda_acc * b2.inertia_inv();
        } else {
            self.lambda_acc = 0.0;
        }
    }

    pub(crate) fn solve_velocity_constraints(&mut self, b1: &mut Body, b2: &mut Body) {
        let cdot = b2.angular_velocity - b1.angular_velocity;
        let lambda = -self.effective_mass * cdot;
        self.lambda_acc += lambda;

        b1.angular_velocity -= lambda * b1.inertia_inv();
        b2.angular_velocity += lambda * b2.inertia_inv();
    }

    pub(crate) fn solve_position_constraints(&mut self, b1: &mut Body, b2: &mut Body) -> bool {
        let c = b2.angle - b1.angle - self.ref_angle;
        let correction = c.clamp(-MAX_ANGULAR_CORRECTION, MAX_ANGULAR_CORRECTION);
        let lambda_dt = self.effective_mass * -correction;

        b1.angle -= lambda_dt * b1.inertia_inv();
        b2.angle += lambda_dt * b2.inertia_inv();

        c.abs() < ANGULAR_SLOP
    }

    pub(crate) fn reaction_torque(&self, dt_inv: f32) -> f32 {
        self.lambda_acc * dt_inv
    }
}
