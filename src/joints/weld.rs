//! Rigid 3-DOF weld, optionally with a soft angular spring.

use glam::{Vec2, Vec3};

use crate::config::{ANGULAR_SLOP, JOINT_MAX_LINEAR_CORRECTION, LINEAR_SLOP, MAX_ANGULAR_CORRECTION};
use crate::core::body::Body;
use crate::utils::math::{cross, perp, rotate, solve2x2, solve3x3, truncate};

#[derive(Debug)]
pub struct WeldJoint {
    r1: Vec2,
    r2: Vec2,
    gamma: f32,
    beta_c: f32,
    lambda_acc: Vec3,
    k11: f32,
    k12: f32,
    k13: f32,
    k22: f32,
    k23: f32,
    k33: f32,

    ref_angle: f32,
    frequency_hz: f32,
    damping_ratio: f32,
}

impl WeldJoint {
    pub(crate) fn new(b1: &Body, b2: &Body) -> Self {
        Self {
            r1: Vec2::ZERO,
            r2: Vec2::ZERO,
            gamma: 0.0,
            beta_c: 0.0,
            lambda_acc: Vec3::ZERO,
            k11: 0.0,
            k12: 0.0,
            k13: 0.0,
            k22: 0.0,
            k23: 0.0,
            k33: 0.0,
            ref_angle: b2.angle - b1.angle,
            frequency_hz: 0.0,
            damping_ratio: 0.0,
        }
    }

    /// Non-zero frequency softens the angular row into a damped spring.
    pub fn set_spring_frequency_hz(&mut self, hz: f32) {
        self.frequency_hz = hz;
    }

    pub fn set_spring_damping_ratio(&mut self, ratio: f32) {
        self.damping_ratio = ratio;
    }

    pub(crate) fn init_solver(
        &mut self,
        anchors: (Vec2, Vec2),
        b1: &mut Body,
        b2: &mut Body,
        dt: f32,
        warm: bool,
    ) {
        self.r1 = b1.transform.rotate_vector(anchors.0 - b1.centroid);
        self.r2 = b2.transform.rotate_vector(anchors.1 - b2.centroid);

        let sum_minv = b1.mass_inv() + b2.mass_inv();
        let r1x_i = self.r1.x * b1.inertia_inv();
        let r1y_i = self.r1.y * b1.inertia_inv();
        let r2x_i = self.r2.x * b2.inertia_inv();
        let r2y_i = self.r2.y * b2.inertia_inv();

        self.k11 = sum_minv + self.r1.y * r1y_i + self.r2.y * r2y_i;
        self.k12 = -self.r1.x * r1y_i - self.r2.x * r2y_i;
        self.k13 = -r1y_i - r2y_i;
        self.k22 = sum_minv + self.r1.x * r1x_i + self.r2.x * r2x_i;
        self.k23 = r1x_i + r2x_i;
        self.k33 = b1.inertia_inv() + b2.inertia_inv();

        if self.frequency_hz > 0.0 {
            let m = if self.k33 > 0.0 { 1.0 / self.k33 } else { 0.0 };
            let omega = 2.0 * std::f32::consts::PI * self.frequency_hz;
            let k = m * omega * omega;
            let c = m * 2.0 * self.damping_ratio * omega;

            self.gamma = (c + k * dt) * dt;
            self.gamma = if self.gamma == 0.0 { 0.0 } else { 1.0 / self.gamma };
            let beta = dt * k * self.gamma;

            let pc = b2.angle - b1.angle - self.ref_angle;
            self.beta_c = beta * pc;

            self.k33 += self.gamma;
        } else {
            self.gamma = 0.0;
            self.beta_c = 0.0;
        }

        if warm {
            let lambda_xy = Vec2::new(self.lambda_acc.x, self.lambda_acc.y);
            let lambda_z = self.lambda_acc.z;

            b1.linear_velocity -= lambda_xy * b1.mass_inv();
            b1.angular_velocity -= (cross(self.r1, lambda_xy) + lambda_z) * b1.inertia_inv();

            b2.linear_velocity += lambda_xy * b2.mass_inv();
            b2.angular_velocity += (cross(self.r2, lambda_xy) + lambda_z) * b2.inertia_inv();
        } else {
            self.lambda_acc = Vec3::ZERO;
        }
    }

    pub(crate) fn solve_velocity_constraints(&mut self, b1: &mut Body, b2: &mut Body) {
        if self.frequency_hz > 0.0 {
            // Soft mode decouples the angular row from the point constraint.
            let cdot2 = b2.angular_velocity - b1.angular_velocity;
            let lambda_z = -(cdot2 + self.beta_c + self.gamma * self.lambda_acc.z) / self.k33;

            b1.angular_velocity -= lambda_z * b1.inertia_inv();
            b2.angular_velocity += lambda_z * b2.inertia_inv();

            let v1 = b1.linear_velocity + perp(self.r1) * b1.angular_velocity;
            let v2 = b2.linear_velocity + perp(self.r2) * b2.angular_velocity;
            let cdot1 = v2 - v1;
            let lambda_xy = solve2x2(self.k11, self.k12, self.k12, self.k22, -cdot1);

            self.lambda_acc += Vec3::new(lambda_xy.x, lambda_xy.y, lambda_z);

            b1.linear_velocity -= lambda_xy * b1.mass_inv();
            b1.angular_velocity -= cross(self.r1, lambda_xy) * b1.inertia_inv();

            b2.linear_velocity += lambda_xy * b2.mass_inv();
            b2.angular_velocity += cross(self.r2, lambda_xy) * b2.inertia_inv();
        } else {
            let v1 = b1.linear_velocity + perp(self.r1) * b1.angular_velocity;
            let v2 = b2.linear_velocity + perp(self.r2) * b2.angular_velocity;
            let cdot1 = v2 - v1;
            let cdot2 = b2.angular_velocity - b1.angular_velocity;

            let lambda = solve3x3(
                Vec3::new(self.k11, self.k12, self.k13),
                Vec3::new(self.k12, self.k22, self.k23),
                Vec3::new(self.k13, self.k23, self.k33),
                -Vec3::new(cdot1.x, cdot1.y, cdot2),
            );
            self.lambda_acc += lambda;

            let lambda_xy = Vec2::new(lambda.x, lambda.y);

            b1.linear_velocity -= lambda_xy * b1.mass_inv();
            b1.angular_velocity -= (cross(self.r1, lambda_xy) + lambda.z) * b1.inertia_inv();

            b2.linear_velocity += lambda_xy * b2.mass_inv();
            b2.angular_velocity += (cross(self.r2, lambda_xy) + lambda.z) * b2.inertia_inv();
        }
    }

    pub(crate) fn solve_position_constraints(
        &mut self,
        anchors: (Vec2, Vec2),
        b1: &mut Body,
        b2: &mut Body,
    ) -> bool {
        let r1 = rotate(anchors.0 - b1.centroid, b1.angle);
        let r2 = rotate(anchors.1 - b2.centroid, b2.angle);

        let sum_minv = b1.mass_inv() + b2.mass_inv();
        let r1x_i = r1.x * b1.inertia_inv();
        let r1y_i = r1.y * b1.inertia_inv();
        let r2x_i = r2.x * b2.inertia_inv();
        let r2y_i = r2.y * b2.inertia_inv();

        let k11 = sum_minv + r1.y * r1y_i + r2.y * r2y_i;
        let k12 = -r1.x * r1y_i - r2.x * r2y_i;
        let k13 = -r1y_i - r2y_i;
        let k22 = sum_minv + r1.x * r1x_i + r2.x * r2x_i;
        let k23 = r1x_i + r2x_i;
        let k33 = b1.inertia_inv() + b2.inertia_inv();

        let c1 = b2.position + r2 - (b1.position + r1);
        let c2 = b2.angle - b1.angle - self.ref_angle;

        if self.frequency_hz > 0.0 {
            let correction = truncate(c1, JOINT_MAX_LINEAR_CORRECTION);
            let lambda_dt_xy = solve2x2(k11, k12, k12, k22, -correction);

            b1.position -= lambda_dt_xy * b1.mass_inv();
            b1.angle -= cross(r1, lambda_dt_xy) * b1.inertia_inv();

            b2.position += lambda_dt_xy * b2.mass_inv();
            b2.angle += cross(r2, lambda_dt_xy) * b2.inertia_inv();
        } else {
            let linear = truncate(c1, JOINT_MAX_LINEAR_CORRECTION);
            let correction = Vec3::new(
                linear.x,
                linear.y,
                c2.clamp(-MAX_ANGULAR_CORRECTION, MAX_ANGULAR_CORRECTION),
            );

            let lambda_dt = solve3x3(
                Vec3::new(k11, k12, k13),
                Vec3::new(k12, k22, k23),
                Vec3::new(k13, k23, k33),
                -correction,
            );
            let lambda_dt_xy = Vec2::new(lambda_dt.x, lambda_dt.y);

            b1.position -= lambda_dt_xy * b1.mass_inv();
            b1.angle -= (cross(r1, lambda_dt_xy) + lambda_dt.z) * b1.inertia_inv();

            b2.position += lambda_dt_xy * b2.mass_inv();
            b2.angle += (cross(r2, lambda_dt_xy) + lambda_dt.z) * b2.inertia_inv();
        }

        c1.length() < LINEAR_SLOP && c2.abs() <= ANGULAR_SLOP
    }

    pub(crate) fn reaction_force(&self, dt_inv: f32) -> Vec2 {
        Vec2::new(self.lambda_acc.x, self.lambda_acc.y) * dt_inv
    }

    pub(crate) fn reaction_torque(&self, dt_inv: f32) -> f32 {
        self.lambda_acc.z * dt_inv
    }
}
