//! Pin joint with optional angular limits and a motor.

use glam::{Vec2, Vec3};

use crate::config::{
    ANGULAR_SLOP, JOINT_MAX_LINEAR_CORRECTION, LINEAR_SLOP, MAX_ANGULAR_CORRECTION,
};
use crate::core::body::Body;
use crate::joints::LimitState;
use crate::utils::math::{cross, perp, rotate, solve2x2, solve3x3, truncate};

#[derive(Debug)]
pub struct RevoluteJoint {
    r1: Vec2,
    r2: Vec2,
    // Symmetric 3x3 effective mass (point constraint + angular row).
    k11: f32,
    k12: f32,
    k13: f32,
    k22: f32,
    k23: f32,
    k33: f32,
    em2: f32,

    lambda_acc: Vec3,
    motor_lambda_acc: f32,

    ref_angle: f32,

    limit_enabled: bool,
    limit_lower_angle: f32,
    limit_upper_angle: f32,
    limit_state: LimitState,

    motor_enabled: bool,
    motor_speed: f32,
    max_motor_torque: f32,
    max_motor_impulse: f32,
}

impl RevoluteJoint {
    pub(crate) fn new(b1: &Body, b2: &Body) -> Self {
        Self {
            r1: Vec2::ZERO,
            r2: Vec2::ZERO,
            k11: 0.0,
            k12: 0.0,
            k13: 0.0,
            k22: 0.0,
            k23: 0.0,
            k33: 0.0,
            em2: 0.0,
            lambda_acc: Vec3::ZERO,
            motor_lambda_acc: 0.0,
            ref_angle: b2.angle - b1.angle,
            limit_enabled: false,
            limit_lower_angle: 0.0,
            limit_upper_angle: 0.0,
            limit_state: LimitState::Inactive,
            motor_enabled: false,
            motor_speed: 0.0,
            max_motor_torque: 0.0,
            max_motor_impulse: 0.0,
        }
    }

    pub fn enable_motor(&mut self, flag: bool) {
        self.motor_enabled = flag;
    }

    pub fn set_motor_speed(&mut self, speed: f32) {
        self.motor_speed = speed;
    }

    pub fn set_max_motor_torque(&mut self, torque: f32) {
        self.max_motor_torque = torque;
    }

    pub fn enable_limit(&mut self, flag: bool) {
        self.limit_enabled = flag;
    }

    pub fn set_limits(&mut self, lower: f32, upper: f32) {
        self.limit_lower_angle = lower;
        self.limit_upper_angle = upper;
    }

    pub(crate) fn init_solver(
        &mut self,
        anchors: (Vec2, Vec2),
        b1: &mut Body,
        b2: &mut Body,
        dt: f32,
        warm: bool,
    ) {
        if !self.motor_enabled {
            self.motor_lambda_acc = 0.0;
        } else {
            self.max_motor_impulse = self.max_motor_torque * dt;
        }

        if self.limit_enabled {
            let da = b2.angle - b1.angle - self.ref_angle;

            if (self.limit_upper_angle - self.limit_lower_angle).abs() < ANGULAR_SLOP {
                self.limit_state = LimitState::EqualLimits;
            } else if da <= self.limit_lower_angle {
                if self.limit_state != LimitState::AtLower {
                    self.lambda_acc.z = 0.0;
                }
                self.limit_state = LimitState::AtLower;
            } else if da >= self.limit_upper_angle {
                if self.limit_state != LimitState::AtUpper {
                    self.lambda_acc.z = 0.0;
                }
                self.limit_state = LimitState::AtUpper;
            } else {
                self.limit_state = LimitState::Inactive;
                self.lambda_acc.z = 0.0;
            }
        } else {
            self.limit_state = LimitState::Inactive;
        }

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

        self.em2 = if self.k33 != 0.0 { 1.0 / self.k33 } else { 0.0 };

        if warm {
            let lambda_xy = Vec2::new(self.lambda_acc.x, self.lambda_acc.y);
            let lambda_z = self.lambda_acc.z + self.motor_lambda_acc;

            b1.linear_velocity -= lambda_xy * b1.mass_inv();
            b1.angular_velocity -= (cross(self.r1, lambda_xy) + lambda_z) * b1.inertia_inv();

            b2.linear_velocity += lambda_xy * b2.mass_inv();
            b2.angular_velocity += (cross(self.r2, lambda_xy) + lambda_z) * b2.inertia_inv();
        } else {
            self.lambda_acc = Vec3::ZERO;
            self.motor_lambda_acc = 0.0;
        }
    }

    fn solve_full(&self, rhs: Vec3) -> Vec3 {
        solve3x3(
            Vec3::new(self.k11, self.k12, self.k13),
            Vec3::new(self.k12, self.k22, self.k23),
            Vec3::new(self.k13, self.k23, self.k33),
            rhs,
        )
    }

    pub(crate) fn solve_velocity_constraints(&mut self, b1: &mut Body, b2: &mut Body) {
        if self.motor_enabled && self.limit_state != LimitState::EqualLimits {
            let cdot = b2.angular_velocity - b1.angular_velocity - self.motor_speed;
            let lambda = -self.em2 * cdot;

            let old = self.motor_lambda_acc;
            self.motor_lambda_acc =
                (old + lambda).clamp(-self.max_motor_impulse, self.max_motor_impulse);
            let lambda = self.motor_lambda_acc - old;

            b1.angular_velocity -= lambda * b1.inertia_inv();
            b2.angular_velocity += lambda * b2.inertia_inv();
        }

        if self.limit_enabled && self.limit_state != LimitState::Inactive {
            let v1 = b1.linear_velocity + perp(self.r1) * b1.angular_velocity;
            let v2 = b2.linear_velocity + perp(self.r2) * b2.angular_velocity;
            let cdot1 = v2 - v1;
            let cdot2 = b2.angular_velocity - b1.angular_velocity;

            let mut lambda = self.solve_full(-Vec3::new(cdot1.x, cdot1.y, cdot2));

            if self.limit_state == LimitState::EqualLimits {
                self.lambda_acc += lambda;
            } else {
                let new_z = self.lambda_acc.z + lambda.z;
                let lower_limited = self.limit_state == LimitState::AtLower && new_z < 0.0;
                let upper_limited = self.limit_state == LimitState::AtUpper && new_z > 0.0;

                if lower_limited || upper_limited {
                    // The limit impulse went the wrong way: drop the angular
                    // row and re-solve the point constraint alone.
                    let rhs = cdot1 + Vec2::new(self.k13, self.k23) * new_z;
                    let reduced = solve2x2(self.k11, self.k12, self.k12, self.k22, -rhs);
                    lambda.x = reduced.x;
                    lambda.y = reduced.y;
                    lambda.z = -self.lambda_acc.z;

                    self.lambda_acc.x += lambda.x;
                    self.lambda_acc.y += lambda.y;
                    self.lambda_acc.z = 0.0;
                } else {
                    self.lambda_acc += lambda;
                }
            }

            let lambda_xy = Vec2::new(lambda.x, lambda.y);

            b1.linear_velocity -= lambda_xy * b1.mass_inv();
            b1.angular_velocity -= (cross(self.r1, lambda_xy) + lambda.z) * b1.inertia_inv();

            b2.linear_velocity += lambda_xy * b2.mass_inv();
            b2.angular_velocity += (cross(self.r2, lambda_xy) + lambda.z) * b2.inertia_inv();
        } else {
            let v1 = b1.linear_velocity + perp(self.r1) * b1.angular_velocity;
            let v2 = b2.linear_velocity + perp(self.r2) * b2.angular_velocity;
            let cdot = v2 - v1;

            let lambda = solve2x2(self.k11, self.k12, self.k12, self.k22, -cdot);

            self.lambda_acc += Vec3::new(lambda.x, lambda.y, 0.0);

            b1.linear_velocity -= lambda * b1.mass_inv();
            b1.angular_velocity -= cross(self.r1, lambda) * b1.inertia_inv();

            b2.linear_velocity += lambda * b2.mass_inv();
            b2.angular_velocity += cross(self.r2, lambda) * b2.inertia_inv();
        }
    }

    pub(crate) fn solve_position_constraints(
        &mut self,
        anchors: (Vec2, Vec2),
        b1: &mut Body,
        b2: &mut Body,
    ) -> bool {
        let mut angular_error = 0.0;

        if self.limit_enabled && self.limit_state != LimitState::Inactive {
            let da = b2.angle - b1.angle - self.ref_angle;
            let mut angular_impulse_dt = 0.0;

            match self.limit_state {
                LimitState::EqualLimits => {
                    let c = (da - self.limit_lower_angle)
                        .clamp(-MAX_ANGULAR_CORRECTION, MAX_ANGULAR_CORRECTION);
                    angular_error = c.abs();
                    angular_impulse_dt = -self.em2 * c;
                }
                LimitState::AtLower => {
                    let c = da - self.limit_lower_angle;
                    angular_error = -c;
                    let c = (c + ANGULAR_SLOP).clamp(-MAX_ANGULAR_CORRECTION, 0.0);
                    angular_impulse_dt = -self.em2 * c;
                }
                LimitState::AtUpper => {
                    let c = da - self.limit_upper_angle;
                    angular_error = c;
                    let c = (c - ANGULAR_SLOP).clamp(0.0, MAX_ANGULAR_CORRECTION);
                    angular_impulse_dt = -self.em2 * c;
                }
                LimitState::Inactive => {}
            }

            b1.angle -= angular_impulse_dt * b1.inertia_inv();
            b2.angle += angular_impulse_dt * b2.inertia_inv();
        }

        let r1 = rotate(anchors.0 - b1.centroid, b1.angle);
        let r2 = rotate(anchors.1 - b2.centroid, b2.angle);

        let c = b2.position + r2 - (b1.position + r1);
        let correction = truncate(c, JOINT_MAX_LINEAR_CORRECTION);
        let position_error = correction.length();

        let sum_minv = b1.mass_inv() + b2.mass_inv();
        let r1y_i = r1.y * b1.inertia_inv();
        let r2y_i = r2.y * b2.inertia_inv();
        let k11 = sum_minv + r1.y * r1y_i + r2.y * r2y_i;
        let k12 = -r1.x * r1y_i - r2.x * r2y_i;
        let k22 = sum_minv + r1.x * r1.x * b1.inertia_inv() + r2.x * r2.x * b2.inertia_inv();

        let lambda_dt = solve2x2(k11, k12, k12, k22, -correction);

        b1.position -= lambda_dt * b1.mass_inv();
        b1.angle -= cross(r1, lambda_dt) * b1.inertia_inv();

        b2.position += lambda_dt * b2.mass_inv();
        b2.angle += cross(r2, lambda_dt) * b2.inertia_inv();

        position_error < LINEAR_SLOP && angular_error < ANGULAR_SLOP
    }

    pub(crate) fn reaction_force(&self, dt_inv: f32) -> Vec2 {
        Vec2::new(self.lambda_acc.x, self.lambda_acc.y) * dt_inv
    }

    pub(crate) fn reaction_torque(&self, dt_inv: f32) -> f32 {
        (self.lambda_acc.z + self.motor_lambda_acc) * dt_inv
    }
}
