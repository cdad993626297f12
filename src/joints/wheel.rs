//! Suspension joint: a perpendicular-axis constraint with a spring along the
//! axle axis and an optional drive motor.

use glam::Vec2;

use crate::config::{JOINT_MAX_LINEAR_CORRECTION, LINEAR_SLOP};
use crate::core::body::Body;
use crate::utils::math::{cross, perp, rotate};

#[derive(Debug)]
pub struct WheelJoint {
    r2: Vec2,
    r1d: Vec2,
    u: Vec2,
    n: Vec2,
    sn1: f32,
    sn2: f32,
    su1: f32,
    su2: f32,
    gamma: f32,
    beta_c: f32,
    lambda_acc: f32,
    spring_lambda_acc: f32,
    motor_lambda_acc: f32,
    em: f32,
    spring_em: f32,
    motor_em: f32,

    // Axle axis and its perpendicular in body1 space.
    u_local: Vec2,
    n_local: Vec2,

    rest_length: f32,
    motor_enabled: bool,
    motor_speed: f32,
    max_motor_torque: f32,
    max_motor_impulse: f32,
    frequency_hz: f32,
    damping_ratio: f32,
}

impl WheelJoint {
    pub(crate) fn new(b1: &Body, a1: Vec2, a2: Vec2) -> Self {
        let d = a2 - a1;
        let u_local = b1.local_vector(d.normalize());
        Self {
            r2: Vec2::ZERO,
            r1d: Vec2::ZERO,
            u: Vec2::ZERO,
            n: Vec2::ZERO,
            sn1: 0.0,
            sn2: 0.0,
            su1: 0.0,
            su2: 0.0,
            gamma: 0.0,
            beta_c: 0.0,
            lambda_acc: 0.0,
            spring_lambda_acc: 0.0,
            motor_lambda_acc: 0.0,
            em: 0.0,
            spring_em: 0.0,
            motor_em: 0.0,
            u_local,
            n_local: perp(u_local),
            rest_length: d.length(),
            motor_enabled: false,
            motor_speed: 0.0,
            max_motor_torque: 0.0,
            max_motor_impulse: 0.0,
            frequency_hz: 0.0,
            damping_ratio: 0.0,
        }
    }

    pub fn set_spring_frequency_hz(&mut self, hz: f32) {
        self.frequency_hz = hz;
    }

    pub fn set_spring_damping_ratio(&mut self, ratio: f32) {
        self.damping_ratio = ratio;
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

    pub fn rest_length(&self) -> f32 {
        self.rest_length
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
        self.r2 = b2.transform.rotate_vector(anchors.1 - b2.centroid);

        let p1 = b1.position + r1;
        let p2 = b2.position + self.r2;
        let d = p2 - p1;
        self.r1d = r1 + d;

        self.n = rotate(self.n_local, b1.angle);

        self.sn1 = cross(self.r1d, self.n);
        self.sn2 = cross(self.r2, self.n);

        let em_inv = b1.mass_inv()
            + b2.mass_inv()
            + b1.inertia_inv() * self.sn1 * self.sn1
            + b2.inertia_inv() * self.sn2 * self.sn2;
        self.em = if em_inv > 0.0 { 1.0 / em_inv } else { 0.0 };

        if self.frequency_hz > 0.0 {
            self.u = rotate(self.u_local, b1.angle);
            self.su1 = cross(self.r1d, self.u);
            self.su2 = cross(self.r2, self.u);

            let mut spring_em_inv = b1.mass_inv()
                + b2.mass_inv()
                + b1.inertia_inv() * self.su1 * self.su1
                + b2.inertia_inv() * self.su2 * self.su2;
            self.spring_em = if spring_em_inv == 0.0 { 0.0 } else { 1.0 / spring_em_inv };

            let omega = 2.0 * std::f32::consts::PI * self.frequency_hz;
            let k = self.spring_em * omega * omega;
            let c = self.spring_em * 2.0 * self.damping_ratio * omega;

            self.gamma = (c + k * dt) * dt;
            self.gamma = if self.gamma == 0.0 { 0.0 } else { 1.0 / self.gamma };
            let beta = dt * k * self.gamma;

            let pc = d.dot(self.u) - self.rest_length;
            self.beta_c = beta * pc;

            spring_em_inv += self.gamma;
            self.spring_em = if spring_em_inv == 0.0 { 0.0 } else { 1.0 / spring_em_inv };
        } else {
            self.gamma = 0.0;
            self.beta_c = 0.0;
            self.spring_lambda_acc = 0.0;
        }

        if self.motor_enabled {
            self.max_motor_impulse = self.max_motor_torque * dt;
            let motor_em_inv = b1.inertia_inv() + b2.inertia_inv();
            self.motor_em = if motor_em_inv > 0.0 { 1.0 / motor_em_inv } else { 0.0 };
        } else {
            self.motor_em = 0.0;
            self.motor_lambda_acc = 0.0;
        }

        if warm {
            let mut linear_impulse = self.n * self.lambda_acc;
            let mut angular_impulse1 = self.sn1 * self.lambda_acc + self.motor_lambda_acc;
            let mut angular_impulse2 = self.sn2 * self.lambda_acc + self.motor_lambda_acc;

            if self.frequency_hz > 0.0 {
                linear_impulse += self.u * self.spring_lambda_acc;
                angular_impulse1 += self.su1 * self.spring_lambda_acc;
                angular_impulse2 += self.su2 * self.spring_lambda_acc;
            }

            b1.linear_velocity -= linear_impulse * b1.mass_inv();
            b1.angular_velocity -= angular_impulse1 * b1.inertia_inv();

            b2.linear_velocity += linear_impulse * b2.mass_inv();
            b2.angular_velocity += angular_impulse2 * b2.inertia_inv();
        } else {
            self.lambda_acc = 0.0;
            self.spring_lambda_acc = 0.0;
            self.motor_lambda_acc = 0.0;
        }
    }

    pub(crate) fn solve_velocity_constraints(&mut self, b1: &mut Body, b2: &mut Body) {
        if self.frequency_hz > 0.0 {
            let cdot = self.u.dot(b2.linear_velocity - b1.linear_velocity)
                + self.su2 * b2.angular_velocity
                - self.su1 * b1.angular_velocity;
            let soft = self.beta_c + self.gamma * self.spring_lambda_acc;
            let lambda = -self.spring_em * (cdot + soft);
            self.spring_lambda_acc += lambda;

            let impulse = self.u * lambda;
            b1.linear_velocity -= impulse * b1.mass_inv();
            b1.angular_velocity -= self.su1 * lambda * b1.inertia_inv();

            b2.linear_velocity += impulse * b2.mass_inv();
            b2.angular_velocity += self.su2 * lambda * b2.inertia_inv();
        }

        if self.motor_enabled {
            let cdot = b2.angular_velocity - b1.angular_velocity - self.motor_speed;
            let lambda = -self.motor_em * cdot;

            let old = self.motor_lambda_acc;
            self.motor_lambda_acc =
                (old + lambda).clamp(-self.max_motor_impulse, self.max_motor_impulse);
            let lambda = self.motor_lambda_acc - old;

            b1.angular_velocity -= lambda * b1.inertia_inv();
            b2.angular_velocity += lambda * b2.inertia_inv();
        }

        let cdot = self.n.dot(b2.linear_velocity - b1.linear_velocity)
            + self.sn2 * b2.angular_velocity
            - self.sn1 * b1.angular_velocity;
        let lambda = -self.em * cdot;
        self.lambda_acc += lambda;

        let impulse = self.n * lambda;
        b1.linear_velocity -= impulse * b1.mass_inv();
        b1.angular_velocity -= self.sn1 * lambda * b1.inertia_inv();

        b2.linear_velocity += impulse * b2.mass_inv();
        b2.angular_velocity += self.sn2 * lambda * b2.inertia_inv();
    }

    pub(crate) fn solve_position_constraints(
        &mut self,
        anchors: (Vec2, Vec2),
        b1: &mut Body,
        b2: &mut Body,
    ) -> bool {
        let r1 = rotate(anchors.0 - b1.centroid, b1.angle);
        let r2 = rotate(anchors.1 - b2.centroid, b2.angle);

        let p1 = b1.position + r1;
        let p2 = b2.position + r2;
        let d = p2 - p1;
        let r1d = r1 + d;
        let n = rotate(self.n_local, b1.angle);

        let c = n.dot(d);
        let correction = c.clamp(-JOINT_MAX_LINEAR_CORRECTION, JOINT_MAX_LINEAR_CORRECTION);

        let s1 = cross(r1d, n);
        let s2 = cross(r2, n);
        let em_inv = b1.mass_inv()
            + b2.mass_inv()
            + b1.inertia_inv() * s1 * s1
            + b2.inertia_inv() * s2 * s2;
        let k_inv = if em_inv == 0.0 { 0.0 } else { 1.0 / em_inv };
        let lambda_dt = k_inv * -correction;

        let impulse_dt = n * lambda_dt;
        b1.position -= impulse_dt * b1.mass_inv();
        b1.angle -= s1 * lambda_dt * b1.inertia_inv();

        b2.position += impulse_dt * b2.mass_inv();
        b2.angle += s2 * lambda_dt * b2.inertia_inv();

        c.abs() < LINEAR_SLOP
    }

    pub(crate) fn reaction_force(&self, dt_inv: f32) -> Vec2 {
        self.n * (self.lambda_acc * dt_inv)
    }
}
