//! Slider joint: bodies translate along a shared axis with relative rotation
//! locked.

use glam::Vec2;

use crate::config::{ANGULAR_SLOP, JOINT_MAX_LINEAR_CORRECTION, LINEAR_SLOP, MAX_ANGULAR_CORRECTION};
use crate::core::body::Body;
use crate::utils::math::{cross, perp, rotate, solve2x2};

#[derive(Debug)]
pub struct PrismaticJoint {
    // Perpendicular of the slide axis, in body1 space.
    n_local: Vec2,
    ref_angle: f32,

    r1d: Vec2,
    r2: Vec2,
    n: Vec2,
    s1: f32,
    s2: f32,

    k11: f32,
    k12: f32,
    k22: f32,
    lambda_acc: Vec2,
}

impl PrismaticJoint {
    pub(crate) fn new(b1: &Body, b2: &Body, anchor1: Vec2, anchor2: Vec2) -> Self {
        let d = anchor2 - anchor1;
        Self {
            n_local: b1.local_vector(perp(d).normalize()),
            ref_angle: b2.angle - b1.angle,
            r1d: Vec2::ZERO,
            r2: Vec2::ZERO,
            n: Vec2::ZERO,
            s1: 0.0,
            s2: 0.0,
            k11: 0.0,
            k12: 0.0,
            k22: 0.0,
            lambda_acc: Vec2::ZERO,
        }
    }

    pub(crate) fn set_axis_from_anchors(&mut self, b1: &Body, anchor1: Vec2, anchor2: Vec2) {
        let d = anchor2 - anchor1;
        self.n_local = b1.local_vector(perp(d).normalize());
    }

    pub(crate) fn init_solver(
        &mut self,
        anchors: (Vec2, Vec2),
        b1: &mut Body,
        b2: &mut Body,
        warm: bool,
    ) {
        let r1 = b1.transform.rotate_vector(anchors.0 - b1.centroid);
        self.r2 = b2.transform.rotate_vector(anchors.1 - b2.centroid);

        let p1 = b1.position + r1;
        let p2 = b2.position + self.r2;
        let d = p2 - p1;
        self.r1d = r1 + d;

        self.n = perp(d).normalize();

        self.s1 = cross(self.r1d, self.n);
        self.s2 = cross(self.r2, self.n);

        self.k11 = b1.mass_inv()
            + b2.mass_inv()
            + b1.inertia_inv() * self.s1 * self.s1
            + b2.inertia_inv() * self.s2 * self.s2;
        self.k12 = b1.inertia_inv() * self.s1 + b2.inertia_inv() * self.s2;
        self.k22 = b1.inertia_inv() + b2.inertia_inv();

        if warm {
            let impulse = self.n * self.lambda_acc.x;

            b1.linear_velocity -= impulse * b1.mass_inv();
            b1.angular_velocity -=
                (self.s1 * self.lambda_acc.x + self.lambda_acc.y) * b1.inertia_inv();

            b2.linear_velocity += impulse * b2.mass_inv();
            b2.angular_velocity +=
                (self.s2 * self.lambda_acc.x + self.lambda_acc.y) * b2.inertia_inv();
        } else {
            self.lambda_acc = Vec2::ZERO;
        }
    }

    pub(crate) fn solve_velocity_constraints(&mut self, b1: &mut Body, b2: &mut Body) {
        let cdot1 = self.n.dot(b2.linear_velocity - b1.linear_velocity)
            + self.s2 * b2.angular_velocity
            - self.s1 * b1.angular_velocity;
        let cdot2 = b2.angular_velocity - b1.angular_velocity;

        let lambda = solve2x2(
            self.k11,
            self.k12,
            self.k12,
            self.k22,
            Vec2::new(-cdot1, -cdot2),
        );
        self.lambda_acc += lambda;

        let impulse = self.n * lambda.x;

        b1.linear_velocity -= impulse * b1.mass_inv();
        b1.angular_velocity -= (self.s1 * lambda.x + lambda.y) * b1.inertia_inv();

        b2.linear_velocity += impulse * b2.mass_inv();
        b2.angular_velocity += (self.s2 * lambda.x + lambda.y) * b2.inertia_inv();
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

        let c1 = n.dot(d);
        let c2 = b2.angle - b1.angle - self.ref_angle;

        let correction = Vec2::new(
            c1.clamp(-JOINT_MAX_LINEAR_CORRECTION, JOINT_MAX_LINEAR_CORRECTION),
            c2.clamp(-MAX_ANGULAR_CORRECTION, MAX_ANGULAR_CORRECTION),
        );

        let s1 = cross(r1d, n);
        let s2 = cross(r2, n);
        let k11 = b1.mass_inv()
            + b2.mass_inv()
            + b1.inertia_inv() * s1 * s1
            + b2.inertia_inv() * s2 * s2;
        let k12 = b1.inertia_inv() * s1 + b2.inertia_inv() * s2;
        let k22 = b1.inertia_inv() + b2.inertia_inv();

        let lambda_dt = solve2x2(k11, k12, k12, k22, -correction);

        let impulse_dt = n * lambda_dt.x;

        b1.position -= impulse_dt * b1.mass_inv();
        b1.angle -= (cross(r1d, impulse_dt) + lambda_dt.y) * b1.inertia_inv();

        b2.position += impulse_dt * b2.mass_inv();
        b2.angle += (cross(r2, impulse_dt) + lambda_dt.y) * b2.inertia_inv();

        c1.abs() <= LINEAR_SLOP && c2.abs() <= ANGULAR_SLOP
    }

    pub(crate) fn reaction_force(&self, dt_inv: f32) -> Vec2 {
        self.n * (self.lambda_acc.x * dt_inv)
    }

    pub(crate) fn reaction_torque(&self, dt_inv: f32) -> f32 {
        self.lambda_acc.y * dt_inv
    }
}
