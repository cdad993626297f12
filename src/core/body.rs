//! Rigid body state and integration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::shape::Shape;
use crate::utils::math::{cross, perp, Bounds, Transform2};
use crate::utils::JointId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Never moves, infinite mass.
    Static,
    /// Moves by its velocities but ignores forces and impulses.
    Kinetic,
    /// Fully simulated.
    Dynamic,
}

/// A rigid body: a transform, velocities, and the shapes attached to it.
///
/// `position` tracks the world-space center of mass while `transform` tracks
/// the body origin; the two only coincide when the local centroid is zero.
/// The solver works on `position`/`angle` and [`Body::sync_transform`] folds
/// the result back into the origin transform after each step.
pub struct Body {
    kind: BodyKind,

    pub transform: Transform2,
    /// Local center of mass.
    pub centroid: Vec2,
    /// World position of the center of mass.
    pub position: Vec2,
    pub linear_velocity: Vec2,
    pub angle: f32,
    pub angular_velocity: f32,

    force: Vec2,
    torque: f32,

    pub linear_damping: f32,
    pub angular_damping: f32,

    pub shapes: Vec<Shape>,
    pub(crate) joints: Vec<JointId>,

    pub bounds: Bounds,

    fixed_rotation: bool,

    mass: f32,
    mass_inv: f32,
    inertia: f32,
    inertia_inv: f32,
}

impl Body {
    pub fn new(kind: BodyKind, position: Vec2, angle: f32) -> Self {
        Self {
            kind,
            transform: Transform2::new(position, angle),
            centroid: Vec2::ZERO,
            position,
            linear_velocity: Vec2::ZERO,
            angle,
            angular_velocity: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            shapes: Vec::new(),
            joints: Vec::new(),
            bounds: Bounds::cleared(),
            fixed_rotation: false,
            mass: 0.0,
            mass_inv: 0.0,
            inertia: 0.0,
            inertia_inv: 0.0,
        }
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }

    pub fn is_kinetic(&self) -> bool {
        self.kind == BodyKind::Kinetic
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    /// Change the simulation type. Clears accumulated motion so the body does
    /// not carry velocity across the change, then recomputes mass.
    pub fn set_kind(&mut self, kind: BodyKind) {
        if kind == self.kind {
            return;
        }

        self.force = Vec2::ZERO;
        self.linear_velocity = Vec2::ZERO;
        self.torque = 0.0;
        self.angular_velocity = 0.0;
        self.kind = kind;
        self.recalculate_mass();
    }

    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
        self.recalculate_mass();
    }

    /// Remove the shape with the given id, returning it if present.
    pub fn remove_shape(&mut self, shape_id: u32) -> Option<Shape> {
        let index = self.shapes.iter().position(|s| s.id() == shape_id)?;
        let shape = self.shapes.remove(index);
        self.recalculate_mass();
        Some(shape)
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn mass_inv(&self) -> f32 {
        self.mass_inv
    }

    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    pub fn inertia_inv(&self) -> f32 {
        self.inertia_inv
    }

    pub fn fixed_rotation(&self) -> bool {
        self.fixed_rotation
    }

    pub fn set_fixed_rotation(&mut self, flag: bool) {
        self.fixed_rotation = flag;
        self.recalculate_mass();
    }

    /// Teleport the body origin. World geometry caches are stale afterwards
    /// until the owning space re-caches.
    pub fn set_transform(&mut self, position: Vec2, angle: f32) {
        self.transform.set(position, angle);
        self.position = self.transform.transform_point(self.centroid);
        self.angle = angle;
    }

    /// Rebuild the origin transform from the solved centroid state.
    pub fn sync_transform(&mut self) {
        self.transform.set_angle(self.angle);
        self.transform.position = self.position - self.transform.rotate_vector(self.centroid);
    }

    pub fn world_point(&self, p: Vec2) -> Vec2 {
        self.transform.transform_point(p)
    }

    pub fn world_vector(&self, v: Vec2) -> Vec2 {
        self.transform.rotate_vector(v)
    }

    pub fn local_point(&self, p: Vec2) -> Vec2 {
        self.transform.untransform_point(p)
    }

    pub fn local_vector(&self, v: Vec2) -> Vec2 {
        self.transform.unrotate_vector(v)
    }

    /// Recompute mass, centroid, and inertia from the attached shapes.
    ///
    /// The world position of the centroid may move; the body origin stays
    /// fixed and the linear velocity picks up the `ω × Δr` term so the motion
    /// of existing material is unchanged.
    pub fn recalculate_mass(&mut self) {
        self.centroid = Vec2::ZERO;
        self.mass = 0.0;
        self.mass_inv = 0.0;
        self.inertia = 0.0;
        self.inertia_inv = 0.0;

        if !self.is_dynamic() {
            self.position = self.transform.transform_point(self.centroid);
            return;
        }

        let mut total_mass_centroid = Vec2::ZERO;
        let mut total_mass = 0.0;
        let mut total_inertia = 0.0;

        for shape in &self.shapes {
            let centroid = shape.centroid();
            let mass = shape.area() * shape.density;
            let inertia = shape.inertia(mass);

            total_mass_centroid += centroid * mass;
            total_mass += mass;
            total_inertia += inertia;
        }

        if total_mass <= 0.0 {
            // No shapes or zero density: leave the body massless.
            self.position = self.transform.transform_point(self.centroid);
            return;
        }

        self.centroid = total_mass_centroid / total_mass;
        self.mass = total_mass;
        self.mass_inv = 1.0 / total_mass;

        if !self.fixed_rotation {
            let inertia = total_inertia - total_mass * self.centroid.dot(self.centroid);
            self.inertia = inertia;
            self.inertia_inv = if inertia > 0.0 { 1.0 / inertia } else { 0.0 };
        }

        let old_position = self.position;
        self.position = self.transform.transform_point(self.centroid);
        self.linear_velocity += perp(self.position - old_position) * self.angular_velocity;
    }

    /// Refresh world-space shape caches and the body AABB.
    pub fn cache_data(&mut self) {
        self.bounds.clear();
        for shape in &mut self.shapes {
            shape.cache_data(&self.transform);
            self.bounds.add_bounds(&shape.bounds);
        }
    }

    pub fn update_velocity(&mut self, gravity: Vec2, dt: f32, damping: f32) {
        self.linear_velocity += (gravity + self.force * self.mass_inv) * dt;
        self.angular_velocity += self.torque * self.inertia_inv * dt;

        let lin_factor = (1.0 - dt * (damping + self.linear_damping)).clamp(0.0, 1.0);
        let ang_factor = (1.0 - dt * (damping + self.angular_damping)).clamp(0.0, 1.0);

        self.linear_velocity *= lin_factor;
        self.angular_velocity *= ang_factor;

        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    pub fn update_position(&mut self, dt: f32) {
        self.position += self.linear_velocity * dt;
        self.angle += self.angular_velocity * dt;
    }

    pub fn clear_forces(&mut self) {
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    pub fn apply_force(&mut self, force: Vec2, point: Vec2) {
        if !self.is_dynamic() {
            return;
        }
        self.force += force;
        self.torque += cross(point - self.position, force);
    }

    pub fn apply_force_to_center(&mut self, force: Vec2) {
        if !self.is_dynamic() {
            return;
        }
        self.force += force;
    }

    pub fn apply_torque(&mut self, torque: f32) {
        if !self.is_dynamic() {
            return;
        }
        self.torque += torque;
    }

    pub fn apply_linear_impulse(&mut self, impulse: Vec2, point: Vec2) {
        if !self.is_dynamic() {
            return;
        }
        self.linear_velocity += impulse * self.mass_inv;
        self.angular_velocity += cross(point - self.position, impulse) * self.inertia_inv;
    }

    pub fn apply_angular_impulse(&mut self, impulse: f32) {
        if !self.is_dynamic() {
            return;
        }
        self.angular_velocity += impulse * self.inertia_inv;
    }

    pub fn kinetic_energy(&self) -> f32 {
        let vsq = self.linear_velocity.dot(self.linear_velocity);
        let wsq = self.angular_velocity * self.angular_velocity;
        0.5 * (self.mass * vsq + self.inertia * wsq)
    }

    pub(crate) fn joint_ids(&self) -> &[JointId] {
        &self.joints
    }
}
