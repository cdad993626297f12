//! The simulation space: owns bodies, joints, and persistent contact state,
//! and advances the world one fixed step at a time.

use std::collections::HashMap;

use glam::Vec2;

use crate::collision::broadphase::SpatialHash;
use crate::collision::contact::{Contact, ContactSolver};
use crate::collision::narrowphase::collide;
use crate::collision::queries::{raycast_shape, Ray, RaycastHit};
use crate::config::DEFAULT_CELL_SIZE;
use crate::core::body::Body;
use crate::error::SpaceError;
use crate::joints::Joint;
use crate::utils::logging::ScopedTimer;
use crate::utils::{Arena, BodyId, JointId};

/// Persistent contact solvers are keyed by the shape pair they cover.
fn pair_key(shape1: u32, shape2: u32) -> u64 {
    let (lo, hi) = if shape1 < shape2 {
        (shape1, shape2)
    } else {
        (shape2, shape1)
    };
    ((lo as u64) << 32) | hi as u64
}

pub struct Space {
    bodies: Arena<Body>,
    joints: Arena<Joint>,
    contact_solvers: HashMap<u64, ContactSolver>,
    spatial_hash: SpatialHash,

    pub gravity: Vec2,
    /// Global velocity damping applied on top of per-body damping.
    pub damping: f32,
}

impl Space {
    pub fn new(gravity: Vec2) -> Self {
        Self::with_cell_size(gravity, DEFAULT_CELL_SIZE)
    }

    /// The broad-phase cell size should be on the order of a typical shape;
    /// far smaller floods the grid, far larger degenerates to all-pairs.
    pub fn with_cell_size(gravity: Vec2, cell_size: f32) -> Self {
        Self {
            bodies: Arena::new(),
            joints: Arena::new(),
            contact_solvers: HashMap::new(),
            spatial_hash: SpatialHash::new(cell_size),
            gravity,
            damping: 0.0,
        }
    }

    pub fn add_body(&mut self, mut body: Body) -> BodyId {
        body.recalculate_mass();
        body.cache_data();
        BodyId(self.bodies.insert(body))
    }

    /// Remove a body along with every joint attached to it.
    pub fn remove_body(&mut self, id: BodyId) -> Result<Body, SpaceError> {
        let joint_ids: Vec<JointId> = self
            .bodies
            .get(id.0)
            .ok_or(SpaceError::UnknownBody(id))?
            .joint_ids()
            .to_vec();
        for joint_id in joint_ids {
            let _ = self.remove_joint(joint_id);
        }

        self.contact_solvers
            .retain(|_, solver| solver.body1 != id && solver.body2 != id);

        self.bodies
            .remove(id.0)
            .ok_or(SpaceError::UnknownBody(id))
    }

    pub fn add_joint(&mut self, joint: Joint) -> Result<JointId, SpaceError> {
        if joint.body1 == joint.body2 {
            return Err(SpaceError::SelfJoint);
        }
        if !self.bodies.contains(joint.body1.0) {
            return Err(SpaceError::UnknownBody(joint.body1));
        }
        if !self.bodies.contains(joint.body2.0) {
            return Err(SpaceError::UnknownBody(joint.body2));
        }

        let (body1, body2) = (joint.body1, joint.body2);
        let id = JointId(self.joints.insert(joint));

        if let Some(b1) = self.bodies.get_mut(body1.0) {
            b1.joints.push(id);
        }
        if let Some(b2) = self.bodies.get_mut(body2.0) {
            b2.joints.push(id);
        }
        Ok(id)
    }

    pub fn remove_joint(&mut self, id: JointId) -> Result<Joint, SpaceError> {
        let joint = self
            .joints
            .remove(id.0)
            .ok_or(SpaceError::UnknownJoint(id))?;

        for body_id in [joint.body1, joint.body2] {
            if let Some(body) = self.bodies.get_mut(body_id.0) {
                body.joints.retain(|j| *j != id);
            }
        }
        Ok(joint)
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
        self.joints.clear();
        self.contact_solvers.clear();
        self.spatial_hash.clear();
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.0)
    }

    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.0)
    }

    pub fn joint_mut(&mut self, id: JointId) -> Option<&mut Joint> {
        self.joints.get_mut(id.0)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    pub fn bodies_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.bodies.iter_mut()
    }

    pub fn body_ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies.slots().map(BodyId)
    }

    pub fn joints(&self) -> impl Iterator<Item = &Joint> {
        self.joints.iter()
    }

    pub fn joint_ids(&self) -> impl Iterator<Item = JointId> + '_ {
        self.joints.slots().map(JointId)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Active contact manifolds, for debugging and rendering.
    pub fn contacts(&self) -> impl Iterator<Item = &ContactSolver> {
        self.contact_solvers.values()
    }

    pub fn contact_count(&self) -> usize {
        self.contact_solvers.len()
    }

    /// Topmost body whose shape contains the world point, if any.
    pub fn find_body_by_point(&self, point: Vec2) -> Option<BodyId> {
        for slot in self.bodies.slots() {
            let Some(body) = self.bodies.get(slot) else {
                continue;
            };
            if !body.bounds.contains_point(point) {
                continue;
            }
            if body.shapes.iter().any(|s| s.point_query(point)) {
                return Some(BodyId(slot));
            }
        }
        None
    }

    /// Nearest ray hit over every body in the space. `exclude` skips one body,
    /// typically the one the ray starts inside.
    pub fn raycast(&self, ray: &Ray, exclude: Option<BodyId>) -> Option<RaycastHit> {
        let mut best: Option<RaycastHit> = None;

        for slot in self.bodies.slots() {
            let id = BodyId(slot);
            if exclude == Some(id) {
                continue;
            }
            let Some(body) = self.bodies.get(slot) else {
                continue;
            };
            for shape in &body.shapes {
                if let Some(hit) = raycast_shape(shape, ray) {
                    if best.map_or(true, |b| hit.distance < b.distance) {
                        best = Some(RaycastHit {
                            body: id,
                            shape_id: shape.id(),
                            point: hit.point,
                            normal: hit.normal,
                            distance: hit.distance,
                        });
                    }
                }
            }
        }
        best
    }

    /// Whether two bodies may generate contacts. A shared joint with
    /// `collide_connected` unset suppresses collision between its bodies.
    fn can_collide(&self, a: BodyId, b: BodyId) -> bool {
        let Some(body_a) = self.bodies.get(a.0) else {
            return false;
        };
        for joint_id in body_a.joint_ids() {
            if let Some(joint) = self.joints.get(joint_id.0) {
                let connects = (joint.body1 == a && joint.body2 == b)
                    || (joint.body1 == b && joint.body2 == a);
                if connects && !joint.collide_connected {
                    return false;
                }
            }
        }
        true
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// `warm_starting` carries accumulated impulses across steps and should
    /// stay on outside of debugging; stacks take many more iterations to
    /// settle without it.
    pub fn step(
        &mut self,
        dt: f32,
        velocity_iterations: usize,
        position_iterations: usize,
        warm_starting: bool,
    ) {
        assert!(dt > 0.0, "step dt must be positive");
        assert!(velocity_iterations >= 1);
        assert!(position_iterations >= 1);

        let dt_inv = 1.0 / dt;

        self.update_contact_solvers();

        {
            let _t = ScopedTimer::new("init_solvers");
            let bodies = &mut self.bodies;
            for solver in self.contact_solvers.values_mut() {
                let Some((b1, b2)) = bodies.get2_mut(solver.body1.0, solver.body2.0) else {
                    continue;
                };
                solver.init_solver(b1, b2);
            }
            for joint in self.joints.iter_mut() {
                let Some((b1, b2)) = bodies.get2_mut(joint.body1.0, joint.body2.0) else {
                    continue;
                };
                joint.init_solver(b1, b2, dt, warm_starting);
            }
            if warm_starting {
                for solver in self.contact_solvers.values_mut() {
                    let Some((b1, b2)) = bodies.get2_mut(solver.body1.0, solver.body2.0) else {
                        continue;
                    };
                    solver.warm_start(b1, b2);
                }
            }
        }

        for body in self.bodies.iter_mut() {
            if body.is_dynamic() {
                body.update_velocity(self.gravity, dt, self.damping);
            }
        }

        {
            let _t = ScopedTimer::new("solve_velocity");
            let bodies = &mut self.bodies;
            for _ in 0..velocity_iterations {
                for joint in self.joints.iter_mut() {
                    let Some((b1, b2)) = bodies.get2_mut(joint.body1.0, joint.body2.0) else {
                        continue;
                    };
                    joint.solve_velocity_constraints(b1, b2);
                }
                for solver in self.contact_solvers.values_mut() {
                    let Some((b1, b2)) = bodies.get2_mut(solver.body1.0, solver.body2.0) else {
                        continue;
                    };
                    solver.solve_velocity_constraints(b1, b2);
                }
            }
        }

        for body in self.bodies.iter_mut() {
            if !body.is_static() {
                body.update_position(dt);
            }
        }

        self.break_joints(dt_inv);

        {
            let _t = ScopedTimer::new("solve_position");
            let bodies = &mut self.bodies;
            for _ in 0..position_iterations {
                let mut solved = true;
                for joint in self.joints.iter_mut() {
                    let Some((b1, b2)) = bodies.get2_mut(joint.body1.0, joint.body2.0) else {
                        continue;
                    };
                    solved &= joint.solve_position_constraints(b1, b2);
                }
                for solver in self.contact_solvers.values_mut() {
                    let Some((b1, b2)) = bodies.get2_mut(solver.body1.0, solver.body2.0) else {
                        continue;
                    };
                    solved &= solver.solve_position_constraints(b1, b2);
                }
                if solved {
                    break;
                }
            }
        }

        for body in self.bodies.iter_mut() {
            body.sync_transform();
            if !body.is_static() {
                body.cache_data();
            }
        }
    }

    /// Broad phase plus narrow phase: rebuild the grid, generate contacts for
    /// every overlapping shape pair, and persist solvers across steps so warm
    /// starting has something to carry.
    fn update_contact_solvers(&mut self) {
        let _t = ScopedTimer::new("update_contacts");

        self.spatial_hash.clear();
        for slot in self.bodies.slots() {
            if let Some(body) = self.bodies.get(slot) {
                self.spatial_hash.insert(BodyId(slot), &body.bounds);
            }
        }

        for solver in self.contact_solvers.values_mut() {
            solver.valid = false;
        }

        let mut contacts: Vec<Contact> = Vec::new();

        for (id_a, id_b) in self.spatial_hash.candidate_pairs() {
            let (Some(body_a), Some(body_b)) =
                (self.bodies.get(id_a.0), self.bodies.get(id_b.0))
            else {
                continue;
            };

            if !body_a.is_dynamic() && !body_b.is_dynamic() {
                continue;
            }
            if !body_a.bounds.intersects(&body_b.bounds) {
                continue;
            }
            if !self.can_collide(id_a, id_b) {
                continue;
            }

            for sa in &body_a.shapes {
                for sb in &body_b.shapes {
                    if !sa.bounds.intersects(&sb.bounds) {
                        continue;
                    }

                    // Order by shape kind so the contact normal convention
                    // (pointing toward the second shape) holds.
                    let (s1, b1, s2, b2) = if sa.kind_index() <= sb.kind_index() {
                        (sa, id_a, sb, id_b)
                    } else {
                        (sb, id_b, sa, id_a)
                    };

                    contacts.clear();
                    if collide(s1, s2, &mut contacts) == 0 {
                        continue;
                    }

                    let key = pair_key(s1.id(), s2.id());
                    match self.contact_solvers.get_mut(&key) {
                        Some(solver) => {
                            solver.update(std::mem::take(&mut contacts));
                            solver.valid = true;
                        }
                        None => {
                            let elasticity = s1.elasticity.max(s2.elasticity);
                            let friction = (s1.friction * s2.friction).sqrt();
                            self.contact_solvers.insert(
                                key,
                                ContactSolver::new(
                                    s1.id(),
                                    s2.id(),
                                    b1,
                                    b2,
                                    std::mem::take(&mut contacts),
                                    elasticity,
                                    friction,
                                ),
                            );
                        }
                    }
                }
            }
        }

        // Stale pairs drop their accumulated impulses with them.
        self.contact_solvers.retain(|_, solver| solver.valid);
    }

    fn break_joints(&mut self, dt_inv: f32) {
        let mut broken: Vec<JointId> = Vec::new();
        for slot in self.joints.slots() {
            let Some(joint) = self.joints.get(slot) else {
                continue;
            };
            if !joint.breakable {
                continue;
            }
            let reaction = joint.reaction_force(dt_inv);
            if reaction.length_squared() >= joint.max_force * joint.max_force {
                broken.push(JointId(slot));
            }
        }

        for id in broken {
            log::debug!("joint {:?} broke", id);
            let _ = self.remove_joint(id);
        }
    }
}
