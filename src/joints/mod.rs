//! Joint constraints.
//!
//! A [`Joint`] pairs two bodies by id and wraps one of the concrete joint
//! kinds. The space drives the shared solver interface (`init_solver`,
//! `solve_velocity_constraints`, `solve_position_constraints`) each step,
//! handing the joint disjoint mutable borrows of its two bodies.

pub mod angle;
pub mod distance;
pub mod mouse;
pub mod prismatic;
pub mod revolute;
pub mod rope;
pub mod weld;
pub mod wheel;

pub use angle::AngleJoint;
pub use distance::DistanceJoint;
pub use mouse::MouseJoint;
pub use prismatic::PrismaticJoint;
pub use revolute::RevoluteJoint;
pub use rope::RopeJoint;
pub use weld::WeldJoint;
pub use wheel::WheelJoint;

use glam::Vec2;

use crate::core::body::Body;
use crate::utils::BodyId;

/// Default break threshold, effectively unbreakable.
const DEFAULT_MAX_FORCE: f32 = 9_999_999_999.0;

/// State of an angular limit across steps. Impulse accumulators are reset on
/// transitions so stale impulses from the other limit never leak through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LimitState {
    Inactive,
    AtLower,
    AtUpper,
    EqualLimits,
}

#[derive(Debug)]
pub enum JointKind {
    Angle(AngleJoint),
    Revolute(RevoluteJoint),
    Weld(WeldJoint),
    Wheel(WheelJoint),
    Prismatic(PrismaticJoint),
    Distance(DistanceJoint),
    Rope(RopeJoint),
    Mouse(MouseJoint),
}

#[derive(Debug)]
pub struct Joint {
    pub(crate) body1: BodyId,
    pub(crate) body2: BodyId,

    /// Whether the two connected bodies still collide with each other.
    pub collide_connected: bool,
    /// Reaction force magnitude beyond which a breakable joint snaps.
    pub max_force: f32,
    pub breakable: bool,

    // Anchors in body-local coordinates.
    pub(crate) anchor1: Vec2,
    pub(crate) anchor2: Vec2,

    pub kind: JointKind,
}

impl Joint {
    fn new(
        body1: BodyId,
        body2: BodyId,
        anchor1: Vec2,
        anchor2: Vec2,
        collide_connected: bool,
        kind: JointKind,
    ) -> Self {
        Self {
            body1,
            body2,
            collide_connected,
            max_force: DEFAULT_MAX_FORCE,
            breakable: false,
            anchor1,
            anchor2,
            kind,
        }
    }

    /// Locks the relative rotation of the two bodies at its current value.
    pub fn angle(b1: &Body, id1: BodyId, b2: &Body, id2: BodyId) -> Self {
        Self::new(
            id1,
            id2,
            Vec2::ZERO,
            Vec2::ZERO,
            true,
            JointKind::Angle(AngleJoint::new(b1, b2)),
        )
    }

    /// Pin joint: both bodies rotate freely about a shared world anchor.
    pub fn revolute(b1: &Body, id1: BodyId, b2: &Body, id2: BodyId, anchor: Vec2) -> Self {
        Self::new(
            id1,
            id2,
            b1.local_point(anchor),
            b2.local_point(anchor),
            false,
            JointKind::Revolute(RevoluteJoint::new(b1, b2)),
        )
    }

    /// Rigid connection; optionally softened angularly via spring settings.
    pub fn weld(b1: &Body, id1: BodyId, b2: &Body, id2: BodyId, anchor: Vec2) -> Self {
        Self::new(
            id1,
            id2,
            b1.local_point(anchor),
            b2.local_point(anchor),
            false,
            JointKind::Weld(WeldJoint::new(b1, b2)),
        )
    }

    /// Suspension joint: constrains along the perpendicular axis, springs
    /// along the anchor axis, and can drive rotation with a motor.
    pub fn wheel(b1: &Body, id1: BodyId, b2: &Body, id2: BodyId, a1: Vec2, a2: Vec2) -> Self {
        Self::new(
            id1,
            id2,
            b1.local_point(a1),
            b2.local_point(a2),
            true,
            JointKind::Wheel(WheelJoint::new(b1, a1, a2)),
        )
    }

    /// Slider joint along the axis between the two anchors.
    pub fn prismatic(b1: &Body, id1: BodyId, b2: &Body, id2: BodyId, a1: Vec2, a2: Vec2) -> Self {
        Self::new(
            id1,
            id2,
            b1.local_point(a1),
            b2.local_point(a2),
            true,
            JointKind::Prismatic(PrismaticJoint::new(b1, b2, a1, a2)),
        )
    }

    /// Holds the anchors at their current distance; soft spring when a
    /// frequency is set.
    pub fn distance(b1: &Body, id1: BodyId, b2: &Body, id2: BodyId, a1: Vec2, a2: Vec2) -> Self {
        Self::new(
            id1,
            id2,
            b1.local_point(a1),
            b2.local_point(a2),
            true,
            JointKind::Distance(DistanceJoint::new(a1.distance(a2))),
        )
    }

    /// One-sided distance limit, taut at the initial anchor separation.
    pub fn rope(b1: &Body, id1: BodyId, b2: &Body, id2: BodyId, a1: Vec2, a2: Vec2) -> Self {
        Self::new(
            id1,
            id2,
            b1.local_point(a1),
            b2.local_point(a2),
            true,
            JointKind::Rope(RopeJoint::new(a1.distance(a2))),
        )
    }

    /// Critically damped spring dragging `b2`'s anchor toward `b1`'s position.
    /// `b1` is the cursor proxy body.
    pub fn mouse(b1: &Body, id1: BodyId, b2: &Body, id2: BodyId, anchor: Vec2) -> Self {
        Self::new(
            id1,
            id2,
            b1.local_point(anchor),
            b2.local_point(anchor),
            true,
            JointKind::Mouse(MouseJoint::new()),
        )
    }

    pub fn body1(&self) -> BodyId {
        self.body1
    }

    pub fn body2(&self) -> BodyId {
        self.body2
    }

    pub fn world_anchor1(&self, b1: &Body) -> Vec2 {
        b1.world_point(self.anchor1)
    }

    pub fn world_anchor2(&self, b2: &Body) -> Vec2 {
        b2.world_point(self.anchor2)
    }

    /// Move anchor 1 to a new world position. Length-based joints re-derive
    /// their rest/max length and the prismatic joint its axis.
    pub fn set_world_anchor1(&mut self, b1: &Body, b2: &Body, anchor: Vec2) {
        match &mut self.kind {
            JointKind::Angle(_) => {
                self.anchor1 = Vec2::ZERO;
                return;
            }
            JointKind::Distance(j) => {
                j.set_rest_length(anchor.distance(b2.world_point(self.anchor2)));
            }
            JointKind::Rope(j) => {
                j.set_max_distance(anchor.distance(b2.world_point(self.anchor2)));
            }
            JointKind::Prismatic(j) => {
                j.set_axis_from_anchors(b1, anchor, b2.world_point(self.anchor2));
            }
            _ => {}
        }
        self.anchor1 = b1.local_point(anchor);
    }

    /// Move anchor 2 to a new world position, with the same re-derivations as
    /// [`Joint::set_world_anchor1`].
    pub fn set_world_anchor2(&mut self, b1: &Body, b2: &Body, anchor: Vec2) {
        match &mut self.kind {
            JointKind::Angle(_) => {
                self.anchor2 = Vec2::ZERO;
                return;
            }
            JointKind::Distance(j) => {
                j.set_rest_length(anchor.distance(b1.world_point(self.anchor1)));
            }
            JointKind::Rope(j) => {
                j.set_max_distance(anchor.distance(b1.world_point(self.anchor1)));
            }
            JointKind::Prismatic(j) => {
                j.set_axis_from_anchors(b1, b1.world_point(self.anchor1), anchor);
            }
            _ => {}
        }
        self.anchor2 = b2.local_point(anchor);
    }

    pub(crate) fn init_solver(&mut self, b1: &mut Body, b2: &mut Body, dt: f32, warm: bool) {
        let anchors = (self.anchor1, self.anchor2);
        match &mut self.kind {
            JointKind::Angle(j) => j.init_solver(b1, b2, warm),
            JointKind::Revolute(j) => j.init_solver(anchors, b1, b2, dt, warm),
            JointKind::Weld(j) => j.init_solver(anchors, b1, b2, dt, warm),
            JointKind::Wheel(j) => j.init_solver(anchors, b1, b2, dt, warm),
            JointKind::Prismatic(j) => j.init_solver(anchors, b1, b2, warm),
            JointKind::Distance(j) => j.init_solver(anchors, b1, b2, dt, warm),
            JointKind::Rope(j) => j.init_solver(anchors, b1, b2, dt, warm),
            JointKind::Mouse(j) => j.init_solver(anchors.1, b1, b2, dt, self.max_force, warm),
        }
    }

    pub(crate) fn solve_velocity_constraints(&mut self, b1: &mut Body, b2: &mut Body) {
        match &mut self.kind {
            JointKind::Angle(j) => j.solve_velocity_constraints(b1, b2),
            JointKind::Revolute(j) => j.solve_velocity_constraints(b1, b2),
            JointKind::Weld(j) => j.solve_velocity_constraints(b1, b2),
            JointKind::Wheel(j) => j.solve_velocity_constraints(b1, b2),
            JointKind::Prismatic(j) => j.solve_velocity_constraints(b1, b2),
            JointKind::Distance(j) => j.solve_velocity_constraints(b1, b2),
            JointKind::Rope(j) => j.solve_velocity_constraints(b1, b2),
            JointKind::Mouse(j) => j.solve_velocity_constraints(b1, b2),
        }
    }

    pub(crate) fn solve_position_constraints(&mut self, b1: &mut Body, b2: &mut Body) -> bool {
        let anchors = (self.anchor1, self.anchor2);
        match &mut self.kind {
            JointKind::Angle(j) => j.solve_position_constraints(b1, b2),
            JointKind::Revolute(j) => j.solve_position_constraints(anchors, b1, b2),
            JointKind::Weld(j) => j.solve_position_constraints(anchors, b1, b2),
            JointKind::Wheel(j) => j.solve_position_constraints(anchors, b1, b2),
            JointKind::Prismatic(j) => j.solve_position_constraints(anchors, b1, b2),
            JointKind::Distance(j) => j.solve_position_constraints(anchors, b1, b2),
            JointKind::Rope(j) => j.solve_position_constraints(anchors, b1, b2),
            JointKind::Mouse(_) => true,
        }
    }

    /// Constraint reaction force over the last step, for break checks and UI.
    pub fn reaction_force(&self, dt_inv: f32) -> Vec2 {
        match &self.kind {
            JointKind::Angle(_) => Vec2::ZERO,
            JointKind::Revolute(j) => j.reaction_force(dt_inv),
            JointKind::Weld(j) => j.reaction_force(dt_inv),
            JointKind::Wheel(j) => j.reaction_force(dt_inv),
            JointKind::Prismatic(j) => j.reaction_force(dt_inv),
            JointKind::Distance(j) => j.reaction_force(dt_inv),
            JointKind::Rope(j) => j.reaction_force(dt_inv),
            JointKind::Mouse(j) => j.reaction_force(dt_inv),
        }
    }

    pub fn reaction_torque(&self, dt_inv: f32) -> f32 {
        match &self.kind {
            JointKind::Angle(j) => j.reaction_torque(dt_inv),
            JointKind::Revolute(j) => j.reaction_torque(dt_inv),
            JointKind::Weld(j) => j.reaction_torque(dt_inv),
            JointKind::Prismatic(j) => j.reaction_torque(dt_inv),
            _ => 0.0,
        }
    }

    pub fn as_revolute_mut(&mut self) -> Option<&mut RevoluteJoint> {
        match &mut self.kind {
            JointKind::Revolute(j) => Some(j),
            _ => None,
        }
    }

    pub fn as_weld_mut(&mut self) -> Option<&mut WeldJoint> {
        match &mut self.kind {
            JointKind::Weld(j) => Some(j),
            _ => None,
        }
    }

    pub fn as_wheel_mut(&mut self) -> Option<&mut WheelJoint> {
        match &mut self.kind {
            JointKind::Wheel(j) => Some(j),
            _ => None,
        }
    }

    pub fn as_distance_mut(&mut self) -> Option<&mut DistanceJoint> {
        match &mut self.kind {
            JointKind::Distance(j) => Some(j),
            _ => None,
        }
    }

    pub fn as_mouse_mut(&mut self) -> Option<&mut MouseJoint> {
        match &mut self.kind {
            JointKind::Mouse(j) => Some(j),
            _ => None,
        }
    }
}
