//! Engine-wide tuning constants.
//!
//! These values trade stability against stiffness and are shared by the
//! contact and joint solvers. They are deliberately not runtime-configurable;
//! per-space knobs (gravity, damping, iteration counts) live on
//! [`Space`](crate::space::Space).

/// Allowed contact penetration, in world units. Position correction leaves
/// this much overlap so contacts stay persistent between steps.
pub const COLLISION_SLOP: f32 = 0.0008;

/// Fraction of remaining penetration corrected per position iteration.
pub const BAUMGARTE: f32 = 0.28;

/// Maximum positional correction applied by a single contact per iteration.
pub const MAX_LINEAR_CORRECTION: f32 = 1.0;

/// Relative closing speed below which restitution is applied. Slower contacts
/// are treated as resting and get no bounce.
pub const VELOCITY_THRESHOLD: f32 = -1e-3;

/// Allowed joint position error, in world units.
pub const LINEAR_SLOP: f32 = 0.0008;

/// Allowed joint angular error.
pub const ANGULAR_SLOP: f32 = 2.0 / 180.0 * std::f32::consts::PI;

/// Maximum linear correction applied by a joint per position iteration.
pub const JOINT_MAX_LINEAR_CORRECTION: f32 = 0.5;

/// Maximum angular correction applied by a joint per position iteration.
pub const MAX_ANGULAR_CORRECTION: f32 = 8.0 / 180.0 * std::f32::consts::PI;

/// Default velocity iteration count for [`Space::step`](crate::space::Space::step).
pub const DEFAULT_VELOCITY_ITERATIONS: usize = 8;

/// Default position iteration count for [`Space::step`](crate::space::Space::step).
pub const DEFAULT_POSITION_ITERATIONS: usize = 3;

/// Default broad-phase cell size, in world units. Works well when typical
/// shapes are around one unit across.
pub const DEFAULT_CELL_SIZE: f32 = 2.0;
