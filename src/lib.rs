//! A 2D rigid body physics engine built around sequential impulses.
//!
//! Bodies carry shapes (circles, rounded segments, convex polygons) and are
//! simulated inside a [`Space`]: a uniform-grid broad phase finds overlapping
//! pairs, per-pair narrow phase routines build contact manifolds, and an
//! iterative impulse solver with warm starting resolves contacts and joints.
//!
//! ```no_run
//! use glam::Vec2;
//! use impulse2d::{Body, BodyKind, Shape, Space};
//!
//! let mut space = Space::new(Vec2::new(0.0, -10.0));
//!
//! let mut ground = Body::new(BodyKind::Static, Vec2::ZERO, 0.0);
//! ground.add_shape(Shape::segment(Vec2::new(-20.0, 0.0), Vec2::new(20.0, 0.0), 0.0));
//! space.add_body(ground);
//!
//! let mut ball = Body::new(BodyKind::Dynamic, Vec2::new(0.0, 5.0), 0.0);
//! ball.add_shape(Shape::circle(0.0, 0.0, 0.5));
//! space.add_body(ball);
//!
//! for _ in 0..60 {
//!     space.step(1.0 / 60.0, 8, 3, true);
//! }
//! ```

pub mod collision;
pub mod config;
pub mod core;
pub mod error;
pub mod joints;
pub mod space;
pub mod utils;

pub use crate::core::{Body, BodyKind, Shape, ShapeKind};

pub use collision::{Contact, ContactSolver, Ray, RaycastHit};
pub use error::SpaceError;
pub use joints::{Joint, JointKind};
pub use space::Space;
pub use utils::{BodyId, Bounds, JointId, Transform2};

pub use glam::Vec2;
