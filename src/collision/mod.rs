pub mod broadphase;
pub mod contact;
pub mod narrowphase;
pub mod queries;

pub use broadphase::SpatialHash;
pub use contact::{Contact, ContactSolver};
pub use queries::{Ray, RaycastHit};
