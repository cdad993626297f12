pub mod allocator;
pub mod logging;
pub mod math;

pub use allocator::{Arena, BodyId, JointId, Slot};
pub use math::{Bounds, Transform2};
