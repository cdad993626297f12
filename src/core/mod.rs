pub mod body;
pub mod geometry;
pub mod shape;

pub use body::{Body, BodyKind};
pub use shape::{Circle, Plane, Poly, Segment, Shape, ShapeKind};
